//! Route handlers for creating and listing expense records.

use std::str::FromStr;

use axum::{
    Json,
    extract::{Query, State},
    http::StatusCode,
};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{
    Error, ValidationErrors,
    auth::Claims,
    models::{
        CategoryName, Expense, ExpenseBuilder, PaymentMethod, UserID, validate_amount,
        validate_description,
    },
    routes::DateFilter,
    state::ExpenseState,
    stores::{ExpenseQuery, ExpenseStore},
};

const REQUIRED_MESSAGE: &str = "This field is required.";

/// The payload accepted by the create expense endpoint.
///
/// Every field is optional at the deserialization layer so that missing and
/// malformed fields can be reported together, per field, in a single 400
/// response. The owner is never part of the payload; it always comes from the
/// caller's token.
#[derive(Debug, Default, Deserialize)]
pub struct CreateExpense {
    /// The amount spent, as a JSON number or string such as `"10.50"`.
    pub amount: Option<Value>,
    /// The category label.
    pub category: Option<String>,
    /// The date of the expense in `YYYY-MM-DD` format.
    pub date: Option<String>,
    /// An optional description, defaults to the empty string.
    pub description: Option<String>,
    /// One of `cash`, `card`, or `upi`; defaults to `cash`.
    pub payment_method: Option<String>,
}

impl CreateExpense {
    /// Validate the payload into an expense builder owned by `user_id`,
    /// collecting every field failure rather than stopping at the first.
    fn into_builder(self, user_id: UserID) -> Result<ExpenseBuilder, ValidationErrors> {
        let mut errors = ValidationErrors::default();

        let amount = match &self.amount {
            None => {
                errors.push("amount", REQUIRED_MESSAGE.to_string());
                None
            }
            Some(value) => match parse_amount(value).and_then(|amount| {
                validate_amount(amount).map_err(Error::validation_message)
            }) {
                Ok(amount) => Some(amount),
                Err(message) => {
                    errors.push("amount", message);
                    None
                }
            },
        };

        let category = match &self.category {
            None => {
                errors.push("category", REQUIRED_MESSAGE.to_string());
                None
            }
            Some(name) => match CategoryName::new(name) {
                Ok(category) => Some(category),
                Err(error) => {
                    errors.push("category", error.validation_message());
                    None
                }
            },
        };

        let date = match &self.date {
            None => {
                errors.push("date", REQUIRED_MESSAGE.to_string());
                None
            }
            Some(text) => match NaiveDate::from_str(text) {
                Ok(date) => Some(date),
                Err(_) => {
                    errors.push(
                        "date",
                        "Date has wrong format. Use this format instead: YYYY-MM-DD.".to_string(),
                    );
                    None
                }
            },
        };

        let description = self.description.unwrap_or_default();
        if let Err(error) = validate_description(&description) {
            errors.push("description", error.validation_message());
        }

        let payment_method = match &self.payment_method {
            None => PaymentMethod::default(),
            Some(text) => match PaymentMethod::from_str(text) {
                Ok(payment_method) => payment_method,
                Err(error) => {
                    errors.push("payment_method", error.validation_message());
                    PaymentMethod::default()
                }
            },
        };

        match (amount, category, date) {
            (Some(amount), Some(category), Some(date)) if errors.is_empty() => {
                Ok(Expense::build(amount, category, date, user_id)
                    .description(&description)
                    .payment_method(payment_method))
            }
            _ => Err(errors),
        }
    }
}

/// Parse an amount from either a JSON number or a string such as `"10.50"`.
///
/// Number literals are parsed from their textual form so the value never
/// takes a detour through binary floats.
fn parse_amount(value: &Value) -> Result<Decimal, String> {
    let parsed = match value {
        Value::String(text) => Decimal::from_str(text),
        Value::Number(number) => Decimal::from_str(&number.to_string()),
        _ => return Err("A valid number is required.".to_string()),
    };

    parsed.map_err(|_| "A valid number is required.".to_string())
}

/// The response body for a successfully created expense.
#[derive(Debug, Serialize, Deserialize)]
pub struct CreateExpenseResponse {
    /// A human readable confirmation.
    pub message: String,
    /// The created record, including its server-assigned ID.
    pub expense: Expense,
}

/// A route handler for creating a new expense.
///
/// The expense is always owned by the authenticated caller. Responds 201 with
/// the created record, or 400 with a per-field error map if the payload fails
/// validation.
pub async fn create_expense<E>(
    State(mut state): State<ExpenseState<E>>,
    claims: Claims,
    Json(payload): Json<CreateExpense>,
) -> Result<(StatusCode, Json<CreateExpenseResponse>), Error>
where
    E: ExpenseStore + Send + Sync,
{
    let builder = payload
        .into_builder(claims.user_id())
        .map_err(Error::Validation)?;

    let expense = state.expense_store.create(builder)?;

    Ok((
        StatusCode::CREATED,
        Json(CreateExpenseResponse {
            message: "Expense saved".to_string(),
            expense,
        }),
    ))
}

/// A route handler for listing the authenticated caller's expenses.
///
/// Only the caller's own records are returned, optionally restricted by the
/// inclusive `start_date` and `end_date` query parameters.
pub async fn get_expenses<E>(
    State(state): State<ExpenseState<E>>,
    claims: Claims,
    Query(filter): Query<DateFilter>,
) -> Result<Json<Vec<Expense>>, Error>
where
    E: ExpenseStore + Send + Sync,
{
    let expenses = state.expense_store.get_query(ExpenseQuery::owned_by(
        claims.user_id(),
        filter.start_date,
        filter.end_date,
    ))?;

    Ok(Json(expenses))
}

#[cfg(test)]
mod create_expense_tests {
    use axum::http::StatusCode;
    use axum_test::TestServer;
    use rusqlite::Connection;
    use rust_decimal_macros::dec;
    use serde_json::{Value, json};

    use crate::{
        auth::TokenPair,
        build_router, endpoints,
        models::{PasswordHash, PaymentMethod, Username, ValidatedPassword},
        stores::{
            UserStore,
            sqlite::{SQLAppState, create_app_state},
        },
    };

    use super::CreateExpenseResponse;

    fn get_test_app_state() -> SQLAppState {
        let connection =
            Connection::open_in_memory().expect("Could not open database in memory.");

        create_app_state(connection, "42").expect("Could not create app state.")
    }

    async fn create_app_with_user(username: &str) -> (TestServer, String) {
        let mut state = get_test_app_state();

        let password = "averysafeandsecurepassword";
        let password_hash =
            PasswordHash::new(ValidatedPassword::new_unchecked(password), 4).unwrap();
        state
            .user_store
            .create(Username::new_unchecked(username), password_hash)
            .expect("Could not create user.");

        let server = TestServer::new(build_router(state));

        let token_pair = server
            .post(endpoints::LOG_IN)
            .json(&json!({
                "username": username,
                "password": password,
            }))
            .await
            .json::<TokenPair>();

        (server, token_pair.access)
    }

    #[tokio::test]
    async fn create_expense_assigns_owner_from_token() {
        let (server, token) = create_app_with_user("alice").await;

        let response = server
            .post(endpoints::EXPENSES)
            .authorization_bearer(token)
            .json(&json!({
                "amount": "10.50",
                "category": "food",
                "date": "2024-01-01",
                // A client-supplied owner must be ignored.
                "user_id": 999,
            }))
            .await;

        response.assert_status(StatusCode::CREATED);

        let body = response.json::<CreateExpenseResponse>();
        assert_eq!(body.message, "Expense saved");
        assert!(body.expense.id() > 0);
        assert_ne!(body.expense.user_id().as_i64(), 999);
        assert_eq!(body.expense.amount(), dec!(10.50));
        assert_eq!(body.expense.category().as_str(), "food");
        assert_eq!(body.expense.description(), "");
        assert_eq!(body.expense.payment_method(), PaymentMethod::Cash);
    }

    #[tokio::test]
    async fn create_expense_accepts_optional_fields() {
        let (server, token) = create_app_with_user("alice").await;

        let response = server
            .post(endpoints::EXPENSES)
            .authorization_bearer(token)
            .json(&json!({
                "amount": "99.99",
                "category": "travel",
                "date": "2024-03-15",
                "description": "train to the airport",
                "payment_method": "upi",
            }))
            .await;

        response.assert_status(StatusCode::CREATED);

        let body = response.json::<CreateExpenseResponse>();
        assert_eq!(body.expense.description(), "train to the airport");
        assert_eq!(body.expense.payment_method(), PaymentMethod::Upi);
    }

    #[tokio::test]
    async fn create_expense_collects_field_errors() {
        let (server, token) = create_app_with_user("alice").await;

        let response = server
            .post(endpoints::EXPENSES)
            .authorization_bearer(token)
            .json(&json!({
                "category": "x".repeat(51),
                "date": "01/01/2024",
                "payment_method": "cheque",
            }))
            .await;

        response.assert_status_bad_request();

        let body = response.json::<Value>();
        assert_eq!(body["message"], "Invalid inputs, please try again");

        let errors = &body["errors"];
        assert!(errors["amount"][0].as_str().is_some());
        assert!(errors["category"][0].as_str().is_some());
        assert!(errors["date"][0].as_str().is_some());
        assert!(errors["payment_method"][0].as_str().is_some());
    }

    #[tokio::test]
    async fn create_expense_rejects_three_decimal_places() {
        let (server, token) = create_app_with_user("alice").await;

        let response = server
            .post(endpoints::EXPENSES)
            .authorization_bearer(token)
            .json(&json!({
                "amount": "10.505",
                "category": "food",
                "date": "2024-01-01",
            }))
            .await;

        response.assert_status_bad_request();

        let body = response.json::<Value>();
        assert!(body["errors"]["amount"][0].as_str().is_some());
    }

    #[tokio::test]
    async fn create_expense_without_token_fails() {
        let (server, _) = create_app_with_user("alice").await;

        server
            .post(endpoints::EXPENSES)
            .json(&json!({
                "amount": "10.50",
                "category": "food",
                "date": "2024-01-01",
            }))
            .await
            .assert_status(StatusCode::UNAUTHORIZED);
    }
}

#[cfg(test)]
mod get_expenses_tests {
    use axum::http::StatusCode;
    use axum_test::TestServer;
    use rusqlite::Connection;
    use rust_decimal_macros::dec;
    use serde_json::json;

    use crate::{
        auth::TokenPair,
        build_router, endpoints,
        models::{Expense, PasswordHash, Username, ValidatedPassword},
        stores::{
            UserStore,
            sqlite::{SQLAppState, create_app_state},
        },
    };

    fn get_test_app_state() -> SQLAppState {
        let connection =
            Connection::open_in_memory().expect("Could not open database in memory.");

        create_app_state(connection, "42").expect("Could not create app state.")
    }

    fn add_user(state: &mut SQLAppState, username: &str, password: &str) {
        let password_hash =
            PasswordHash::new(ValidatedPassword::new_unchecked(password), 4).unwrap();
        state
            .user_store
            .create(Username::new_unchecked(username), password_hash)
            .expect("Could not create user.");
    }

    async fn log_in(server: &TestServer, username: &str, password: &str) -> String {
        server
            .post(endpoints::LOG_IN)
            .json(&json!({
                "username": username,
                "password": password,
            }))
            .await
            .json::<TokenPair>()
            .access
    }

    async fn post_expense(server: &TestServer, token: &str, amount: &str, date: &str) {
        server
            .post(endpoints::EXPENSES)
            .authorization_bearer(token)
            .json(&json!({
                "amount": amount,
                "category": "food",
                "date": date,
            }))
            .await
            .assert_status(StatusCode::CREATED);
    }

    #[tokio::test]
    async fn get_expenses_returns_only_callers_records() {
        let mut state = get_test_app_state();
        add_user(&mut state, "alice", "averysafeandsecurepassword");
        add_user(&mut state, "bob", "anotherverysecurepassword");
        let server = TestServer::new(build_router(state));

        let alice_token = log_in(&server, "alice", "averysafeandsecurepassword").await;
        let bob_token = log_in(&server, "bob", "anotherverysecurepassword").await;

        post_expense(&server, &alice_token, "10.00", "2024-01-01").await;
        post_expense(&server, &bob_token, "20.00", "2024-01-01").await;

        let response = server
            .get(endpoints::EXPENSES)
            .authorization_bearer(&alice_token)
            .await;

        response.assert_status_ok();

        let expenses = response.json::<Vec<Expense>>();
        assert_eq!(expenses.len(), 1);
        assert_eq!(expenses[0].amount(), dec!(10.00));
    }

    #[tokio::test]
    async fn get_expenses_date_filters_are_inclusive() {
        let mut state = get_test_app_state();
        add_user(&mut state, "alice", "averysafeandsecurepassword");
        let server = TestServer::new(build_router(state));
        let token = log_in(&server, "alice", "averysafeandsecurepassword").await;

        for date in ["2024-01-09", "2024-01-10", "2024-01-15", "2024-01-20", "2024-01-21"] {
            post_expense(&server, &token, "1.00", date).await;
        }

        let response = server
            .get(endpoints::EXPENSES)
            .authorization_bearer(&token)
            .add_query_param("start_date", "2024-01-10")
            .add_query_param("end_date", "2024-01-20")
            .await;

        response.assert_status_ok();

        let expenses = response.json::<Vec<Expense>>();
        let dates: Vec<String> = expenses
            .iter()
            .map(|expense| expense.date().to_string())
            .collect();

        assert_eq!(dates, vec!["2024-01-10", "2024-01-15", "2024-01-20"]);
    }

    #[tokio::test]
    async fn get_expenses_returns_empty_array_for_new_user() {
        let mut state = get_test_app_state();
        add_user(&mut state, "alice", "averysafeandsecurepassword");
        let server = TestServer::new(build_router(state));
        let token = log_in(&server, "alice", "averysafeandsecurepassword").await;

        let response = server
            .get(endpoints::EXPENSES)
            .authorization_bearer(&token)
            .await;

        response.assert_status_ok();
        assert_eq!(response.json::<Vec<Expense>>(), vec![]);
    }

    #[tokio::test]
    async fn get_expenses_without_token_fails() {
        let server = TestServer::new(build_router(get_test_app_state()));

        server
            .get(endpoints::EXPENSES)
            .await
            .assert_status(StatusCode::UNAUTHORIZED);
    }
}
