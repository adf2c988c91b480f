//! Route handler for registering a new account.

use axum::{Json, extract::State, http::StatusCode};
use serde::Deserialize;
use serde_json::{Value, json};

use crate::{
    Error, ValidationErrors,
    models::{PasswordHash, Username, ValidatedPassword},
    state::UserState,
    stores::{UserError, UserStore},
};

const REQUIRED_MESSAGE: &str = "This field is required.";

/// The payload accepted by the signup endpoint.
///
/// Both fields are optional at the deserialization layer so that missing
/// fields can be reported per field in a single 400 response.
#[derive(Debug, Default, Deserialize)]
pub struct CreateUser {
    /// The username for the new account.
    pub username: Option<String>,
    /// The password for the new account.
    pub password: Option<String>,
}

/// A route handler for creating a new account.
///
/// Validates the username format and the password strength, collecting the
/// failures into a per-field error map. Responds 201 on success, or 400 with
/// the error map.
pub async fn register_user<U>(
    State(mut state): State<UserState<U>>,
    Json(payload): Json<CreateUser>,
) -> Result<(StatusCode, Json<Value>), Error>
where
    U: UserStore + Send + Sync,
{
    let mut errors = ValidationErrors::default();

    let username = match &payload.username {
        None => {
            errors.push("username", REQUIRED_MESSAGE.to_string());
            None
        }
        Some(username) => match Username::new(username) {
            Ok(username) => Some(username),
            Err(error) => {
                errors.push("username", error.validation_message());
                None
            }
        },
    };

    let password = match &payload.password {
        None => {
            errors.push("password", REQUIRED_MESSAGE.to_string());
            None
        }
        Some(password) => match ValidatedPassword::new(password) {
            Ok(password) => Some(password),
            Err(error) => {
                errors.push("password", error.validation_message());
                None
            }
        },
    };

    let (username, password) = match (username, password) {
        (Some(username), Some(password)) if errors.is_empty() => (username, password),
        _ => return Ok((StatusCode::BAD_REQUEST, Json(json!(errors)))),
    };

    let password_hash = PasswordHash::new(password, PasswordHash::DEFAULT_COST)?;

    match state.user_store.create(username, password_hash) {
        Ok(user) => {
            tracing::info!("Registered user {}", user.username());

            Ok((
                StatusCode::CREATED,
                Json(json!({
                    "message": "User registered",
                })),
            ))
        }
        Err(UserError::DuplicateUsername) => Ok((
            StatusCode::BAD_REQUEST,
            Json(json!({
                "username": ["A user with that username already exists."],
            })),
        )),
        Err(UserError::NotFound) => Err(Error::NotFound),
        Err(UserError::SqlError(error)) => Err(Error::SqlError(error)),
    }
}
