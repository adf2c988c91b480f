//! This file defines the type `Expense`, the core record type of the
//! application, along with its validated parts.

use std::{fmt::Display, str::FromStr};

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{
    Error,
    models::{DatabaseID, UserID},
};

/// The maximum number of characters a category label may have.
pub const MAX_CATEGORY_LENGTH: usize = 50;

/// The maximum number of characters an expense description may have.
pub const MAX_DESCRIPTION_LENGTH: usize = 255;

/// The maximum number of significant digits an amount may have.
pub const MAX_AMOUNT_DIGITS: usize = 10;

/// The maximum number of decimal places an amount may have.
pub const MAX_AMOUNT_DECIMAL_PLACES: u32 = 2;

/// Check that `amount` satisfies the fixed-point money constraints: at most
/// [MAX_AMOUNT_DECIMAL_PLACES] decimal places and at most [MAX_AMOUNT_DIGITS]
/// significant digits. Negative amounts (refunds) are allowed.
///
/// Returns the amount unchanged so the caller keeps the client's scale
/// (e.g. `10.50` stays `10.50`, not `10.5`).
///
/// # Errors
/// Returns [Error::InvalidAmount] if a constraint is violated.
pub fn validate_amount(amount: Decimal) -> Result<Decimal, Error> {
    let normalized = amount.normalize();

    if normalized.scale() > MAX_AMOUNT_DECIMAL_PLACES {
        return Err(Error::InvalidAmount(format!(
            "Ensure that there are no more than {MAX_AMOUNT_DECIMAL_PLACES} decimal places."
        )));
    }

    if normalized.mantissa().abs().to_string().len() > MAX_AMOUNT_DIGITS {
        return Err(Error::InvalidAmount(format!(
            "Ensure that there are no more than {MAX_AMOUNT_DIGITS} digits in total."
        )));
    }

    Ok(amount)
}

/// Check that `description` is at most [MAX_DESCRIPTION_LENGTH] characters.
/// Descriptions are optional, so the empty string is valid.
///
/// # Errors
/// Returns [Error::DescriptionTooLong] if the description is too long.
pub fn validate_description(description: &str) -> Result<(), Error> {
    if description.chars().count() > MAX_DESCRIPTION_LENGTH {
        return Err(Error::DescriptionTooLong(MAX_DESCRIPTION_LENGTH));
    }

    Ok(())
}

/// A validated category label: non-empty free-form text of at most
/// [MAX_CATEGORY_LENGTH] characters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CategoryName(String);

impl CategoryName {
    /// Create and validate a category name from a string.
    ///
    /// # Errors
    /// Returns [Error::InvalidCategoryName] if the string is empty or longer
    /// than [MAX_CATEGORY_LENGTH] characters.
    pub fn new(name: &str) -> Result<Self, Error> {
        if name.is_empty() {
            return Err(Error::InvalidCategoryName(
                "This field may not be blank.".to_string(),
            ));
        }

        if name.chars().count() > MAX_CATEGORY_LENGTH {
            return Err(Error::InvalidCategoryName(format!(
                "Ensure this field has no more than {MAX_CATEGORY_LENGTH} characters."
            )));
        }

        Ok(Self(name.to_string()))
    }

    /// Create a new `CategoryName` without any validation.
    ///
    /// The caller should ensure that `name` satisfies the category
    /// constraints, e.g. because it was read back from the database.
    pub fn new_unchecked(name: &str) -> Self {
        Self(name.to_string())
    }

    /// The category label as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for CategoryName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// How an expense was paid.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    /// Paid with physical money.
    #[default]
    Cash,
    /// Paid with a debit or credit card.
    Card,
    /// Paid through the Unified Payments Interface.
    Upi,
}

impl PaymentMethod {
    /// The lowercase wire/database form of the payment method.
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::Cash => "cash",
            PaymentMethod::Card => "card",
            PaymentMethod::Upi => "upi",
        }
    }
}

impl Display for PaymentMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for PaymentMethod {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "cash" => Ok(PaymentMethod::Cash),
            "card" => Ok(PaymentMethod::Card),
            "upi" => Ok(PaymentMethod::Upi),
            other => Err(Error::InvalidPaymentMethod(format!(
                "\"{other}\" is not a valid choice."
            ))),
        }
    }
}

/// A record of money spent (or refunded, for negative amounts).
///
/// To create a new `Expense`, use [Expense::build] and pass the builder to
/// [ExpenseStore::create](crate::stores::ExpenseStore::create). To retrieve
/// existing expenses, use
/// [ExpenseStore::get_query](crate::stores::ExpenseStore::get_query).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Expense {
    id: DatabaseID,
    user_id: UserID,
    amount: Decimal,
    category: CategoryName,
    date: NaiveDate,
    description: String,
    payment_method: PaymentMethod,
}

impl Expense {
    /// Create a new expense builder.
    ///
    /// Shortcut for [ExpenseBuilder::new] for discoverability.
    pub fn build(amount: Decimal, category: CategoryName, date: NaiveDate, user_id: UserID) -> ExpenseBuilder {
        ExpenseBuilder::new(amount, category, date, user_id)
    }

    /// Create an expense from its parts.
    ///
    /// This is intended for store implementations reconstructing an expense
    /// from the database. The caller should ensure the parts satisfy the
    /// data-model constraints.
    pub fn new_unchecked(
        id: DatabaseID,
        user_id: UserID,
        amount: Decimal,
        category: CategoryName,
        date: NaiveDate,
        description: String,
        payment_method: PaymentMethod,
    ) -> Self {
        Self {
            id,
            user_id,
            amount,
            category,
            date,
            description,
            payment_method,
        }
    }

    /// The ID of the expense.
    pub fn id(&self) -> DatabaseID {
        self.id
    }

    /// The ID of the user that created this expense.
    pub fn user_id(&self) -> UserID {
        self.user_id
    }

    /// The amount of money spent.
    pub fn amount(&self) -> Decimal {
        self.amount
    }

    /// The user-defined category that describes the type of the expense.
    pub fn category(&self) -> &CategoryName {
        &self.category
    }

    /// The calendar date the expense occurred on.
    pub fn date(&self) -> NaiveDate {
        self.date
    }

    /// A text description of what the expense was for.
    pub fn description(&self) -> &str {
        &self.description
    }

    /// How the expense was paid.
    pub fn payment_method(&self) -> PaymentMethod {
        self.payment_method
    }
}

/// Builder for creating a new [Expense].
///
/// Finalize the builder by passing it to
/// [ExpenseStore::create](crate::stores::ExpenseStore::create), which assigns
/// the ID.
#[derive(Debug, Clone, PartialEq)]
pub struct ExpenseBuilder {
    pub(crate) amount: Decimal,
    pub(crate) category: CategoryName,
    pub(crate) date: NaiveDate,
    pub(crate) description: String,
    pub(crate) payment_method: PaymentMethod,
    pub(crate) user_id: UserID,
}

impl ExpenseBuilder {
    /// Create a builder for a new expense owned by `user_id`.
    ///
    /// The description defaults to the empty string and the payment method to
    /// [PaymentMethod::Cash].
    pub fn new(amount: Decimal, category: CategoryName, date: NaiveDate, user_id: UserID) -> Self {
        Self {
            amount,
            category,
            date,
            description: String::new(),
            payment_method: PaymentMethod::default(),
            user_id,
        }
    }

    /// Set the description for the expense.
    pub fn description(mut self, description: &str) -> Self {
        self.description = description.to_string();
        self
    }

    /// Set the payment method for the expense.
    pub fn payment_method(mut self, payment_method: PaymentMethod) -> Self {
        self.payment_method = payment_method;
        self
    }
}

#[cfg(test)]
mod amount_tests {
    use rust_decimal_macros::dec;

    use crate::Error;

    use super::validate_amount;

    #[test]
    fn accepts_two_decimal_places() {
        assert_eq!(validate_amount(dec!(10.50)), Ok(dec!(10.50)));
    }

    #[test]
    fn accepts_negative_amounts() {
        assert_eq!(validate_amount(dec!(-42.01)), Ok(dec!(-42.01)));
    }

    #[test]
    fn rejects_three_decimal_places() {
        let result = validate_amount(dec!(10.505));

        assert!(matches!(result, Err(Error::InvalidAmount(_))));
    }

    #[test]
    fn accepts_trailing_zeros_beyond_two_places() {
        // 10.500 is numerically two decimal places once trailing zeros are dropped.
        assert_eq!(validate_amount(dec!(10.500)), Ok(dec!(10.500)));
    }

    #[test]
    fn rejects_more_than_ten_digits() {
        let result = validate_amount(dec!(123456789.01));

        assert!(matches!(result, Err(Error::InvalidAmount(_))));
    }

    #[test]
    fn accepts_ten_digits() {
        assert_eq!(validate_amount(dec!(12345678.90)), Ok(dec!(12345678.90)));
    }
}


#[cfg(test)]
mod category_name_tests {
    use crate::Error;

    use super::{CategoryName, MAX_CATEGORY_LENGTH};

    #[test]
    fn new_succeeds_on_valid_name() {
        let result = CategoryName::new("Groceries");

        assert!(result.is_ok());
        assert_eq!(result.unwrap().as_str(), "Groceries");
    }

    #[test]
    fn new_fails_on_empty_name() {
        let result = CategoryName::new("");

        assert!(matches!(result, Err(Error::InvalidCategoryName(_))));
    }

    #[test]
    fn new_fails_on_too_long_name() {
        let name = "x".repeat(MAX_CATEGORY_LENGTH + 1);

        let result = CategoryName::new(&name);

        assert!(matches!(result, Err(Error::InvalidCategoryName(_))));
    }
}

#[cfg(test)]
mod payment_method_tests {
    use std::str::FromStr;

    use crate::Error;

    use super::PaymentMethod;

    #[test]
    fn from_str_parses_all_choices() {
        assert_eq!(PaymentMethod::from_str("cash"), Ok(PaymentMethod::Cash));
        assert_eq!(PaymentMethod::from_str("card"), Ok(PaymentMethod::Card));
        assert_eq!(PaymentMethod::from_str("upi"), Ok(PaymentMethod::Upi));
    }

    #[test]
    fn from_str_rejects_unknown_choice() {
        let result = PaymentMethod::from_str("cheque");

        assert!(matches!(result, Err(Error::InvalidPaymentMethod(_))));
    }

    #[test]
    fn default_is_cash() {
        assert_eq!(PaymentMethod::default(), PaymentMethod::Cash);
    }

    #[test]
    fn serializes_as_lowercase_string() {
        let value = serde_json::to_value(PaymentMethod::Upi).unwrap();

        assert_eq!(value, serde_json::json!("upi"));
    }
}
