//! This module defines the domain data types.

pub use expense::{
    CategoryName, Expense, ExpenseBuilder, PaymentMethod, validate_amount, validate_description,
};
pub use password::{PasswordHash, ValidatedPassword};
pub use user::{User, UserID, Username};

mod expense;
mod password;
mod user;

/// Alias for the integer type used for mapping to database IDs.
pub type DatabaseID = i64;
