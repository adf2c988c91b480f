//! The HTTP route handlers for the JSON API.

use chrono::NaiveDate;
use serde::Deserialize;

mod analytics;
mod expense;
mod register;

pub use analytics::get_analytics;
pub use expense::{CreateExpenseResponse, create_expense, get_expenses};
pub use register::register_user;

/// The optional date filters accepted by the list and analytics endpoints.
///
/// Both bounds are inclusive and applied independently: a record dated
/// exactly `start_date` or `end_date` is included.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct DateFilter {
    /// Include only expenses dated on or after this date.
    pub start_date: Option<NaiveDate>,
    /// Include only expenses dated on or before this date.
    pub end_date: Option<NaiveDate>,
}
