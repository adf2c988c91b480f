//! Defines the expense store trait.

use chrono::NaiveDate;

use crate::{
    Error,
    models::{DatabaseID, Expense, ExpenseBuilder, UserID},
};

/// Handles the creation and retrieval of expense records.
pub trait ExpenseStore {
    /// Create a new expense in the store, assigning its ID.
    fn create(&mut self, builder: ExpenseBuilder) -> Result<Expense, Error>;

    /// Retrieve an expense from the store by its ID.
    fn get(&self, id: DatabaseID) -> Result<Expense, Error>;

    /// Retrieve expenses from the store in the way defined by `query`.
    fn get_query(&self, query: ExpenseQuery) -> Result<Vec<Expense>, Error>;
}

/// Defines how expenses should be fetched from [ExpenseStore::get_query].
///
/// The default query is unscoped and unbounded: it returns every expense in
/// the store in insertion order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExpenseQuery {
    /// Include only expenses owned by this user. `None` returns every user's
    /// expenses.
    pub user_id: Option<UserID>,
    /// Include only expenses dated on or after this date.
    pub date_from: Option<NaiveDate>,
    /// Include only expenses dated on or before this date.
    pub date_to: Option<NaiveDate>,
}

impl ExpenseQuery {
    /// A query for every expense owned by `user_id`, optionally bounded by
    /// the inclusive `date_from` and `date_to` filters.
    pub fn owned_by(
        user_id: UserID,
        date_from: Option<NaiveDate>,
        date_to: Option<NaiveDate>,
    ) -> Self {
        Self {
            user_id: Some(user_id),
            date_from,
            date_to,
        }
    }
}
