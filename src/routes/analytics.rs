//! Route handler for the expense analytics endpoint.

use axum::{
    Json,
    extract::{Query, State},
};

use crate::{
    Error,
    analytics::{ExpenseSummary, summarize_expenses},
    auth::Claims,
    routes::DateFilter,
    state::ExpenseState,
    stores::{ExpenseQuery, ExpenseStore},
};

/// A route handler for aggregated expense analytics.
///
/// Pulls the caller's expenses, optionally restricted by the inclusive
/// `start_date` and `end_date` query parameters, and rolls them up with
/// [summarize_expenses]. Only the caller's own records are aggregated.
///
/// A caller with no matching records gets a zero total and empty collections,
/// not an error.
pub async fn get_analytics<E>(
    State(state): State<ExpenseState<E>>,
    claims: Claims,
    Query(filter): Query<DateFilter>,
) -> Result<Json<ExpenseSummary>, Error>
where
    E: ExpenseStore + Send + Sync,
{
    let expenses = state.expense_store.get_query(ExpenseQuery::owned_by(
        claims.user_id(),
        filter.start_date,
        filter.end_date,
    ))?;

    Ok(Json(summarize_expenses(&expenses)))
}
