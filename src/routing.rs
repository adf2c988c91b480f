//! Application router configuration.

use axum::{
    Router,
    routing::{get, post},
};

use crate::{
    AppState, auth, endpoints,
    routes::{create_expense, get_analytics, get_expenses, register_user},
    stores::{ExpenseStore, UserStore},
};

/// Return a router with all the app's routes.
///
/// Signup and login are open; every other route authenticates the caller
/// through the [Claims](crate::auth::Claims) extractor.
pub fn build_router<E, U>(state: AppState<E, U>) -> Router
where
    E: ExpenseStore + Clone + Send + Sync + 'static,
    U: UserStore + Clone + Send + Sync + 'static,
{
    Router::new()
        .route(endpoints::SIGN_UP, post(register_user::<U>))
        .route(endpoints::LOG_IN, post(auth::log_in::<U>))
        .route(endpoints::LOG_OUT, post(auth::log_out))
        .route(
            endpoints::EXPENSES,
            post(create_expense::<E>).get(get_expenses::<E>),
        )
        .route(endpoints::EXPENSES_ANALYTICS, get(get_analytics::<E>))
        .with_state(state)
}
