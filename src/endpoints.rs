//! The API endpoints URIs.
//!
//! The trailing slashes are part of the external interface and are kept
//! verbatim.

/// The route for creating a new account.
pub const SIGN_UP: &str = "/signup/";
/// The route for exchanging credentials for a token pair.
pub const LOG_IN: &str = "/login/";
/// The route for the client to log out.
pub const LOG_OUT: &str = "/logout/";
/// The route for creating and listing the caller's expenses.
pub const EXPENSES: &str = "/expenses/";
/// The route for aggregated analytics over the caller's expenses.
pub const EXPENSES_ANALYTICS: &str = "/expenses/analytics/";
