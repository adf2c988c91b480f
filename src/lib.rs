//! Outgoings is a small personal-finance web backend.
//!
//! Users register an account, log in to receive a pair of JSON Web Tokens,
//! submit expense records, and retrieve date-filtered lists and aggregated
//! analytics (total, category breakdown, daily/weekly/monthly trends).
//!
//! This library provides a JSON REST API served with axum. Expense records
//! are persisted to SQLite behind the store traits in [stores], and the
//! analytics rollups are computed by [analytics].

#![warn(missing_docs)]

use std::{net::SocketAddr, time::Duration};

use axum_server::Handle;
use tokio::signal;

pub mod analytics;
pub mod auth;
pub mod db;
pub mod endpoints;
mod error;
pub mod models;
pub mod routes;
mod routing;
mod state;
pub mod stores;

pub use error::{Error, ValidationErrors};
pub use routing::build_router;
pub use state::{AppState, AuthState, ExpenseState, JwtKeys, LogInState, UserState};

/// An async task that waits for either the ctrl+c or terminate signal, whichever comes first, and
/// then signals the server to shut down gracefully.
///
/// `handle` is a handle to an Axum `Server`.
pub async fn graceful_shutdown(handle: Handle<SocketAddr>) {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::debug!("Received ctrl+c signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
        _ = terminate => {
            tracing::debug!("Received terminate signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
    }
}
