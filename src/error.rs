//! Defines the app level error type and its conversion to JSON HTTP responses.

use std::collections::BTreeMap;

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use serde_json::json;

/// A map from field name to the list of validation messages for that field.
///
/// This is the structure returned to the client with a 400 response when a
/// request payload fails validation.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ValidationErrors(BTreeMap<&'static str, Vec<String>>);

impl ValidationErrors {
    /// Record a validation `message` against `field`.
    pub fn push(&mut self, field: &'static str, message: String) {
        self.0.entry(field).or_default().push(message);
    }

    /// Whether any field has recorded an error.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The messages recorded against `field`, if any.
    pub fn get(&self, field: &str) -> Option<&Vec<String>> {
        self.0.get(field)
    }
}

/// The errors that may occur in the application.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// One or more fields in a request payload failed validation.
    #[error("one or more fields failed validation")]
    Validation(ValidationErrors),

    /// The user provided an invalid username and password combination.
    #[error("invalid username or password")]
    InvalidCredentials,

    /// The user provided a password that is too easy to guess.
    #[error("password is too weak: {0}")]
    TooWeak(String),

    /// An unexpected error occurred with the underlying hashing library.
    ///
    /// The error string should only be logged for debugging on the server.
    /// When communicating with the application client this error should be
    /// replaced with a general error type indicating an internal server error.
    #[error("hashing failed: {0}")]
    HashingError(String),

    /// An amount failed the fixed-point constraints (at most two decimal
    /// places and at most ten significant digits).
    #[error("invalid amount: {0}")]
    InvalidAmount(String),

    /// A category label was empty or too long.
    #[error("invalid category: {0}")]
    InvalidCategoryName(String),

    /// A username was empty, too long, or contained disallowed characters.
    #[error("invalid username: {0}")]
    InvalidUsername(String),

    /// A payment method string did not name one of the supported methods.
    #[error("invalid payment method: {0}")]
    InvalidPaymentMethod(String),

    /// A description exceeded the maximum length.
    #[error("the description must be at most {0} characters")]
    DescriptionTooLong(usize),

    /// The requested resource was not found.
    ///
    /// For HTTP request handlers, the client should check that the parameters
    /// (e.g., ID) are correct and that the resource has been created.
    ///
    /// Internally, this error may occur when a query returns no rows.
    #[error("the requested resource could not be found")]
    NotFound,

    /// An unhandled/unexpected SQL error.
    #[error("an unexpected SQL error occurred: {0}")]
    SqlError(rusqlite::Error),
}

impl Error {
    /// The client-facing message for a single-field validation failure.
    ///
    /// Used when collecting errors into a [ValidationErrors] map, where the
    /// field name is the map key and only the message is shown.
    pub fn validation_message(self) -> String {
        match self {
            Error::InvalidAmount(message)
            | Error::InvalidCategoryName(message)
            | Error::InvalidUsername(message)
            | Error::InvalidPaymentMethod(message)
            | Error::TooWeak(message) => message,
            Error::DescriptionTooLong(max) => {
                format!("Ensure this field has no more than {max} characters.")
            }
            error => error.to_string(),
        }
    }
}

impl From<rusqlite::Error> for Error {
    fn from(value: rusqlite::Error) -> Self {
        match value {
            rusqlite::Error::QueryReturnedNoRows => Error::NotFound,
            error => {
                tracing::error!("an unhandled SQL error occurred: {}", error);
                Error::SqlError(error)
            }
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        match self {
            Error::Validation(errors) => (
                StatusCode::BAD_REQUEST,
                Json(json!({
                    "message": "Invalid inputs, please try again",
                    "errors": errors,
                })),
            )
                .into_response(),
            Error::NotFound => (
                StatusCode::NOT_FOUND,
                Json(json!({
                    "error": "The requested resource could not be found.",
                })),
            )
                .into_response(),
            // Any errors that are not handled above are not intended to be shown to the client.
            error => {
                tracing::error!("An unexpected error occurred: {}", error);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({
                        "error": "Internal server error",
                    })),
                )
                    .into_response()
            }
        }
    }
}
