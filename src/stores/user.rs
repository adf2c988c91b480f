//! Defines the user store trait and its error type.

use thiserror::Error;

use crate::models::{PasswordHash, User, Username};

/// Handles the creation and retrieval of [User] objects.
pub trait UserStore {
    /// Create a new user.
    fn create(
        &mut self,
        username: Username,
        password_hash: PasswordHash,
    ) -> Result<User, UserError>;

    /// Get a user by their username.
    ///
    /// Returns [UserError::NotFound] if no user with the given username exists.
    fn get_by_username(&self, username: &Username) -> Result<User, UserError>;
}

/// Errors that can occur during the creation or retrieval of a user.
#[derive(Debug, Error, PartialEq)]
pub enum UserError {
    /// The username used to create the user is already in use. The client
    /// should try again with a different username.
    #[error("a user with that username already exists")]
    DuplicateUsername,

    /// There was no user in the database that matched the given details. The client can try again
    /// with different details.
    #[error("no user found with the given details")]
    NotFound,

    /// An unhandled/unexpected SQL error.
    #[error("an error occurred while accessing the user table: {0}")]
    SqlError(rusqlite::Error),
}

impl From<rusqlite::Error> for UserError {
    fn from(value: rusqlite::Error) -> Self {
        match value {
            // Code 2067 occurs when a UNIQUE constraint failed.
            rusqlite::Error::SqliteFailure(sql_error, Some(ref desc))
                if sql_error.extended_code == 2067 && desc.contains("username") =>
            {
                UserError::DuplicateUsername
            }
            rusqlite::Error::QueryReturnedNoRows => UserError::NotFound,
            error => UserError::SqlError(error),
        }
    }
}
