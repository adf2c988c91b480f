//! This file defines a user of the application and its supporting types.

use std::fmt::Display;

use serde::{Deserialize, Serialize};

use crate::{Error, models::PasswordHash};

/// A newtype wrapper for integer user IDs.
/// This helps disambiguate user IDs from other types of IDs, leading to better compile time
/// errors, and more flexible generics that can have distinct implementations for multiple ID types.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserID(i64);

impl UserID {
    /// Create a user ID from a raw integer.
    pub fn new(id: i64) -> Self {
        Self(id)
    }

    /// The raw integer form of the ID, e.g. for use in SQL queries.
    pub fn as_i64(&self) -> i64 {
        self.0
    }
}

impl Display for UserID {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// The maximum number of characters a username may have.
pub const MAX_USERNAME_LENGTH: usize = 150;

/// A validated username.
///
/// Usernames are non-empty, at most [MAX_USERNAME_LENGTH] characters, and
/// restricted to ASCII letters, digits, and the characters `@`, `.`, `+`,
/// `-`, and `_`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Username(String);

impl Username {
    /// Create and validate a username from a string.
    ///
    /// # Errors
    /// Returns [Error::InvalidUsername] if the string is empty, too long, or
    /// contains a disallowed character.
    pub fn new(username: &str) -> Result<Self, Error> {
        if username.is_empty() {
            return Err(Error::InvalidUsername(
                "This field may not be blank.".to_string(),
            ));
        }

        if username.chars().count() > MAX_USERNAME_LENGTH {
            return Err(Error::InvalidUsername(format!(
                "Ensure this field has no more than {MAX_USERNAME_LENGTH} characters."
            )));
        }

        let is_allowed =
            |c: char| c.is_ascii_alphanumeric() || matches!(c, '@' | '.' | '+' | '-' | '_');

        if !username.chars().all(is_allowed) {
            return Err(Error::InvalidUsername(
                "Enter a valid username. This value may contain only letters, numbers, \
                and @/./+/-/_ characters."
                    .to_string(),
            ));
        }

        Ok(Self(username.to_string()))
    }

    /// Create a new `Username` without any validation.
    ///
    /// The caller should ensure that `username` satisfies the username
    /// constraints, e.g. because it was read back from the database.
    pub fn new_unchecked(username: &str) -> Self {
        Self(username.to_string())
    }

    /// The username as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for Username {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A user of the application.
///
/// Users own the expense records they create; a caller may only see their own
/// records.
#[derive(Debug, Clone, PartialEq)]
pub struct User {
    id: UserID,
    username: Username,
    password_hash: PasswordHash,
}

impl User {
    /// Create a user from its parts.
    ///
    /// This is intended for store implementations reconstructing a user from
    /// the database; new accounts should go through
    /// [UserStore::create](crate::stores::UserStore::create).
    pub fn new(id: UserID, username: Username, password_hash: PasswordHash) -> Self {
        Self {
            id,
            username,
            password_hash,
        }
    }

    /// The user's ID in the database.
    pub fn id(&self) -> UserID {
        self.id
    }

    /// The username associated with the user.
    pub fn username(&self) -> &Username {
        &self.username
    }

    /// The user's password hash.
    pub fn password_hash(&self) -> &PasswordHash {
        &self.password_hash
    }
}
