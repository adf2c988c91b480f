//! Implements a SQLite backed user store.
use std::sync::{Arc, Mutex};

use rusqlite::{Connection, Row};

use crate::{
    db::{CreateTable, MapRow},
    models::{PasswordHash, User, UserID, Username},
    stores::{UserError, UserStore},
};

/// Stores users in a SQLite database.
#[derive(Debug, Clone)]
pub struct SQLiteUserStore {
    connection: Arc<Mutex<Connection>>,
}

impl SQLiteUserStore {
    /// Create a new store for the SQLite `connection`.
    pub fn new(connection: Arc<Mutex<Connection>>) -> Self {
        Self { connection }
    }
}

impl UserStore for SQLiteUserStore {
    /// Create a new user in the database.
    ///
    /// # Errors
    /// This function will return a:
    /// - [UserError::DuplicateUsername] if the username is already in use,
    /// - or [UserError::SqlError] if there is some other SQL error.
    fn create(
        &mut self,
        username: Username,
        password_hash: PasswordHash,
    ) -> Result<User, UserError> {
        let connection = self.connection.lock().unwrap();

        connection.execute(
            "INSERT INTO user (username, password) VALUES (?1, ?2)",
            (username.as_str(), password_hash.to_string()),
        )?;

        let id = UserID::new(connection.last_insert_rowid());

        Ok(User::new(id, username, password_hash))
    }

    /// Get the user from the database that has the specified `username`.
    ///
    /// # Errors
    /// This function will return a:
    /// - [UserError::NotFound] if there is no user with the given username,
    /// - or [UserError::SqlError] if there is some other SQL error.
    fn get_by_username(&self, username: &Username) -> Result<User, UserError> {
        self.connection
            .lock()
            .unwrap()
            .prepare("SELECT id, username, password FROM user WHERE username = :username")?
            .query_row(&[(":username", username.as_str())], Self::map_row)
            .map_err(|error| error.into())
    }
}

impl CreateTable for SQLiteUserStore {
    fn create_table(connection: &Connection) -> Result<(), rusqlite::Error> {
        connection.execute(
            "CREATE TABLE IF NOT EXISTS user (
                    id INTEGER PRIMARY KEY,
                    username TEXT UNIQUE NOT NULL,
                    password TEXT NOT NULL
                    )",
            (),
        )?;

        Ok(())
    }
}

impl MapRow for SQLiteUserStore {
    type ReturnType = User;

    fn map_row_with_offset(row: &Row, offset: usize) -> Result<Self::ReturnType, rusqlite::Error> {
        let raw_id = row.get(offset)?;
        let raw_username: String = row.get(offset + 1)?;
        let raw_password_hash: String = row.get(offset + 2)?;

        Ok(User::new(
            UserID::new(raw_id),
            Username::new_unchecked(&raw_username),
            PasswordHash::new_unchecked(&raw_password_hash),
        ))
    }
}
