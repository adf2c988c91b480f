//! Implements a SQLite backed expense store.
use std::{
    str::FromStr,
    sync::{Arc, Mutex},
};

use rusqlite::{
    Connection, Row, params_from_iter,
    types::{Type, Value},
};
use rust_decimal::Decimal;

use crate::{
    Error,
    db::{CreateTable, MapRow},
    models::{CategoryName, DatabaseID, Expense, ExpenseBuilder, PaymentMethod, UserID},
    stores::{ExpenseQuery, ExpenseStore},
};

/// Stores expenses in a SQLite database.
///
/// Amounts are stored as TEXT and parsed back into [Decimal] so that they
/// never pass through binary floats.
///
/// Note that because an expense references the [User](crate::models::User)
/// model, the user table must be set up in the database.
#[derive(Debug, Clone)]
pub struct SQLiteExpenseStore {
    connection: Arc<Mutex<Connection>>,
}

impl SQLiteExpenseStore {
    /// Create a new store for the SQLite `connection`.
    pub fn new(connection: Arc<Mutex<Connection>>) -> Self {
        Self { connection }
    }
}

impl ExpenseStore for SQLiteExpenseStore {
    /// Create a new expense in the database.
    ///
    /// # Errors
    /// This function will return an [Error::SqlError] if there is an SQL
    /// error, e.g. the builder's user ID does not refer to a valid user.
    fn create(&mut self, builder: ExpenseBuilder) -> Result<Expense, Error> {
        let expense = self
            .connection
            .lock()
            .unwrap()
            .prepare(
                "INSERT INTO expense (user_id, amount, category, date, description, payment_method)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                 RETURNING id, user_id, amount, category, date, description, payment_method",
            )?
            .query_row(
                (
                    builder.user_id.as_i64(),
                    builder.amount.to_string(),
                    builder.category.as_str(),
                    builder.date,
                    &builder.description,
                    builder.payment_method.as_str(),
                ),
                Self::map_row,
            )?;

        Ok(expense)
    }

    /// Retrieve an expense in the database by its `id`.
    ///
    /// # Errors
    /// This function will return a:
    /// - [Error::NotFound] if `id` does not refer to a valid expense,
    /// - or [Error::SqlError] if there is some other SQL error.
    fn get(&self, id: DatabaseID) -> Result<Expense, Error> {
        let expense = self
            .connection
            .lock()
            .unwrap()
            .prepare(
                "SELECT id, user_id, amount, category, date, description, payment_method
                 FROM expense WHERE id = :id",
            )?
            .query_row(&[(":id", &id)], Self::map_row)?;

        Ok(expense)
    }

    /// Query for expenses in the database.
    ///
    /// Results are returned in insertion order. The date bounds are inclusive
    /// and applied independently of each other.
    ///
    /// # Errors
    /// This function will return an [Error::SqlError] if there is an SQL error.
    fn get_query(&self, query: ExpenseQuery) -> Result<Vec<Expense>, Error> {
        let mut query_string_parts = vec![
            "SELECT id, user_id, amount, category, date, description, payment_method FROM expense"
                .to_string(),
        ];
        let mut where_clause_parts = vec![];
        let mut query_parameters = vec![];

        if let Some(user_id) = query.user_id {
            where_clause_parts.push(format!("user_id = ?{}", query_parameters.len() + 1));
            query_parameters.push(Value::Integer(user_id.as_i64()));
        }

        if let Some(date_from) = query.date_from {
            where_clause_parts.push(format!("date >= ?{}", query_parameters.len() + 1));
            query_parameters.push(Value::Text(date_from.to_string()));
        }

        if let Some(date_to) = query.date_to {
            where_clause_parts.push(format!("date <= ?{}", query_parameters.len() + 1));
            query_parameters.push(Value::Text(date_to.to_string()));
        }

        if !where_clause_parts.is_empty() {
            query_string_parts.push(String::from("WHERE ") + &where_clause_parts.join(" AND "));
        }

        query_string_parts.push("ORDER BY id ASC".to_string());

        let query_string = query_string_parts.join(" ");
        let params = params_from_iter(query_parameters.iter());

        self.connection
            .lock()
            .unwrap()
            .prepare(&query_string)?
            .query_map(params, Self::map_row)?
            .map(|maybe_expense| maybe_expense.map_err(Error::SqlError))
            .collect()
    }
}

impl CreateTable for SQLiteExpenseStore {
    fn create_table(connection: &Connection) -> Result<(), rusqlite::Error> {
        connection.execute(
            "CREATE TABLE IF NOT EXISTS expense (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    user_id INTEGER NOT NULL,
                    amount TEXT NOT NULL,
                    category TEXT NOT NULL,
                    date TEXT NOT NULL,
                    description TEXT NOT NULL,
                    payment_method TEXT NOT NULL,
                    FOREIGN KEY(user_id) REFERENCES user(id) ON UPDATE CASCADE ON DELETE CASCADE
                    )",
            (),
        )?;

        Ok(())
    }
}

impl MapRow for SQLiteExpenseStore {
    type ReturnType = Expense;

    fn map_row_with_offset(row: &Row, offset: usize) -> Result<Self::ReturnType, rusqlite::Error> {
        let id = row.get(offset)?;
        let user_id = UserID::new(row.get(offset + 1)?);

        let amount_text: String = row.get(offset + 2)?;
        let amount = Decimal::from_str(&amount_text).map_err(|error| {
            rusqlite::Error::FromSqlConversionFailure(offset + 2, Type::Text, Box::new(error))
        })?;

        let category: String = row.get(offset + 3)?;
        let date = row.get(offset + 4)?;
        let description = row.get(offset + 5)?;

        let payment_method_text: String = row.get(offset + 6)?;
        let payment_method = PaymentMethod::from_str(&payment_method_text).map_err(|error| {
            rusqlite::Error::FromSqlConversionFailure(offset + 6, Type::Text, Box::new(error))
        })?;

        Ok(Expense::new_unchecked(
            id,
            user_id,
            amount,
            CategoryName::new_unchecked(&category),
            date,
            description,
            payment_method,
        ))
    }
}
