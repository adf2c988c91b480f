//! Implements the structs that hold the state of the REST server.
//!
//! Each group of route handlers declares a narrow state struct holding only
//! what it uses; the [FromRef] impls project the full [AppState] onto them so
//! the store handles and token keys are passed explicitly into each
//! operation.

use std::marker::{Send, Sync};

use axum::extract::FromRef;
use jsonwebtoken::{DecodingKey, EncodingKey};

use crate::stores::{ExpenseStore, UserStore};

/// The keys used for signing and verifying JSON Web Tokens.
#[derive(Clone)]
pub struct JwtKeys {
    /// The key for signing new tokens.
    pub encoding_key: EncodingKey,
    /// The key for verifying presented tokens.
    pub decoding_key: DecodingKey,
}

impl JwtKeys {
    /// Derive the signing and verifying keys from a shared `secret`.
    pub fn from_secret(secret: &str) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_ref()),
            decoding_key: DecodingKey::from_secret(secret.as_ref()),
        }
    }
}

/// The state of the REST server.
#[derive(Clone)]
pub struct AppState<E, U>
where
    E: ExpenseStore + Send + Sync,
    U: UserStore + Send + Sync,
{
    /// The keys used for signing and verifying JSON Web Tokens.
    pub jwt_keys: JwtKeys,
    /// The store for managing [expenses](crate::models::Expense).
    pub expense_store: E,
    /// The store for managing [users](crate::models::User).
    pub user_store: U,
}

impl<E, U> AppState<E, U>
where
    E: ExpenseStore + Send + Sync,
    U: UserStore + Send + Sync,
{
    /// Create a new [AppState] with keys derived from `jwt_secret`.
    pub fn new(jwt_secret: &str, expense_store: E, user_store: U) -> Self {
        Self {
            jwt_keys: JwtKeys::from_secret(jwt_secret),
            expense_store,
            user_store,
        }
    }
}

/// The state needed to verify a caller's bearer token.
#[derive(Clone)]
pub struct AuthState {
    /// The key for verifying presented tokens.
    pub decoding_key: DecodingKey,
}

impl<E, U> FromRef<AppState<E, U>> for AuthState
where
    E: ExpenseStore + Send + Sync,
    U: UserStore + Send + Sync,
{
    fn from_ref(state: &AppState<E, U>) -> Self {
        Self {
            decoding_key: state.jwt_keys.decoding_key.clone(),
        }
    }
}

/// The state needed to verify credentials and issue a token pair.
#[derive(Clone)]
pub struct LogInState<U>
where
    U: UserStore + Send + Sync,
{
    /// The store for looking up the user logging in.
    pub user_store: U,
    /// The key for signing new tokens.
    pub encoding_key: EncodingKey,
}

impl<E, U> FromRef<AppState<E, U>> for LogInState<U>
where
    E: ExpenseStore + Send + Sync,
    U: UserStore + Clone + Send + Sync,
{
    fn from_ref(state: &AppState<E, U>) -> Self {
        Self {
            user_store: state.user_store.clone(),
            encoding_key: state.jwt_keys.encoding_key.clone(),
        }
    }
}

/// The state needed to create or query expenses.
#[derive(Clone)]
pub struct ExpenseState<E>
where
    E: ExpenseStore + Send + Sync,
{
    /// The store for managing [expenses](crate::models::Expense).
    pub expense_store: E,
}

impl<E, U> FromRef<AppState<E, U>> for ExpenseState<E>
where
    E: ExpenseStore + Clone + Send + Sync,
    U: UserStore + Send + Sync,
{
    fn from_ref(state: &AppState<E, U>) -> Self {
        Self {
            expense_store: state.expense_store.clone(),
        }
    }
}

/// The state needed to register a new account.
#[derive(Clone)]
pub struct UserState<U>
where
    U: UserStore + Send + Sync,
{
    /// The store for managing [users](crate::models::User).
    pub user_store: U,
}

impl<E, U> FromRef<AppState<E, U>> for UserState<U>
where
    E: ExpenseStore + Send + Sync,
    U: UserStore + Clone + Send + Sync,
{
    fn from_ref(state: &AppState<E, U>) -> Self {
        Self {
            user_store: state.user_store.clone(),
        }
    }
}
