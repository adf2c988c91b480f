//! JSON Web Token issuance and verification.
//!
//! Logging in returns a pair of bearer tokens (a short-lived access token and
//! a longer-lived refresh token). Protected route handlers authenticate the
//! caller by taking [Claims] as an extractor argument, which reads and
//! verifies the `Authorization: Bearer` header.
//!
//! Logging out is a stateless acknowledgement: tokens are not tracked server
//! side, which is acceptable because access tokens expire after a few
//! minutes.

use axum::{
    Json, RequestPartsExt,
    extract::{FromRef, FromRequestParts, State},
    http::{StatusCode, request::Parts},
    response::{IntoResponse, Response},
};
use axum_extra::{
    TypedHeader,
    headers::{Authorization, authorization::Bearer},
};
use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, TokenData, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::{
    models::{User, UserID, Username},
    state::{AuthState, LogInState},
    stores::{UserError, UserStore},
};

/// Distinguishes the two tokens in a [TokenPair].
///
/// Only access tokens authenticate requests to protected routes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenType {
    /// A short-lived token that authenticates requests.
    Access,
    /// A longer-lived token intended only for obtaining new access tokens.
    Refresh,
}

/// The contents of a JSON Web Token.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// The username the token was issued to.
    pub sub: String,
    /// The ID of the user the token was issued to.
    pub uid: i64,
    /// The expiry time of the token as a unix timestamp.
    pub exp: usize,
    /// The time the token was issued as a unix timestamp.
    pub iat: usize,
    /// Whether this is an access or refresh token.
    pub token_type: TokenType,
}

impl Claims {
    /// The ID of the user the token was issued to.
    pub fn user_id(&self) -> UserID {
        UserID::new(self.uid)
    }
}

impl<S> FromRequestParts<S> for Claims
where
    AuthState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let TypedHeader(Authorization(bearer)) = parts
            .extract::<TypedHeader<Authorization<Bearer>>>()
            .await
            .map_err(|_| AuthError::MissingToken)?;

        let auth_state = AuthState::from_ref(state);

        let token_data = decode_token(bearer.token(), &auth_state.decoding_key)?;

        // A refresh token must not grant access to protected routes.
        if token_data.claims.token_type != TokenType::Access {
            return Err(AuthError::InvalidToken);
        }

        Ok(token_data.claims)
    }
}

/// The access and refresh tokens returned by the login endpoint.
#[derive(Debug, Serialize, Deserialize)]
pub struct TokenPair {
    /// The token that authenticates requests to protected routes.
    pub access: String,
    /// The longer-lived companion token.
    pub refresh: String,
}

impl TokenPair {
    /// Issue a fresh access and refresh token pair for `user`.
    ///
    /// # Errors
    /// Returns [AuthError::TokenCreation] if a token could not be signed.
    pub fn issue(user: &User, encoding_key: &EncodingKey) -> Result<Self, AuthError> {
        Ok(Self {
            access: encode_token(user, TokenType::Access, encoding_key)?,
            refresh: encode_token(user, TokenType::Refresh, encoding_key)?,
        })
    }
}

/// The username and password presented to the login endpoint.
#[derive(Debug, Deserialize)]
pub struct Credentials {
    /// Username entered during log in.
    #[serde(default)]
    pub username: String,
    /// Password entered during log in.
    #[serde(default)]
    pub password: String,
}

/// The errors that may occur while authenticating a caller.
#[derive(Debug, PartialEq, Eq)]
pub enum AuthError {
    /// The presented username and password do not match a registered account.
    WrongCredentials,
    /// The request had no `Authorization: Bearer` header.
    MissingToken,
    /// The presented token could not be verified, has expired, or is not an
    /// access token.
    InvalidToken,
    /// A token could not be signed.
    TokenCreation,
    /// An unexpected error occurred while verifying credentials.
    InternalError,
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AuthError::WrongCredentials => (
                StatusCode::UNAUTHORIZED,
                "No active account found with the given credentials",
            ),
            AuthError::MissingToken => (
                StatusCode::UNAUTHORIZED,
                "Authentication credentials were not provided",
            ),
            AuthError::InvalidToken => (StatusCode::UNAUTHORIZED, "Invalid token"),
            AuthError::TokenCreation => (StatusCode::INTERNAL_SERVER_ERROR, "Token creation error"),
            AuthError::InternalError => {
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
            }
        };

        let body = Json(json!({
            "error": error_message,
        }));

        (status, body).into_response()
    }
}

/// Handler for login requests: verifies the credentials and responds with a
/// fresh [TokenPair].
///
/// # Errors
///
/// This function will return an error in a few situations.
/// - The username does not belong to a registered user.
/// - The password is not correct.
/// - An internal error occurred when verifying the password.
pub async fn log_in<U>(
    State(state): State<LogInState<U>>,
    Json(credentials): Json<Credentials>,
) -> Result<Json<TokenPair>, AuthError>
where
    U: UserStore + Send + Sync,
{
    let user = state
        .user_store
        .get_by_username(&Username::new_unchecked(&credentials.username))
        .map_err(|error| match error {
            UserError::NotFound => AuthError::WrongCredentials,
            error => {
                tracing::error!("Error looking up user: {error}");
                AuthError::InternalError
            }
        })?;

    let password_is_correct = user
        .password_hash()
        .verify(&credentials.password)
        .map_err(|error| {
            tracing::error!("Error verifying password: {error}");
            AuthError::InternalError
        })?;

    if !password_is_correct {
        return Err(AuthError::WrongCredentials);
    }

    let token_pair = TokenPair::issue(&user, &state.encoding_key)?;

    Ok(Json(token_pair))
}

/// Handler for logout requests.
///
/// Tokens are stateless, so there is nothing to invalidate server side; the
/// client discards its tokens and this handler acknowledges the request.
pub async fn log_out(_claims: Claims) -> (StatusCode, Json<Value>) {
    (
        StatusCode::OK,
        Json(json!({
            "message": "Logged out on client",
        })),
    )
}

fn encode_token(
    user: &User,
    token_type: TokenType,
    encoding_key: &EncodingKey,
) -> Result<String, AuthError> {
    let now = Utc::now();
    let lifetime = match token_type {
        TokenType::Access => Duration::minutes(15),
        TokenType::Refresh => Duration::days(1),
    };

    let claims = Claims {
        sub: user.username().to_string(),
        uid: user.id().as_i64(),
        exp: (now + lifetime).timestamp() as usize,
        iat: now.timestamp() as usize,
        token_type,
    };

    encode(&Header::default(), &claims, encoding_key).map_err(|error| {
        tracing::error!("Error signing token: {error}");
        AuthError::TokenCreation
    })
}

fn decode_token(token: &str, decoding_key: &DecodingKey) -> Result<TokenData<Claims>, AuthError> {
    decode(token, decoding_key, &Validation::default()).map_err(|_| AuthError::InvalidToken)
}

#[cfg(test)]
mod token_tests {
    use crate::{
        models::{PasswordHash, User, UserID, Username},
        state::JwtKeys,
    };

    use super::{TokenPair, TokenType, decode_token};

    fn get_test_user() -> User {
        User::new(
            UserID::new(42),
            Username::new_unchecked("alice"),
            PasswordHash::new_unchecked("notarealhash"),
        )
    }

    #[test]
    fn issued_access_token_decodes_to_issuing_user() {
        let keys = JwtKeys::from_secret("foobar");
        let user = get_test_user();

        let pair = TokenPair::issue(&user, &keys.encoding_key).unwrap();
        let claims = decode_token(&pair.access, &keys.decoding_key).unwrap().claims;

        assert_eq!(claims.sub, "alice");
        assert_eq!(claims.uid, 42);
        assert_eq!(claims.user_id(), user.id());
        assert_eq!(claims.token_type, TokenType::Access);
    }

    #[test]
    fn issued_refresh_token_is_marked_as_refresh() {
        let keys = JwtKeys::from_secret("foobar");

        let pair = TokenPair::issue(&get_test_user(), &keys.encoding_key).unwrap();
        let claims = decode_token(&pair.refresh, &keys.decoding_key).unwrap().claims;

        assert_eq!(claims.token_type, TokenType::Refresh);
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn decode_fails_with_wrong_secret() {
        let keys = JwtKeys::from_secret("foobar");
        let other_keys = JwtKeys::from_secret("not foobar");

        let pair = TokenPair::issue(&get_test_user(), &keys.encoding_key).unwrap();

        assert!(decode_token(&pair.access, &other_keys.decoding_key).is_err());
    }
}

#[cfg(test)]
mod log_in_tests {
    use axum::{
        Json, Router,
        http::StatusCode,
        routing::{get, post},
    };
    use axum_test::TestServer;
    use rusqlite::Connection;
    use serde_json::json;

    use crate::{
        auth,
        models::{PasswordHash, Username, ValidatedPassword},
        stores::{
            UserStore,
            sqlite::{SQLAppState, create_app_state},
        },
    };

    use super::{Claims, TokenPair};

    fn get_test_app_state() -> SQLAppState {
        let connection =
            Connection::open_in_memory().expect("Could not open database in memory.");

        create_app_state(connection, "42").expect("Could not create app state.")
    }

    fn create_test_user(state: &mut SQLAppState, username: &str, password: &str) {
        let password_hash =
            PasswordHash::new(ValidatedPassword::new_unchecked(password), 4).unwrap();

        state
            .user_store
            .create(Username::new_unchecked(username), password_hash)
            .expect("Could not create user.");
    }

    async fn hello(claims: Claims) -> Json<String> {
        Json(format!("Hello, {}!", claims.sub))
    }

    fn get_test_server(state: SQLAppState) -> TestServer {
        let app = Router::new()
            .route("/login", post(auth::log_in::<crate::stores::sqlite::SQLiteUserStore>))
            .route("/protected", get(hello))
            .with_state(state);

        TestServer::new(app)
    }

    #[tokio::test]
    async fn log_in_succeeds_with_valid_credentials() {
        let mut state = get_test_app_state();
        create_test_user(&mut state, "alice", "averysafeandsecurepassword");
        let server = get_test_server(state);

        let response = server
            .post("/login")
            .json(&json!({
                "username": "alice",
                "password": "averysafeandsecurepassword",
            }))
            .await;

        response.assert_status_ok();

        let pair = response.json::<TokenPair>();
        assert!(!pair.access.is_empty());
        assert!(!pair.refresh.is_empty());
    }

    #[tokio::test]
    async fn log_in_fails_with_wrong_password() {
        let mut state = get_test_app_state();
        create_test_user(&mut state, "alice", "averysafeandsecurepassword");
        let server = get_test_server(state);

        server
            .post("/login")
            .json(&json!({
                "username": "alice",
                "password": "definitelyNotTheCorrectPassword",
            }))
            .await
            .assert_status(StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn log_in_fails_with_unknown_username() {
        let server = get_test_server(get_test_app_state());

        server
            .post("/login")
            .json(&json!({
                "username": "nobody",
                "password": "whatever",
            }))
            .await
            .assert_status(StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn get_protected_route_with_valid_access_token() {
        let mut state = get_test_app_state();
        create_test_user(&mut state, "alice", "averysafeandsecurepassword");
        let server = get_test_server(state);

        let pair = server
            .post("/login")
            .json(&json!({
                "username": "alice",
                "password": "averysafeandsecurepassword",
            }))
            .await
            .json::<TokenPair>();

        server
            .get("/protected")
            .authorization_bearer(pair.access)
            .await
            .assert_status_ok();
    }

    #[tokio::test]
    async fn get_protected_route_with_refresh_token_fails() {
        let mut state = get_test_app_state();
        create_test_user(&mut state, "alice", "averysafeandsecurepassword");
        let server = get_test_server(state);

        let pair = server
            .post("/login")
            .json(&json!({
                "username": "alice",
                "password": "averysafeandsecurepassword",
            }))
            .await
            .json::<TokenPair>();

        server
            .get("/protected")
            .authorization_bearer(pair.refresh)
            .await
            .assert_status(StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn get_protected_route_with_missing_header_fails() {
        let server = get_test_server(get_test_app_state());

        server
            .get("/protected")
            .await
            .assert_status(StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn get_protected_route_with_garbage_token_fails() {
        let server = get_test_server(get_test_app_state());

        server
            .get("/protected")
            .authorization_bearer("notavalidjwt")
            .await
            .assert_status(StatusCode::UNAUTHORIZED);
    }
}
