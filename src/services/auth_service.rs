//! Domain service for registration, login and bearer token handling.

use serde::Serialize;
use thiserror::Error;

use crate::db::User;
use crate::domain::FieldErrors;
use crate::services::token::{TokenError, TokenPair};

/// Errors specific to authentication operations.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("A user with this email already exists.")]
    DuplicateEmail,

    /// Unknown email, wrong password and disabled account all map here.
    #[error("Invalid email or password.")]
    InvalidCredentials,

    #[error("Validation failed: {0}")]
    Validation(FieldErrors),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<sea_orm::DbErr> for AuthError {
    fn from(err: sea_orm::DbErr) -> Self {
        Self::Database(err.to_string())
    }
}

impl From<anyhow::Error> for AuthError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err.to_string())
    }
}

impl From<TokenError> for AuthError {
    fn from(err: TokenError) -> Self {
        match err {
            TokenError::Signing(msg) => Self::Internal(msg),
            other => Self::Unauthorized(other.to_string()),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Registration {
    pub username: String,
    pub email: String,
    pub password: String,
    pub device_unique_code: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct LoginResult {
    pub user_id: i32,
    pub email: String,
    pub device_unique_code: Option<String>,
    pub tokens: TokenPair,
}

/// Domain service trait for authentication.
#[async_trait::async_trait]
pub trait AuthService: Send + Sync {
    /// Creates the user together with its profile.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::DuplicateEmail`] if the email is already registered.
    async fn register(&self, registration: Registration) -> Result<User, AuthError>;

    /// Whether any account already uses `email`.
    async fn email_taken(&self, email: &str) -> Result<bool, AuthError>;

    /// Verifies credentials and issues an access/refresh token pair.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::InvalidCredentials`] if login fails for any reason.
    async fn login(&self, email: &str, password: &str) -> Result<LoginResult, AuthError>;

    /// Exchanges a refresh token for a new access token.
    async fn refresh(&self, refresh_token: &str) -> Result<String, AuthError>;

    /// Resolves an access token to an active user.
    async fn authenticate(&self, access_token: &str) -> Result<User, AuthError>;
}
