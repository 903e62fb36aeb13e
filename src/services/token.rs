//! Bearer token issuing and verification.
//!
//! Tokens are HS256 JWTs. Access tokens authorize API calls; refresh tokens
//! can only be exchanged for a new access token. The `token_type` claim keeps
//! the two from being used interchangeably.

use chrono::Utc;
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::SecurityConfig;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TokenError {
    #[error("Token expired")]
    Expired,

    #[error("Invalid token")]
    Invalid,

    #[error("Wrong token type: expected {expected}")]
    WrongType { expected: &'static str },

    #[error("Failed to sign token: {0}")]
    Signing(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenType {
    Access,
    Refresh,
}

impl TokenType {
    const fn as_str(self) -> &'static str {
        match self {
            Self::Access => "access",
            Self::Refresh => "refresh",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    /// User id
    pub sub: i32,
    pub token_type: TokenType,
    pub iat: i64,
    pub exp: i64,
    pub jti: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct TokenPair {
    pub access: String,
    pub refresh: String,
}

#[derive(Clone)]
pub struct TokenService {
    secret: String,
    access_ttl_seconds: i64,
    refresh_ttl_seconds: i64,
}

impl TokenService {
    #[must_use]
    pub fn new(secret: impl Into<String>, access_ttl_seconds: i64, refresh_ttl_seconds: i64) -> Self {
        Self {
            secret: secret.into(),
            access_ttl_seconds,
            refresh_ttl_seconds,
        }
    }

    /// Builds the service from config. An empty secret is replaced by a random
    /// one, which invalidates all tokens on restart.
    #[must_use]
    pub fn from_config(security: &SecurityConfig) -> Self {
        let secret = if security.jwt_secret.is_empty() {
            tracing::warn!("No jwt_secret configured, using an ephemeral secret");
            generate_secret()
        } else {
            security.jwt_secret.clone()
        };

        Self::new(
            secret,
            ttl_seconds(security.access_token_ttl_minutes, 60),
            ttl_seconds(security.refresh_token_ttl_hours, 3600),
        )
    }

    pub fn issue_pair(&self, user_id: i32) -> Result<TokenPair, TokenError> {
        Ok(TokenPair {
            access: self.issue(user_id, TokenType::Access)?,
            refresh: self.issue(user_id, TokenType::Refresh)?,
        })
    }

    pub fn issue(&self, user_id: i32, token_type: TokenType) -> Result<String, TokenError> {
        let now = Utc::now().timestamp();
        let ttl = match token_type {
            TokenType::Access => self.access_ttl_seconds,
            TokenType::Refresh => self.refresh_ttl_seconds,
        };

        let claims = Claims {
            sub: user_id,
            token_type,
            iat: now,
            exp: now.saturating_add(ttl),
            jti: uuid::Uuid::new_v4().simple().to_string(),
        };

        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.secret.as_bytes()),
        )
        .map_err(|e| TokenError::Signing(e.to_string()))
    }

    /// Decodes `token` and checks that it is of `expected` type.
    pub fn verify(&self, token: &str, expected: TokenType) -> Result<Claims, TokenError> {
        let mut validation = Validation::default();
        validation.leeway = 0;

        let data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.secret.as_bytes()),
            &validation,
        )
        .map_err(|err| match err.kind() {
            jsonwebtoken::errors::ErrorKind::ExpiredSignature => TokenError::Expired,
            _ => TokenError::Invalid,
        })?;

        if data.claims.token_type != expected {
            return Err(TokenError::WrongType {
                expected: expected.as_str(),
            });
        }

        Ok(data.claims)
    }
}

fn ttl_seconds(amount: u64, unit: u64) -> i64 {
    i64::try_from(amount.saturating_mul(unit)).unwrap_or(i64::MAX)
}

/// 64 character hex secret
fn generate_secret() -> String {
    use rand::Rng;

    let mut rng = rand::rng();
    let bytes: [u8; 32] = rng.random();

    bytes.iter().fold(String::with_capacity(64), |mut acc, b| {
        use std::fmt::Write;
        let _ = write!(acc, "{b:02x}");
        acc
    })
}
