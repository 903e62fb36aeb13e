//! `SeaORM` implementation of the `AuthService` trait.

use async_trait::async_trait;
use tracing::{info, warn};

use crate::config::SecurityConfig;
use crate::db::{self, NewUser, Store, User};
use crate::domain::FieldErrors;
use crate::services::auth_service::{AuthError, AuthService, LoginResult, Registration};
use crate::services::token::{TokenService, TokenType};

pub struct SeaOrmAuthService {
    store: Store,
    tokens: TokenService,
    security: SecurityConfig,
}

impl SeaOrmAuthService {
    #[must_use]
    pub const fn new(store: Store, tokens: TokenService, security: SecurityConfig) -> Self {
        Self {
            store,
            tokens,
            security,
        }
    }
}

fn username_taken() -> AuthError {
    AuthError::Validation(FieldErrors::single(
        "username",
        "A user with that username already exists.",
    ))
}

#[async_trait]
impl AuthService for SeaOrmAuthService {
    async fn register(&self, registration: Registration) -> Result<User, AuthError> {
        let users = self.store.user_repo();

        if users.email_taken(&registration.email, None).await? {
            return Err(AuthError::DuplicateEmail);
        }

        if users.username_taken(&registration.username, None).await? {
            return Err(username_taken());
        }

        let user = users
            .create(
                NewUser {
                    username: &registration.username,
                    email: &registration.email,
                    password: &registration.password,
                    device_unique_code: &registration.device_unique_code,
                },
                &self.security,
            )
            .await
            .map_err(|err| match db::unique_violation(&err) {
                Some(_) => username_taken(),
                None => AuthError::from(err),
            })?;

        metrics::counter!("auth_registrations_total").increment(1);
        Ok(user)
    }

    async fn email_taken(&self, email: &str) -> Result<bool, AuthError> {
        Ok(self.store.user_repo().email_taken(email, None).await?)
    }

    async fn login(&self, email: &str, password: &str) -> Result<LoginResult, AuthError> {
        let users = self.store.user_repo();

        let Some((user, password_hash)) = users.get_by_email_with_password(email).await? else {
            metrics::counter!("auth_logins_total", "outcome" => "failure").increment(1);
            return Err(AuthError::InvalidCredentials);
        };

        if !users.verify_password(password_hash, password).await? {
            metrics::counter!("auth_logins_total", "outcome" => "failure").increment(1);
            return Err(AuthError::InvalidCredentials);
        }

        if !user.is_active {
            warn!(user_id = user.id, "Login attempt for disabled account");
            metrics::counter!("auth_logins_total", "outcome" => "failure").increment(1);
            return Err(AuthError::InvalidCredentials);
        }

        let tokens = self.tokens.issue_pair(user.id)?;
        users.record_login(user.id).await?;

        let device_unique_code = users
            .get_profile(user.id)
            .await?
            .map(|p| p.device_unique_code);

        info!(user_id = user.id, "User logged in");
        metrics::counter!("auth_logins_total", "outcome" => "success").increment(1);

        Ok(LoginResult {
            user_id: user.id,
            email: user.email,
            device_unique_code,
            tokens,
        })
    }

    async fn refresh(&self, refresh_token: &str) -> Result<String, AuthError> {
        let claims = self.tokens.verify(refresh_token, TokenType::Refresh)?;

        let user = self
            .store
            .get_user(claims.sub)
            .await?
            .filter(|u| u.is_active)
            .ok_or_else(|| AuthError::Unauthorized("User not found or inactive".to_string()))?;

        Ok(self.tokens.issue(user.id, TokenType::Access)?)
    }

    async fn authenticate(&self, access_token: &str) -> Result<User, AuthError> {
        let claims = self.tokens.verify(access_token, TokenType::Access)?;

        self.store
            .get_user(claims.sub)
            .await?
            .filter(|u| u.is_active)
            .ok_or_else(|| AuthError::Unauthorized("User not found or inactive".to_string()))
    }
}
