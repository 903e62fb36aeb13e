use axum::{
    Json,
    extract::{Request, State},
    http::{HeaderMap, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;

use super::validation::{
    self, DEVICE_CODE_MAX_LEN, FormValidator, PASSWORD_MIN_LEN, USERNAME_MAX_LEN,
};
use super::{ApiError, AppJson, AppState};
use crate::domain::FieldErrors;
use crate::services::{AuthError, Registration};

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::DuplicateEmail => ApiError::ValidationError {
                message: "Registration failed".to_string(),
                errors: FieldErrors::single("email", AuthError::DuplicateEmail.to_string()),
            },
            AuthError::InvalidCredentials => ApiError::ValidationError {
                message: "Login failed".to_string(),
                errors: FieldErrors::single(
                    FieldErrors::NON_FIELD,
                    AuthError::InvalidCredentials.to_string(),
                ),
            },
            AuthError::Validation(errors) => ApiError::validation(errors),
            AuthError::Unauthorized(msg) => ApiError::Unauthorized(msg),
            AuthError::Database(msg) => ApiError::DatabaseError(msg),
            AuthError::Internal(msg) => ApiError::internal(msg),
        }
    }
}

// ============================================================================
// Response Types
// ============================================================================

#[derive(Serialize)]
pub struct RegisterResponse {
    pub success: u8,
    pub message: String,
    pub email: String,
}

#[derive(Serialize)]
pub struct LoginResponse {
    pub success: u8,
    pub message: String,
    pub email: String,
    pub device_unique_code: Option<String>,
    pub refresh: String,
    pub access: String,
}

#[derive(Serialize)]
pub struct RefreshResponse {
    pub success: u8,
    pub access: String,
}

// ============================================================================
// Middleware
// ============================================================================

/// Resolves `Authorization: Bearer <access token>` to an active user and
/// stores it as a request extension.
pub async fn auth_middleware(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    mut request: Request,
    next: Next,
) -> Response {
    let Some(token) = extract_bearer(&headers) else {
        return ApiError::unauthorized().into_response();
    };

    match state.auth_service().authenticate(&token).await {
        Ok(user) => {
            tracing::Span::current().record("user_id", user.id);
            request.extensions_mut().insert(user);
            next.run(request).await
        }
        Err(AuthError::Unauthorized(reason)) => {
            tracing::debug!(%reason, "Rejected bearer token");
            ApiError::unauthorized().into_response()
        }
        Err(err) => ApiError::from(err).into_response(),
    }
}

fn extract_bearer(headers: &HeaderMap) -> Option<String> {
    if let Some(auth_header) = headers.get("Authorization")
        && let Ok(auth_str) = auth_header.to_str()
        && let Some(token) = auth_str.strip_prefix("Bearer ")
    {
        let token = token.trim();
        if !token.is_empty() {
            return Some(token.to_string());
        }
    }

    None
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /auth/register/
pub async fn register(
    State(state): State<Arc<AppState>>,
    AppJson(body): AppJson<Value>,
) -> Result<impl IntoResponse, ApiError> {
    let registration = match parse_registration(&body)? {
        ParsedRegistration::Valid(registration) => registration,
        ParsedRegistration::Invalid { mut errors, email } => {
            // A taken email is reported alongside the other field errors.
            if let Some(email) = email
                && state.auth_service().email_taken(&email).await?
            {
                errors.merge(FieldErrors::single(
                    "email",
                    AuthError::DuplicateEmail.to_string(),
                ));
            }
            return Err(ApiError::validation(errors).with_message("Registration failed"));
        }
    };

    let user = state
        .auth_service()
        .register(registration)
        .await
        .map_err(|e| ApiError::from(e).with_message("Registration failed"))?;

    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            success: 1,
            message: "User registered successfully!".to_string(),
            email: user.email,
        }),
    ))
}

/// POST /auth/login/
pub async fn login(
    State(state): State<Arc<AppState>>,
    AppJson(body): AppJson<Value>,
) -> Result<Json<LoginResponse>, ApiError> {
    let mut form = FormValidator::new(&body)?;
    let email = form.required_str("email", usize::MAX);
    let password = form.required_str("password", usize::MAX);
    if let Some(email) = &email
        && !validation::is_valid_email(email)
    {
        form.error("email", validation::INVALID_EMAIL);
    }
    form.finish().map_err(|e| e.with_message("Login failed"))?;

    let (Some(email), Some(password)) = (email, password) else {
        return Err(ApiError::internal("Validated login fields missing"));
    };

    let result = state.auth_service().login(&email, &password).await?;

    Ok(Json(LoginResponse {
        success: 1,
        message: "Login successful!".to_string(),
        email: result.email,
        device_unique_code: result.device_unique_code,
        refresh: result.tokens.refresh,
        access: result.tokens.access,
    }))
}

/// POST /auth/token/refresh/
pub async fn refresh(
    State(state): State<Arc<AppState>>,
    AppJson(body): AppJson<Value>,
) -> Result<Json<RefreshResponse>, ApiError> {
    let mut form = FormValidator::new(&body)?;
    let refresh = form.required_str("refresh", usize::MAX);
    form.finish()?;

    let Some(refresh) = refresh else {
        return Err(ApiError::internal("Validated refresh field missing"));
    };

    let access = state.auth_service().refresh(&refresh).await?;

    Ok(Json(RefreshResponse { success: 1, access }))
}

enum ParsedRegistration {
    Valid(Registration),
    /// `email` is set when the submitted email itself was well-formed.
    Invalid {
        errors: FieldErrors,
        email: Option<String>,
    },
}

fn parse_registration(body: &Value) -> Result<ParsedRegistration, ApiError> {
    let mut form = FormValidator::new(body)?;

    let username = form.required_str("username", USERNAME_MAX_LEN);
    let email = form.required_str("email", usize::MAX);
    let password = form.required_str("password", usize::MAX);
    let device_unique_code = form.required_str("device_unique_code", DEVICE_CODE_MAX_LEN);

    if let Some(username) = &username
        && !validation::is_valid_username(username)
    {
        form.error("username", validation::INVALID_USERNAME);
    }
    let email = match email {
        Some(email) if !validation::is_valid_email(&email) => {
            form.error("email", validation::INVALID_EMAIL);
            None
        }
        other => other,
    };
    if let Some(password) = &password
        && password.chars().count() < PASSWORD_MIN_LEN
    {
        form.error(
            "password",
            format!("This password is too short. It must contain at least {PASSWORD_MIN_LEN} characters."),
        );
    }

    let errors = form.into_errors();

    match (username, email, password, device_unique_code) {
        (Some(username), Some(email), Some(password), Some(device_unique_code))
            if errors.is_empty() =>
        {
            Ok(ParsedRegistration::Valid(Registration {
                username,
                email,
                password,
                device_unique_code,
            }))
        }
        (_, email, _, _) => Ok(ParsedRegistration::Invalid { errors, email }),
    }
}
