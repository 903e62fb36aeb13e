use axum::{Extension, Json, extract::State};
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;

use super::validation::{
    self, FormValidator, IMAGE_URL_MAX_LEN, PHONE_MAX_LEN, USERNAME_MAX_LEN,
};
use super::{ApiError, ApiResponse, AppJson, AppState};
use crate::db::{ProfileChanges, User};
use crate::services::ProfileError;
use crate::services::profile_service::ProfileDto;

impl From<ProfileError> for ApiError {
    fn from(err: ProfileError) -> Self {
        match err {
            ProfileError::NoImageData => ApiError::BadRequest(ProfileError::NoImageData.to_string()),
            ProfileError::InvalidImageData => {
                ApiError::BadRequest(ProfileError::InvalidImageData.to_string())
            }
            ProfileError::Validation(errors) => ApiError::validation(errors),
            ProfileError::Database(msg) => ApiError::DatabaseError(msg),
            ProfileError::Internal(msg) => ApiError::internal(msg),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct UploadedImage {
    pub image_url: String,
}

/// GET /profile/
pub async fn get_profile(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<User>,
) -> Result<Json<ApiResponse<ProfileDto>>, ApiError> {
    let profile = state.profile_service().profile(user.id).await?;
    Ok(Json(ApiResponse::success(profile)))
}

/// PUT /profile/
pub async fn update_profile(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<User>,
    AppJson(body): AppJson<Value>,
) -> Result<Json<ApiResponse<ProfileDto>>, ApiError> {
    let changes = parse_changes(&body)?;

    let profile = state
        .profile_service()
        .update_profile(user.id, changes)
        .await?;

    Ok(Json(ApiResponse::with_message(
        "Profile updated successfully",
        profile,
    )))
}

/// POST /profile/upload-image/
pub async fn upload_image(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<User>,
    AppJson(body): AppJson<Value>,
) -> Result<Json<ApiResponse<UploadedImage>>, ApiError> {
    let image_data = body.get("image_data").and_then(Value::as_str);

    let image_url = state
        .profile_service()
        .upload_image(user.id, image_data)
        .await?;

    Ok(Json(ApiResponse::with_message(
        "Profile image uploaded successfully",
        UploadedImage { image_url },
    )))
}

fn parse_changes(body: &Value) -> Result<ProfileChanges, ApiError> {
    let mut form = FormValidator::new(body)?;

    let username = form.optional_str("username", USERNAME_MAX_LEN);
    if let Some(username) = &username
        && !validation::is_valid_username(username)
    {
        form.error("username", validation::INVALID_USERNAME);
    }

    let email = form.optional_str("email", usize::MAX);
    if let Some(email) = &email
        && !validation::is_valid_email(email)
    {
        form.error("email", validation::INVALID_EMAIL);
    }

    let changes = ProfileChanges {
        username,
        email,
        phone_number: form.nullable_str("phone_number", PHONE_MAX_LEN),
        profile_image: form.nullable_str("profile_image", IMAGE_URL_MAX_LEN),
        notification_preferences: form.optional_object("notification_preferences"),
    };

    form.finish().map_err(|e| e.with_message("Profile update failed"))?;
    Ok(changes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_phone_only_update_leaves_other_fields_untouched() {
        let changes = parse_changes(&json!({"phone_number": "+15551234567"})).unwrap();

        assert_eq!(changes.phone_number, Some(Some("+15551234567".to_string())));
        assert!(changes.username.is_none());
        assert!(changes.email.is_none());
        assert!(changes.profile_image.is_none());
        assert!(changes.notification_preferences.is_none());
    }

    #[test]
    fn test_invalid_profile_payload() {
        let err = parse_changes(&json!({
            "username": "has space",
            "email": "nope",
            "phone_number": "1234567890123456",
            "notification_preferences": "all"
        }))
        .unwrap_err();

        let ApiError::ValidationError { message, errors } = err else {
            panic!("expected validation error");
        };
        assert_eq!(message, "Profile update failed");
        assert!(errors.has("username"));
        assert!(errors.has("email"));
        assert!(errors.has("phone_number"));
        assert!(errors.has("notification_preferences"));
    }
}
