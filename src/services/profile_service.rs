//! Domain service for the account profile shown in the app's settings.

use serde::Serialize;
use thiserror::Error;

use crate::db::{Profile, ProfileChanges, User};
use crate::domain::FieldErrors;

#[derive(Debug, Error)]
pub enum ProfileError {
    #[error("No image data provided")]
    NoImageData,

    #[error("Invalid image data")]
    InvalidImageData,

    #[error("Validation failed: {0}")]
    Validation(FieldErrors),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<sea_orm::DbErr> for ProfileError {
    fn from(err: sea_orm::DbErr) -> Self {
        Self::Database(err.to_string())
    }
}

impl From<anyhow::Error> for ProfileError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err.to_string())
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ProfileDto {
    pub username: String,
    pub email: String,
    pub phone_number: Option<String>,
    pub profile_image: Option<String>,
    pub device_unique_code: String,
    pub notification_preferences: serde_json::Value,
}

impl ProfileDto {
    #[must_use]
    pub fn new(user: User, profile: Profile) -> Self {
        Self {
            username: user.username,
            email: user.email,
            phone_number: profile.phone_number,
            profile_image: profile.profile_image,
            device_unique_code: profile.device_unique_code,
            notification_preferences: profile.notification_preferences,
        }
    }
}

#[async_trait::async_trait]
pub trait ProfileService: Send + Sync {
    /// Profile of the user, created with a generated device code if missing.
    async fn profile(&self, user_id: i32) -> Result<ProfileDto, ProfileError>;

    /// Applies a partial update after checking username/email uniqueness.
    async fn update_profile(
        &self,
        user_id: i32,
        changes: ProfileChanges,
    ) -> Result<ProfileDto, ProfileError>;

    /// Decodes a base64 image, stores it under the media directory and
    /// returns its public URL.
    async fn upload_image(
        &self,
        user_id: i32,
        image_data: Option<&str>,
    ) -> Result<String, ProfileError>;
}
