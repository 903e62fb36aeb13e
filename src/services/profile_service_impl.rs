//! `SeaORM` implementation of the `ProfileService` trait.

use anyhow::Context;
use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use std::path::PathBuf;
use tokio::fs;
use tracing::info;

use crate::db::{ProfileChanges, Store};
use crate::domain::FieldErrors;
use crate::services::profile_service::{ProfileDto, ProfileError, ProfileService};

const IMAGE_DIR: &str = "profile_images";

pub struct SeaOrmProfileService {
    store: Store,
    media_path: PathBuf,
}

impl SeaOrmProfileService {
    #[must_use]
    pub fn new(store: Store, media_path: impl Into<PathBuf>) -> Self {
        Self {
            store,
            media_path: media_path.into(),
        }
    }
}

/// Strips an optional `data:image/...;base64,` prefix and decodes the rest.
pub fn decode_image(image_data: &str) -> Result<Vec<u8>, ProfileError> {
    let payload = image_data
        .split_once(',')
        .map_or(image_data, |(_, rest)| rest)
        .trim();

    STANDARD
        .decode(payload)
        .map_err(|_| ProfileError::InvalidImageData)
}

#[async_trait]
impl ProfileService for SeaOrmProfileService {
    async fn profile(&self, user_id: i32) -> Result<ProfileDto, ProfileError> {
        let user = self
            .store
            .get_user(user_id)
            .await?
            .ok_or_else(|| ProfileError::Internal(format!("User {user_id} not found")))?;
        let profile = self.store.get_or_create_profile(user_id).await?;

        Ok(ProfileDto::new(user, profile))
    }

    async fn update_profile(
        &self,
        user_id: i32,
        changes: ProfileChanges,
    ) -> Result<ProfileDto, ProfileError> {
        let users = self.store.user_repo();
        let mut errors = FieldErrors::new();

        if let Some(email) = &changes.email
            && users.email_taken(email, Some(user_id)).await?
        {
            errors.add("email", "A user with this email already exists.");
        }

        if let Some(username) = &changes.username
            && users.username_taken(username, Some(user_id)).await?
        {
            errors.add("username", "A user with that username already exists.");
        }

        errors.into_result().map_err(ProfileError::Validation)?;

        users.get_or_create_profile(user_id).await?;
        users.update_profile(user_id, changes).await?;

        info!(user_id, "Profile updated");
        self.profile(user_id).await
    }

    async fn upload_image(
        &self,
        user_id: i32,
        image_data: Option<&str>,
    ) -> Result<String, ProfileError> {
        let image_data = image_data
            .filter(|data| !data.trim().is_empty())
            .ok_or(ProfileError::NoImageData)?;

        let bytes = decode_image(image_data)?;

        let images_dir = self.media_path.join(IMAGE_DIR);
        if !images_dir.exists() {
            fs::create_dir_all(&images_dir)
                .await
                .with_context(|| format!("Failed to create {}", images_dir.display()))?;
        }

        let filename = format!("{user_id}_{}.jpg", uuid::Uuid::new_v4().simple());
        let file_path = images_dir.join(&filename);

        fs::write(&file_path, &bytes)
            .await
            .with_context(|| format!("Failed to write image to {}", file_path.display()))?;

        let url = format!("/media/{IMAGE_DIR}/{filename}");
        self.store.user_repo().set_profile_image(user_id, &url).await?;

        info!(user_id, path = %file_path.display(), size = bytes.len(), "Stored profile image");
        Ok(url)
    }
}
