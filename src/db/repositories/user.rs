use anyhow::{Context, Result};
use argon2::{
    Algorithm, Argon2, Params, Version,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
    TransactionTrait, sea_query::OnConflict,
};
use tokio::task;
use tracing::info;

use crate::config::SecurityConfig;
use crate::constants::defaults;
use crate::entities::{prelude::*, user_profiles, users};

/// User data returned from repository (without sensitive password hash)
#[derive(Debug, Clone)]
pub struct User {
    pub id: i32,
    pub username: String,
    pub email: String,
    pub is_active: bool,
    pub date_joined: String,
}

impl From<users::Model> for User {
    fn from(model: users::Model) -> Self {
        Self {
            id: model.id,
            username: model.username,
            email: model.email,
            is_active: model.is_active,
            date_joined: model.date_joined.to_rfc3339(),
        }
    }
}

pub type Profile = user_profiles::Model;

#[derive(Debug, Clone)]
pub struct NewUser<'a> {
    pub username: &'a str,
    pub email: &'a str,
    pub password: &'a str,
    pub device_unique_code: &'a str,
}

/// Fields of a profile update. `None` leaves the stored value untouched; the
/// inner `Option` of nullable columns allows clearing them.
#[derive(Debug, Clone, Default)]
pub struct ProfileChanges {
    pub username: Option<String>,
    pub email: Option<String>,
    pub phone_number: Option<Option<String>>,
    pub profile_image: Option<Option<String>>,
    pub notification_preferences: Option<serde_json::Value>,
}

pub struct UserRepository {
    conn: DatabaseConnection,
}

impl UserRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    /// Creates the user and its profile in one transaction.
    pub async fn create(&self, new_user: NewUser<'_>, security: &SecurityConfig) -> Result<User> {
        let password = new_user.password.to_string();
        let config = security.clone();
        let password_hash = task::spawn_blocking(move || hash_password(&password, Some(&config)))
            .await
            .context("Password hashing task panicked")??;

        let txn = self.conn.begin().await?;

        let user = users::ActiveModel {
            username: Set(new_user.username.to_string()),
            email: Set(new_user.email.to_string()),
            password_hash: Set(password_hash),
            is_active: Set(true),
            date_joined: Set(Utc::now()),
            last_login: Set(None),
            ..Default::default()
        }
        .insert(&txn)
        .await
        .context("Failed to insert user")?;

        user_profiles::ActiveModel {
            user_id: Set(user.id),
            device_unique_code: Set(new_user.device_unique_code.to_string()),
            phone_number: Set(None),
            profile_image: Set(None),
            notification_preferences: Set(serde_json::json!({})),
            ..Default::default()
        }
        .insert(&txn)
        .await
        .context("Failed to insert user profile")?;

        txn.commit().await?;

        info!(user_id = user.id, "Registered user {}", user.username);
        Ok(User::from(user))
    }

    pub async fn get_by_id(&self, id: i32) -> Result<Option<User>> {
        let user = Users::find_by_id(id)
            .one(&self.conn)
            .await
            .context("Failed to query user by ID")?;

        Ok(user.map(User::from))
    }

    /// First user registered with `email`, together with its password hash.
    pub async fn get_by_email_with_password(&self, email: &str) -> Result<Option<(User, String)>> {
        let user = Users::find()
            .filter(users::Column::Email.eq(email))
            .order_by_asc(users::Column::Id)
            .one(&self.conn)
            .await
            .context("Failed to query user by email")?;

        Ok(user.map(|u| {
            let password_hash = u.password_hash.clone();
            (User::from(u), password_hash)
        }))
    }

    pub async fn email_taken(&self, email: &str, except_user: Option<i32>) -> Result<bool> {
        let mut query = Users::find().filter(users::Column::Email.eq(email));
        if let Some(id) = except_user {
            query = query.filter(users::Column::Id.ne(id));
        }
        Ok(query.one(&self.conn).await?.is_some())
    }

    pub async fn username_taken(&self, username: &str, except_user: Option<i32>) -> Result<bool> {
        let mut query = Users::find().filter(users::Column::Username.eq(username));
        if let Some(id) = except_user {
            query = query.filter(users::Column::Id.ne(id));
        }
        Ok(query.one(&self.conn).await?.is_some())
    }

    pub async fn record_login(&self, user_id: i32) -> Result<()> {
        Users::update_many()
            .col_expr(
                users::Column::LastLogin,
                sea_orm::sea_query::Expr::value(Utc::now()),
            )
            .filter(users::Column::Id.eq(user_id))
            .exec(&self.conn)
            .await?;
        Ok(())
    }

    pub async fn set_active(&self, user_id: i32, active: bool) -> Result<bool> {
        let result = Users::update_many()
            .col_expr(
                users::Column::IsActive,
                sea_orm::sea_query::Expr::value(active),
            )
            .filter(users::Column::Id.eq(user_id))
            .exec(&self.conn)
            .await?;
        Ok(result.rows_affected > 0)
    }

    /// Note: This uses `spawn_blocking` because Argon2 hashing is CPU-intensive
    /// and would block the async runtime if run directly.
    pub async fn verify_password(&self, password_hash: String, password: &str) -> Result<bool> {
        let password = password.to_string();

        task::spawn_blocking(move || {
            let parsed_hash = PasswordHash::new(&password_hash)
                .map_err(|e| anyhow::anyhow!("Invalid password hash format: {e}"))?;

            Ok::<bool, anyhow::Error>(
                Argon2::default()
                    .verify_password(password.as_bytes(), &parsed_hash)
                    .is_ok(),
            )
        })
        .await
        .context("Password verification task panicked")?
    }

    pub async fn get_profile(&self, user_id: i32) -> Result<Option<Profile>> {
        UserProfiles::find()
            .filter(user_profiles::Column::UserId.eq(user_id))
            .one(&self.conn)
            .await
            .context("Failed to query user profile")
    }

    /// Returns the profile, inserting one with the default device code first
    /// if the user has none.
    pub async fn get_or_create_profile(&self, user_id: i32) -> Result<Profile> {
        if let Some(profile) = self.get_profile(user_id).await? {
            return Ok(profile);
        }

        let model = user_profiles::ActiveModel {
            user_id: Set(user_id),
            device_unique_code: Set(defaults::device_code(user_id)),
            phone_number: Set(None),
            profile_image: Set(None),
            notification_preferences: Set(serde_json::json!({})),
            ..Default::default()
        };

        UserProfiles::insert(model)
            .on_conflict(
                OnConflict::column(user_profiles::Column::UserId)
                    .do_nothing()
                    .to_owned(),
            )
            .exec_without_returning(&self.conn)
            .await?;

        info!(user_id, "Created default profile");

        self.get_profile(user_id)
            .await?
            .ok_or_else(|| anyhow::anyhow!("Profile for user {user_id} vanished after insert"))
    }

    /// Applies user and profile changes atomically.
    pub async fn update_profile(&self, user_id: i32, changes: ProfileChanges) -> Result<()> {
        let txn = self.conn.begin().await?;

        if changes.username.is_some() || changes.email.is_some() {
            let user = Users::find_by_id(user_id)
                .one(&txn)
                .await?
                .ok_or_else(|| anyhow::anyhow!("User not found: {user_id}"))?;

            let mut active: users::ActiveModel = user.into();
            if let Some(username) = changes.username {
                active.username = Set(username);
            }
            if let Some(email) = changes.email {
                active.email = Set(email);
            }
            active.update(&txn).await?;
        }

        let profile = UserProfiles::find()
            .filter(user_profiles::Column::UserId.eq(user_id))
            .one(&txn)
            .await?
            .ok_or_else(|| anyhow::anyhow!("Profile not found for user {user_id}"))?;

        let mut active: user_profiles::ActiveModel = profile.into();
        if let Some(phone) = changes.phone_number {
            active.phone_number = Set(phone);
        }
        if let Some(image) = changes.profile_image {
            active.profile_image = Set(image);
        }
        if let Some(prefs) = changes.notification_preferences {
            active.notification_preferences = Set(prefs);
        }
        active.update(&txn).await?;

        txn.commit().await?;
        Ok(())
    }

    pub async fn set_profile_image(&self, user_id: i32, url: &str) -> Result<()> {
        let profile = self.get_or_create_profile(user_id).await?;

        let mut active: user_profiles::ActiveModel = profile.into();
        active.profile_image = Set(Some(url.to_string()));
        active.update(&self.conn).await?;

        Ok(())
    }
}

/// Hash a password using Argon2id with optional custom params.
/// If config is None, uses the crate's default params.
pub fn hash_password(password: &str, config: Option<&SecurityConfig>) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);

    let argon2 = if let Some(cfg) = config {
        let params = Params::new(
            cfg.argon2_memory_cost_kib,
            cfg.argon2_time_cost,
            cfg.argon2_parallelism,
            None,
        )
        .map_err(|e| anyhow::anyhow!("Invalid Argon2 params: {e}"))?;
        Argon2::new(Algorithm::Argon2id, Version::V0x13, params)
    } else {
        Argon2::default()
    };

    let hash = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| anyhow::anyhow!("Failed to hash password: {e}"))?;

    Ok(hash.to_string())
}
