use anyhow::Result;
use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection, Statement};
use std::path::Path;
use std::time::Duration;
use tracing::info;

pub mod migrator;
pub mod repositories;

pub use repositories::alert::Alert;
pub use repositories::contact::{Contact, NewContact};
pub use repositories::pipeline::{MaintenanceItem, NewMaintenance, NewSection, Section};
pub use repositories::regulator::{Regulator, RegulatorChanges};
pub use repositories::sensor::{NewSensor, Reading, ReadingValues, Sensor};
pub use repositories::user::{NewUser, Profile, ProfileChanges, User};

/// Message of the unique index violation behind `err`, if that is what it is.
#[must_use]
pub fn unique_violation(err: &anyhow::Error) -> Option<String> {
    match err.downcast_ref::<sea_orm::DbErr>()?.sql_err()? {
        sea_orm::SqlErr::UniqueConstraintViolation(message) => Some(message),
        _ => None,
    }
}

#[derive(Clone)]
pub struct Store {
    pub conn: DatabaseConnection,
}

impl Store {
    pub async fn new(db_url: &str) -> Result<Self> {
        Self::with_pool_options(db_url, 5, 1).await
    }

    pub async fn with_pool_options(
        db_url: &str,
        max_connections: u32,
        min_connections: u32,
    ) -> Result<Self> {
        use sea_orm_migration::MigratorTrait;

        let in_memory = db_url.contains(":memory:");

        let mut opt = ConnectOptions::new(db_url.to_string());
        opt.connect_timeout(Duration::from_secs(10))
            .acquire_timeout(Duration::from_secs(10))
            .sqlx_logging(false);

        if in_memory {
            // Every pooled connection would otherwise see its own empty database.
            opt.max_connections(1).min_connections(1);
        } else {
            let path_str = db_url
                .trim_start_matches("sqlite://")
                .trim_start_matches("sqlite:");
            let path_str = path_str.split('?').next().unwrap_or(path_str);
            if let Some(parent) = Path::new(path_str).parent() {
                tokio::fs::create_dir_all(parent).await.ok();
            }
            if !Path::new(path_str).exists() {
                std::fs::File::create(path_str)?;
            }

            opt.max_connections(max_connections)
                .min_connections(min_connections)
                .idle_timeout(Duration::from_secs(300))
                .max_lifetime(Duration::from_secs(600));
        }

        let conn = Database::connect(opt).await?;

        migrator::Migrator::up(&conn, None).await?;

        info!(
            in_memory,
            "Database connected & migrations applied (pool: {}-{})",
            min_connections,
            max_connections
        );

        Ok(Self { conn })
    }

    pub async fn ping(&self) -> Result<()> {
        let backend = self.conn.get_database_backend();
        self.conn
            .query_one(Statement::from_string(backend, "SELECT 1".to_string()))
            .await?;
        Ok(())
    }

    #[must_use]
    pub fn user_repo(&self) -> repositories::user::UserRepository {
        repositories::user::UserRepository::new(self.conn.clone())
    }

    #[must_use]
    pub fn sensor_repo(&self) -> repositories::sensor::SensorRepository {
        repositories::sensor::SensorRepository::new(self.conn.clone())
    }

    #[must_use]
    pub fn alert_repo(&self) -> repositories::alert::AlertRepository {
        repositories::alert::AlertRepository::new(self.conn.clone())
    }

    #[must_use]
    pub fn pipeline_repo(&self) -> repositories::pipeline::PipelineRepository {
        repositories::pipeline::PipelineRepository::new(self.conn.clone())
    }

    #[must_use]
    pub fn regulator_repo(&self) -> repositories::regulator::RegulatorRepository {
        repositories::regulator::RegulatorRepository::new(self.conn.clone())
    }

    #[must_use]
    pub fn contact_repo(&self) -> repositories::contact::ContactRepository {
        repositories::contact::ContactRepository::new(self.conn.clone())
    }

    // ========== Delegates used across services ==========

    pub async fn get_user(&self, id: i32) -> Result<Option<User>> {
        self.user_repo().get_by_id(id).await
    }

    pub async fn get_or_create_profile(&self, user_id: i32) -> Result<Profile> {
        self.user_repo().get_or_create_profile(user_id).await
    }

    pub async fn get_or_create_regulator(&self, user_id: i32) -> Result<Regulator> {
        self.regulator_repo().get_or_create(user_id).await
    }

    pub async fn count_active_contacts(&self, user_id: i32) -> Result<u64> {
        self.contact_repo().count_active(user_id).await
    }
}
