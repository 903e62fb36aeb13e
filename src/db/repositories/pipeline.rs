use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Set, TransactionTrait,
};
use tracing::info;

use crate::entities::maintenance_schedules::Priority;
use crate::entities::pipeline_sections::SectionStatus;
use crate::entities::{maintenance_schedules, pipeline_sections, prelude::*};

pub type Section = pipeline_sections::Model;
pub type MaintenanceItem = maintenance_schedules::Model;

#[derive(Debug, Clone)]
pub struct NewSection {
    pub section_name: String,
    pub health_percentage: f64,
    pub status: SectionStatus,
    pub last_inspection: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone)]
pub struct NewMaintenance {
    pub title: String,
    pub description: String,
    pub scheduled_date: DateTime<Utc>,
    pub priority: Priority,
}

/// Repository for pipeline sections and maintenance schedules
pub struct PipelineRepository {
    conn: DatabaseConnection,
}

impl PipelineRepository {
    pub fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn sections(&self, user_id: i32) -> Result<Vec<Section>> {
        PipelineSections::find()
            .filter(pipeline_sections::Column::UserId.eq(user_id))
            .order_by_asc(pipeline_sections::Column::Id)
            .all(&self.conn)
            .await
            .context("Failed to list pipeline sections")
    }

    /// Inserts `seed` only if the user has no sections yet. Returns whether
    /// anything was written.
    pub async fn seed_sections_if_empty(&self, user_id: i32, seed: Vec<NewSection>) -> Result<bool> {
        let txn = self.conn.begin().await?;

        let existing = PipelineSections::find()
            .filter(pipeline_sections::Column::UserId.eq(user_id))
            .count(&txn)
            .await?;

        if existing > 0 {
            txn.commit().await?;
            return Ok(false);
        }

        let count = seed.len();
        let models = seed.into_iter().map(|s| pipeline_sections::ActiveModel {
            user_id: Set(user_id),
            section_name: Set(s.section_name),
            health_percentage: Set(s.health_percentage),
            status: Set(s.status),
            last_inspection: Set(s.last_inspection),
            next_inspection: Set(None),
            ..Default::default()
        });

        PipelineSections::insert_many(models).exec(&txn).await?;
        txn.commit().await?;

        info!(user_id, count, "Seeded default pipeline sections");
        Ok(true)
    }

    /// Incomplete items scheduled at or after `from`, soonest first.
    pub async fn upcoming_maintenance(
        &self,
        user_id: i32,
        from: DateTime<Utc>,
        limit: u64,
    ) -> Result<Vec<MaintenanceItem>> {
        MaintenanceSchedules::find()
            .filter(maintenance_schedules::Column::UserId.eq(user_id))
            .filter(maintenance_schedules::Column::IsCompleted.eq(false))
            .filter(maintenance_schedules::Column::ScheduledDate.gte(from))
            .order_by_asc(maintenance_schedules::Column::ScheduledDate)
            .order_by_asc(maintenance_schedules::Column::Id)
            .limit(limit)
            .all(&self.conn)
            .await
            .context("Failed to list maintenance schedule")
    }

    pub async fn create_maintenance(
        &self,
        user_id: i32,
        item: NewMaintenance,
    ) -> Result<MaintenanceItem> {
        maintenance_schedules::ActiveModel {
            user_id: Set(user_id),
            title: Set(item.title),
            description: Set(item.description),
            scheduled_date: Set(item.scheduled_date),
            priority: Set(item.priority),
            is_completed: Set(false),
            ..Default::default()
        }
        .insert(&self.conn)
        .await
        .context("Failed to insert maintenance item")
    }

    pub async fn complete_maintenance(
        &self,
        user_id: i32,
        id: i32,
    ) -> Result<Option<MaintenanceItem>> {
        let Some(item) = MaintenanceSchedules::find_by_id(id)
            .filter(maintenance_schedules::Column::UserId.eq(user_id))
            .one(&self.conn)
            .await?
        else {
            return Ok(None);
        };

        let mut active: maintenance_schedules::ActiveModel = item.into();
        active.is_completed = Set(true);
        Ok(Some(active.update(&self.conn).await?))
    }
}
