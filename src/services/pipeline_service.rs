//! Domain service for pipeline health and the maintenance schedule.

use serde::Serialize;
use thiserror::Error;

use crate::db::{MaintenanceItem, NewMaintenance, Section};
use crate::entities::maintenance_schedules::Priority;
use crate::entities::pipeline_sections::SectionStatus;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Maintenance item not found")]
    MaintenanceNotFound,

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<sea_orm::DbErr> for PipelineError {
    fn from(err: sea_orm::DbErr) -> Self {
        Self::Database(err.to_string())
    }
}

impl From<anyhow::Error> for PipelineError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err.to_string())
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SectionDto {
    pub id: i32,
    pub user: i32,
    pub section_name: String,
    pub health_percentage: f64,
    pub last_inspection: Option<String>,
    pub next_inspection: Option<String>,
    pub status: SectionStatus,
}

impl From<Section> for SectionDto {
    fn from(s: Section) -> Self {
        Self {
            id: s.id,
            user: s.user_id,
            section_name: s.section_name,
            health_percentage: s.health_percentage,
            last_inspection: s.last_inspection.map(|t| t.to_rfc3339()),
            next_inspection: s.next_inspection.map(|t| t.to_rfc3339()),
            status: s.status,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct MaintenanceDto {
    pub id: i32,
    pub user: i32,
    pub title: String,
    pub description: String,
    pub scheduled_date: String,
    pub priority: Priority,
    pub is_completed: bool,
}

impl From<MaintenanceItem> for MaintenanceDto {
    fn from(m: MaintenanceItem) -> Self {
        Self {
            id: m.id,
            user: m.user_id,
            title: m.title,
            description: m.description,
            scheduled_date: m.scheduled_date.to_rfc3339(),
            priority: m.priority,
            is_completed: m.is_completed,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PipelineHealth {
    pub overall_health: f64,
    pub sections: Vec<SectionDto>,
    pub maintenance_schedule: Vec<MaintenanceDto>,
}

/// Mean of the section health percentages, 0 when there are none.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn overall_health(sections: &[Section]) -> f64 {
    if sections.is_empty() {
        return 0.0;
    }
    sections.iter().map(|s| s.health_percentage).sum::<f64>() / sections.len() as f64
}

#[async_trait::async_trait]
pub trait PipelineService: Send + Sync {
    /// Seeds the default sections on first use, then reports overall health,
    /// every section and the next upcoming maintenance items.
    async fn health(&self, user_id: i32) -> Result<PipelineHealth, PipelineError>;

    async fn schedule_maintenance(
        &self,
        user_id: i32,
        item: NewMaintenance,
    ) -> Result<MaintenanceDto, PipelineError>;

    async fn complete_maintenance(
        &self,
        user_id: i32,
        id: i32,
    ) -> Result<MaintenanceDto, PipelineError>;
}
