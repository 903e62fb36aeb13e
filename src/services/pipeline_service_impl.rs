//! `SeaORM` implementation of the `PipelineService` trait.

use async_trait::async_trait;
use chrono::{Duration, Utc};
use std::sync::Arc;

use crate::constants::{defaults, limits};
use crate::db::{NewMaintenance, NewSection, Store};
use crate::entities::pipeline_sections::SectionStatus;
use crate::services::pipeline_service::{
    MaintenanceDto, PipelineError, PipelineHealth, PipelineService, SectionDto, overall_health,
};
use crate::services::telemetry::TelemetrySource;

pub struct SeaOrmPipelineService {
    store: Store,
    telemetry: Arc<dyn TelemetrySource>,
}

impl SeaOrmPipelineService {
    #[must_use]
    pub fn new(store: Store, telemetry: Arc<dyn TelemetrySource>) -> Self {
        Self { store, telemetry }
    }

    fn default_sections(&self) -> Vec<NewSection> {
        let now = Utc::now();
        defaults::PIPELINE_SECTIONS
            .iter()
            .map(|&(name, health)| NewSection {
                section_name: name.to_string(),
                health_percentage: health,
                status: SectionStatus::from_health(health),
                last_inspection: Some(
                    now - Duration::hours(self.telemetry.integer(defaults::INSPECTION_AGE_HOURS)),
                ),
            })
            .collect()
    }
}

#[async_trait]
impl PipelineService for SeaOrmPipelineService {
    async fn health(&self, user_id: i32) -> Result<PipelineHealth, PipelineError> {
        let repo = self.store.pipeline_repo();

        let mut sections = repo.sections(user_id).await?;
        if sections.is_empty() {
            repo.seed_sections_if_empty(user_id, self.default_sections())
                .await?;
            sections = repo.sections(user_id).await?;
        }

        let maintenance = repo
            .upcoming_maintenance(user_id, Utc::now(), limits::UPCOMING_MAINTENANCE)
            .await?;

        Ok(PipelineHealth {
            overall_health: overall_health(&sections),
            sections: sections.into_iter().map(SectionDto::from).collect(),
            maintenance_schedule: maintenance.into_iter().map(MaintenanceDto::from).collect(),
        })
    }

    async fn schedule_maintenance(
        &self,
        user_id: i32,
        item: NewMaintenance,
    ) -> Result<MaintenanceDto, PipelineError> {
        let created = self
            .store
            .pipeline_repo()
            .create_maintenance(user_id, item)
            .await?;
        Ok(MaintenanceDto::from(created))
    }

    async fn complete_maintenance(
        &self,
        user_id: i32,
        id: i32,
    ) -> Result<MaintenanceDto, PipelineError> {
        let item = self
            .store
            .pipeline_repo()
            .complete_maintenance(user_id, id)
            .await?
            .ok_or(PipelineError::MaintenanceNotFound)?;
        Ok(MaintenanceDto::from(item))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::telemetry::FixedTelemetry;

    #[test]
    fn test_default_sections_table() {
        let store_less = SeaOrmPipelineService {
            store: Store {
                conn: sea_orm::DatabaseConnection::Disconnected,
            },
            telemetry: Arc::new(FixedTelemetry::new(0.0, false)),
        };

        let sections = store_less.default_sections();
        let names: Vec<_> = sections.iter().map(|s| s.section_name.as_str()).collect();
        assert_eq!(names, ["Main Line", "Kitchen", "Water Heater", "Outdoor"]);

        let statuses: Vec<_> = sections.iter().map(|s| s.status).collect();
        assert_eq!(
            statuses,
            [
                SectionStatus::Excellent,
                SectionStatus::Good,
                SectionStatus::Fair,
                SectionStatus::Excellent
            ]
        );

        let age = Utc::now() - sections[0].last_inspection.unwrap();
        assert!(age >= Duration::minutes(59) && age <= Duration::minutes(61));
    }
}
