use axum::{
    Extension, Json,
    extract::State,
    http::StatusCode,
};
use chrono::{DateTime, Utc};
use serde_json::Value;
use std::sync::Arc;

use super::validation::{self, FormValidator, TITLE_MAX_LEN};
use super::{ApiError, ApiResponse, AppJson, AppPath, AppState};
use crate::db::{NewMaintenance, User};
use crate::entities::maintenance_schedules::Priority;
use crate::services::PipelineError;
use crate::services::pipeline_service::{MaintenanceDto, PipelineHealth};

impl From<PipelineError> for ApiError {
    fn from(err: PipelineError) -> Self {
        match err {
            PipelineError::MaintenanceNotFound => ApiError::not_found("Maintenance item"),
            PipelineError::Database(msg) => ApiError::DatabaseError(msg),
            PipelineError::Internal(msg) => ApiError::internal(msg),
        }
    }
}

/// GET /pipeline/health/
pub async fn get_health(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<User>,
) -> Result<Json<ApiResponse<PipelineHealth>>, ApiError> {
    let health = state.pipeline_service().health(user.id).await?;
    Ok(Json(ApiResponse::success(health)))
}

/// POST /pipeline/maintenance/
pub async fn create_maintenance(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<User>,
    AppJson(body): AppJson<Value>,
) -> Result<(StatusCode, Json<ApiResponse<MaintenanceDto>>), ApiError> {
    let item = parse_maintenance(&body)?;

    let created = state
        .pipeline_service()
        .schedule_maintenance(user.id, item)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::with_message(
            "Maintenance scheduled successfully",
            created,
        )),
    ))
}

/// POST /pipeline/maintenance/{id}/complete/
pub async fn complete_maintenance(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<User>,
    AppPath(id): AppPath<i32>,
) -> Result<Json<ApiResponse<MaintenanceDto>>, ApiError> {
    let item = state
        .pipeline_service()
        .complete_maintenance(user.id, id)
        .await?;

    Ok(Json(ApiResponse::with_message(
        "Maintenance marked as completed",
        item,
    )))
}

fn parse_maintenance(body: &Value) -> Result<NewMaintenance, ApiError> {
    let mut form = FormValidator::new(body)?;

    let title = form.required_str("title", TITLE_MAX_LEN);
    let description = form
        .nullable_str("description", usize::MAX)
        .flatten()
        .unwrap_or_default();

    let scheduled_date = form
        .required_str("scheduled_date", usize::MAX)
        .and_then(|raw| match DateTime::parse_from_rfc3339(&raw) {
            Ok(date) => Some(date.with_timezone(&Utc)),
            Err(_) => {
                form.error("scheduled_date", validation::INVALID_DATETIME);
                None
            }
        });

    let priority = match form.optional_str("priority", usize::MAX) {
        None => Some(Priority::Medium),
        Some(raw) => {
            let parsed = Priority::parse(&raw.to_ascii_uppercase());
            if parsed.is_none() {
                form.error("priority", format!("\"{raw}\" is not a valid choice."));
            }
            parsed
        }
    };

    form.finish()?;

    match (title, scheduled_date, priority) {
        (Some(title), Some(scheduled_date), Some(priority)) => Ok(NewMaintenance {
            title,
            description,
            scheduled_date,
            priority,
        }),
        _ => Err(ApiError::internal("Validated maintenance fields missing")),
    }
}
