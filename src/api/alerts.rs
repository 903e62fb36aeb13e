use axum::{
    Extension, Json,
    extract::State,
};
use serde::Deserialize;
use std::sync::Arc;

use super::{ApiError, ApiResponse, AppPath, AppQuery, AppState};
use crate::db::User;
use crate::services::monitoring_service::AlertDto;

#[derive(Debug, Deserialize)]
pub struct AlertsQuery {
    pub unacknowledged: Option<String>,
}

fn truthy(value: Option<&str>) -> bool {
    matches!(
        value.map(|v| v.trim().to_ascii_lowercase()).as_deref(),
        Some("true" | "1" | "yes")
    )
}

/// GET /alerts/?unacknowledged=true
pub async fn list_alerts(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<User>,
    AppQuery(params): AppQuery<AlertsQuery>,
) -> Result<Json<ApiResponse<Vec<AlertDto>>>, ApiError> {
    let alerts = state
        .monitoring_service()
        .list_alerts(user.id, truthy(params.unacknowledged.as_deref()))
        .await?;

    Ok(Json(ApiResponse::success(alerts)))
}

/// POST /alerts/{id}/acknowledge/
pub async fn acknowledge_alert(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<User>,
    AppPath(id): AppPath<i32>,
) -> Result<Json<ApiResponse<AlertDto>>, ApiError> {
    let alert = state
        .monitoring_service()
        .acknowledge_alert(user.id, id)
        .await?;

    Ok(Json(ApiResponse::with_message("Alert acknowledged", alert)))
}
