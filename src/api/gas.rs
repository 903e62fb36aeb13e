use axum::{Extension, Json, extract::State};
use std::sync::Arc;

use super::{ApiError, ApiResponse, AppState};
use crate::db::User;
use crate::services::monitoring_service::{GasLevelData, LeakStatus, ScanResult};

/// GET /gas-leak/status/
pub async fn leak_status(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<User>,
) -> Result<Json<ApiResponse<LeakStatus>>, ApiError> {
    let status = state.monitoring_service().leak_status(user.id).await?;
    Ok(Json(ApiResponse::success(status)))
}

/// POST /gas-leak/scan/
pub async fn trigger_scan(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<User>,
) -> Result<Json<ApiResponse<ScanResult>>, ApiError> {
    let scan = state.monitoring_service().trigger_scan(user.id).await?;
    Ok(Json(ApiResponse::with_message(
        "Gas leak scan completed",
        scan,
    )))
}

/// GET /gas-level/data/
pub async fn level_data(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<User>,
) -> Result<Json<ApiResponse<GasLevelData>>, ApiError> {
    let data = state.monitoring_service().gas_level(user.id).await?;
    Ok(Json(ApiResponse::success(data)))
}
