use axum::{Extension, Json, extract::State};
use std::sync::Arc;

use super::{ApiError, ApiResponse, AppState};
use crate::db::User;
use crate::services::monitoring_service::Dashboard;

/// GET /dashboard/
pub async fn get_dashboard(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<User>,
) -> Result<Json<ApiResponse<Dashboard>>, ApiError> {
    let dashboard = state.monitoring_service().dashboard(&user).await?;
    Ok(Json(ApiResponse::success(dashboard)))
}
