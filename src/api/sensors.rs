use axum::{
    Extension, Json,
    extract::State,
    http::StatusCode,
};
use serde::Deserialize;
use serde_json::Value;
use std::sync::Arc;

use super::validation::{self, FormValidator, NAME_MAX_LEN, SENSOR_ID_MAX_LEN};
use super::{ApiError, ApiResponse, AppJson, AppPath, AppQuery, AppState};
use crate::constants::limits;
use crate::db::User;
use crate::entities::gas_sensors::SensorType;
use crate::services::monitoring_service::{ReadingDto, SensorDto};
use crate::services::{MonitoringError, SensorInput};

impl From<MonitoringError> for ApiError {
    fn from(err: MonitoringError) -> Self {
        match err {
            MonitoringError::SensorNotFound => ApiError::not_found("Sensor"),
            MonitoringError::AlertNotFound => ApiError::not_found("Alert"),
            MonitoringError::Validation(errors) => ApiError::validation(errors),
            MonitoringError::Database(msg) => ApiError::DatabaseError(msg),
            MonitoringError::Internal(msg) => ApiError::internal(msg),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ReadingsQuery {
    pub limit: Option<String>,
}

/// GET /sensors/
pub async fn list_sensors(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<User>,
) -> Result<Json<ApiResponse<Vec<SensorDto>>>, ApiError> {
    let sensors = state.monitoring_service().list_sensors(user.id).await?;
    Ok(Json(ApiResponse::success(sensors)))
}

/// POST /sensors/
pub async fn create_sensor(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<User>,
    AppJson(body): AppJson<Value>,
) -> Result<(StatusCode, Json<ApiResponse<SensorDto>>), ApiError> {
    let mut form = FormValidator::new(&body)?;

    let sensor_id = form.required_str("sensor_id", SENSOR_ID_MAX_LEN);
    let sensor_name = form.required_str("sensor_name", NAME_MAX_LEN);
    let location = form.required_str("location", NAME_MAX_LEN);
    let sensor_type = form.required_str("sensor_type", usize::MAX).and_then(|raw| {
        let parsed = SensorType::parse(&raw);
        if parsed.is_none() {
            form.error("sensor_type", format!("\"{raw}\" is not a valid choice."));
        }
        parsed
    });

    form.finish()?;

    let (Some(sensor_id), Some(sensor_name), Some(location), Some(sensor_type)) =
        (sensor_id, sensor_name, location, sensor_type)
    else {
        return Err(ApiError::internal("Validated sensor fields missing"));
    };

    let sensor = state
        .monitoring_service()
        .register_sensor(
            user.id,
            SensorInput {
                sensor_id,
                sensor_name,
                location,
                sensor_type,
            },
        )
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::with_message("Sensor registered successfully", sensor)),
    ))
}

/// GET /sensors/{id}/readings/?limit=N
pub async fn sensor_readings(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<User>,
    AppPath(id): AppPath<i32>,
    AppQuery(params): AppQuery<ReadingsQuery>,
) -> Result<Json<ApiResponse<Vec<ReadingDto>>>, ApiError> {
    let limit = match params.limit.as_deref().map(str::trim) {
        None | Some("") => limits::DEFAULT_READINGS_LIMIT,
        Some(raw) => {
            let parsed = raw
                .parse::<u64>()
                .map_err(|_| ApiError::field("limit", "A valid integer is required."))?;
            validation::validate_limit(parsed)?
        }
    };

    let readings = state
        .monitoring_service()
        .sensor_readings(user.id, id, limit)
        .await?;

    Ok(Json(ApiResponse::success(readings)))
}
