use axum::{
    Router,
    http::HeaderValue,
    middleware,
    routing::{delete, get, post},
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::config::Config;
use crate::services::TelemetrySource;
use crate::state::SharedState;

mod alerts;
pub mod auth;
mod dashboard;
mod emergency;
mod error;
mod gas;
mod observability;
mod pipeline;
mod profile;
mod regulator;
mod sensors;
mod types;
pub mod validation;

pub use error::{ApiError, AppJson, AppPath, AppQuery};
pub use types::*;

use metrics_exporter_prometheus::PrometheusHandle;

#[derive(Clone)]
pub struct AppState {
    pub shared: Arc<SharedState>,

    pub start_time: std::time::Instant,

    pub prometheus_handle: Option<PrometheusHandle>,
}

impl AppState {
    #[must_use]
    pub fn config(&self) -> &Config {
        &self.shared.config
    }

    #[must_use]
    pub fn store(&self) -> &crate::db::Store {
        &self.shared.store
    }

    #[must_use]
    pub fn auth_service(&self) -> &Arc<dyn crate::services::AuthService> {
        &self.shared.auth_service
    }

    #[must_use]
    pub fn monitoring_service(&self) -> &Arc<dyn crate::services::MonitoringService> {
        &self.shared.monitoring_service
    }

    #[must_use]
    pub fn pipeline_service(&self) -> &Arc<dyn crate::services::PipelineService> {
        &self.shared.pipeline_service
    }

    #[must_use]
    pub fn regulator_service(&self) -> &Arc<dyn crate::services::RegulatorService> {
        &self.shared.regulator_service
    }

    #[must_use]
    pub fn emergency_service(&self) -> &Arc<dyn crate::services::EmergencyService> {
        &self.shared.emergency_service
    }

    #[must_use]
    pub fn profile_service(&self) -> &Arc<dyn crate::services::ProfileService> {
        &self.shared.profile_service
    }
}

#[must_use]
pub fn create_app_state(
    shared: Arc<SharedState>,
    prometheus_handle: Option<PrometheusHandle>,
) -> Arc<AppState> {
    Arc::new(AppState {
        shared,
        start_time: std::time::Instant::now(),
        prometheus_handle,
    })
}

pub async fn create_app_state_from_config(
    config: Config,
    prometheus_handle: Option<PrometheusHandle>,
) -> anyhow::Result<Arc<AppState>> {
    let shared = Arc::new(SharedState::new(config).await?);
    Ok(create_app_state(shared, prometheus_handle))
}

/// Same as [`create_app_state_from_config`] but with an explicit telemetry
/// source, so readings and scan results are predictable.
pub async fn create_app_state_with_telemetry(
    config: Config,
    telemetry: Arc<dyn TelemetrySource>,
) -> anyhow::Result<Arc<AppState>> {
    let shared = Arc::new(SharedState::with_telemetry(config, telemetry).await?);
    Ok(create_app_state(shared, None))
}

pub fn router(state: Arc<AppState>) -> Router {
    let media_path = state.config().general.media_path.clone();
    let cors_origins = state.config().server.cors_allowed_origins.clone();

    let protected_routes = create_protected_router(state.clone());

    let api_router = Router::new()
        .merge(protected_routes)
        .route("/auth/register/", post(auth::register))
        .route("/auth/login/", post(auth::login))
        .route("/auth/token/refresh/", post(auth::refresh))
        .route("/health/", get(observability::health))
        .with_state(state);

    let cors_layer = if cors_origins.iter().any(|o| o == "*") {
        CorsLayer::new().allow_origin(Any)
    } else {
        let origins: Vec<HeaderValue> =
            cors_origins.iter().filter_map(|s| s.parse().ok()).collect();
        CorsLayer::new().allow_origin(origins)
    };

    api_router
        .nest_service("/media", ServeDir::new(media_path))
        .layer(cors_layer.allow_methods(Any).allow_headers(Any))
        .layer(middleware::from_fn(observability::security_headers_middleware))
        .layer(middleware::from_fn(observability::logging_middleware))
        .layer(TraceLayer::new_for_http())
}

fn create_protected_router(state: Arc<AppState>) -> Router<Arc<AppState>> {
    Router::new()
        .route("/dashboard/", get(dashboard::get_dashboard))
        .route("/gas-leak/status/", get(gas::leak_status))
        .route("/gas-leak/scan/", post(gas::trigger_scan))
        .route("/gas-level/data/", get(gas::level_data))
        .route(
            "/sensors/",
            get(sensors::list_sensors).post(sensors::create_sensor),
        )
        .route("/sensors/{id}/readings/", get(sensors::sensor_readings))
        .route("/alerts/", get(alerts::list_alerts))
        .route("/alerts/{id}/acknowledge/", post(alerts::acknowledge_alert))
        .route("/pipeline/health/", get(pipeline::get_health))
        .route("/pipeline/maintenance/", post(pipeline::create_maintenance))
        .route(
            "/pipeline/maintenance/{id}/complete/",
            post(pipeline::complete_maintenance),
        )
        .route(
            "/regulator/control/",
            get(regulator::get_state).post(regulator::control),
        )
        .route(
            "/emergency/contacts/",
            get(emergency::list_contacts).post(emergency::add_contact),
        )
        .route(
            "/emergency/contacts/{id}/delete/",
            delete(emergency::delete_contact),
        )
        .route("/emergency/sos/", post(emergency::trigger_sos))
        .route(
            "/profile/",
            get(profile::get_profile).put(profile::update_profile),
        )
        .route("/profile/upload-image/", post(profile::upload_image))
        .route("/metrics", get(observability::get_metrics))
        .route_layer(middleware::from_fn_with_state(state, auth::auth_middleware))
}
