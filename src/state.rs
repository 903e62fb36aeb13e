use std::sync::Arc;

use crate::config::Config;
use crate::db::Store;
use crate::services::{
    AuthService, EmergencyService, MonitoringService, PipelineService, ProfileService,
    RandomTelemetry, RegulatorService, SeaOrmAuthService, SeaOrmEmergencyService,
    SeaOrmMonitoringService, SeaOrmPipelineService, SeaOrmProfileService, SeaOrmRegulatorService,
    TelemetrySource, TokenService,
};

/// Everything a request handler needs, built once at startup.
#[derive(Clone)]
pub struct SharedState {
    pub config: Arc<Config>,

    pub store: Store,

    pub auth_service: Arc<dyn AuthService>,

    pub monitoring_service: Arc<dyn MonitoringService>,

    pub pipeline_service: Arc<dyn PipelineService>,

    pub regulator_service: Arc<dyn RegulatorService>,

    pub emergency_service: Arc<dyn EmergencyService>,

    pub profile_service: Arc<dyn ProfileService>,
}

impl SharedState {
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        Self::with_telemetry(config, Arc::new(RandomTelemetry)).await
    }

    /// Builds the state with a specific telemetry source, e.g. a fixed one in tests.
    pub async fn with_telemetry(
        config: Config,
        telemetry: Arc<dyn TelemetrySource>,
    ) -> anyhow::Result<Self> {
        let store = Store::with_pool_options(
            &config.general.database_path,
            config.general.max_db_connections,
            config.general.min_db_connections,
        )
        .await?;

        let tokens = TokenService::from_config(&config.security);

        let auth_service = Arc::new(SeaOrmAuthService::new(
            store.clone(),
            tokens,
            config.security.clone(),
        )) as Arc<dyn AuthService>;

        let monitoring_service = Arc::new(SeaOrmMonitoringService::new(
            store.clone(),
            telemetry.clone(),
            config.telemetry.freshness_window_seconds,
        )) as Arc<dyn MonitoringService>;

        let pipeline_service = Arc::new(SeaOrmPipelineService::new(
            store.clone(),
            telemetry.clone(),
        )) as Arc<dyn PipelineService>;

        let regulator_service =
            Arc::new(SeaOrmRegulatorService::new(store.clone())) as Arc<dyn RegulatorService>;

        let emergency_service = Arc::new(SeaOrmEmergencyService::new(
            store.clone(),
            telemetry.clone(),
        )) as Arc<dyn EmergencyService>;

        let profile_service = Arc::new(SeaOrmProfileService::new(
            store.clone(),
            config.general.media_path.clone(),
        )) as Arc<dyn ProfileService>;

        Ok(Self {
            config: Arc::new(config),
            store,
            auth_service,
            monitoring_service,
            pipeline_service,
            regulator_service,
            emergency_service,
            profile_service,
        })
    }
}
