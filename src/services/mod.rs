pub mod telemetry;
pub use telemetry::{FixedTelemetry, RandomTelemetry, TelemetrySource};

pub mod token;
pub use token::{TokenError, TokenPair, TokenService, TokenType};

pub mod auth_service;
pub mod auth_service_impl;
pub use auth_service::{AuthError, AuthService, LoginResult, Registration};
pub use auth_service_impl::SeaOrmAuthService;

pub mod monitoring_service;
pub mod monitoring_service_impl;
pub use monitoring_service::{MonitoringError, MonitoringService, SensorInput};
pub use monitoring_service_impl::SeaOrmMonitoringService;

pub mod pipeline_service;
pub mod pipeline_service_impl;
pub use pipeline_service::{PipelineError, PipelineService};
pub use pipeline_service_impl::SeaOrmPipelineService;

pub mod regulator_service;
pub mod regulator_service_impl;
pub use regulator_service::{RegulatorAction, RegulatorError, RegulatorService};
pub use regulator_service_impl::SeaOrmRegulatorService;

pub mod emergency_service;
pub mod emergency_service_impl;
pub use emergency_service::{EmergencyError, EmergencyService};
pub use emergency_service_impl::SeaOrmEmergencyService;

pub mod profile_service;
pub mod profile_service_impl;
pub use profile_service::{ProfileError, ProfileService};
pub use profile_service_impl::SeaOrmProfileService;
