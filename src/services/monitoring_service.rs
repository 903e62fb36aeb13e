//! Domain service for sensors, readings, alerts and the simulated telemetry
//! views built on top of them (leak status, scans, tank level, dashboard).

use serde::Serialize;
use thiserror::Error;

use crate::db::{Alert, Reading, Sensor, User};
use crate::domain::FieldErrors;
use crate::entities::gas_alerts::AlertType;
use crate::entities::gas_sensors::{self, SensorType};

#[derive(Debug, Error)]
pub enum MonitoringError {
    #[error("Sensor not found")]
    SensorNotFound,

    #[error("Alert not found")]
    AlertNotFound,

    #[error("Validation failed: {0}")]
    Validation(FieldErrors),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<sea_orm::DbErr> for MonitoringError {
    fn from(err: sea_orm::DbErr) -> Self {
        Self::Database(err.to_string())
    }
}

impl From<anyhow::Error> for MonitoringError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err.to_string())
    }
}

#[derive(Debug, Clone)]
pub struct SensorInput {
    pub sensor_id: String,
    pub sensor_name: String,
    pub location: String,
    pub sensor_type: SensorType,
}

#[derive(Debug, Clone, Serialize)]
pub struct SensorDto {
    pub id: i32,
    pub user: i32,
    pub sensor_id: String,
    pub sensor_name: String,
    pub location: String,
    pub sensor_type: SensorType,
    pub is_active: bool,
    pub created_at: String,
}

impl From<Sensor> for SensorDto {
    fn from(s: Sensor) -> Self {
        Self {
            id: s.id,
            user: s.user_id,
            sensor_id: s.sensor_id,
            sensor_name: s.sensor_name,
            location: s.location,
            sensor_type: s.sensor_type,
            is_active: s.is_active,
            created_at: s.created_at.to_rfc3339(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ReadingDto {
    pub id: i32,
    pub sensor: i32,
    pub sensor_name: String,
    pub location: String,
    pub gas_level: Option<f64>,
    pub pressure: Option<f64>,
    pub temperature: Option<f64>,
    pub flow_rate: Option<f64>,
    pub leak_detected: bool,
    pub timestamp: String,
}

impl ReadingDto {
    #[must_use]
    pub fn new(reading: Reading, sensor: &Sensor) -> Self {
        Self {
            id: reading.id,
            sensor: reading.sensor_id,
            sensor_name: sensor.sensor_name.clone(),
            location: sensor.location.clone(),
            gas_level: reading.gas_level,
            pressure: reading.pressure,
            temperature: reading.temperature,
            flow_rate: reading.flow_rate,
            leak_detected: reading.leak_detected,
            timestamp: reading.timestamp.to_rfc3339(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct AlertDto {
    pub id: i32,
    pub user: i32,
    pub sensor: i32,
    pub sensor_location: Option<String>,
    pub alert_type: AlertType,
    pub message: String,
    pub is_acknowledged: bool,
    pub created_at: String,
    pub acknowledged_at: Option<String>,
}

impl AlertDto {
    #[must_use]
    pub fn new(alert: Alert, sensor: Option<&gas_sensors::Model>) -> Self {
        Self {
            id: alert.id,
            user: alert.user_id,
            sensor: alert.sensor_id,
            sensor_location: sensor.map(|s| s.location.clone()),
            alert_type: alert.alert_type,
            message: alert.message,
            is_acknowledged: alert.is_acknowledged,
            created_at: alert.created_at.to_rfc3339(),
            acknowledged_at: alert.acknowledged_at.map(|t| t.to_rfc3339()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LeakState {
    Safe,
    LeakDetected,
}

#[derive(Debug, Clone, Serialize)]
pub struct LeakStatus {
    pub status: LeakState,
    pub gas_level: f64,
    pub sensor_count: u64,
    pub last_scan: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ScanResult {
    pub scan_id: i64,
    pub gas_level: f64,
    pub pressure: f64,
    pub temperature: f64,
    pub flow_rate: f64,
    pub leak_detected: bool,
    pub scan_duration: i32,
    pub timestamp: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct LevelPoint {
    pub time: String,
    pub level: f64,
    pub status: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct GasLevelData {
    pub current_level: f64,
    pub estimated_hours: f64,
    pub flow_rate: f64,
    pub pressure: f64,
    pub sensor_count: u64,
    pub recent_readings: Vec<LevelPoint>,
}

#[derive(Debug, Clone, Serialize)]
pub struct LatestReading {
    pub gas_level: Option<f64>,
    pub temperature: Option<f64>,
    pub pressure: Option<f64>,
    pub sensor_location: Option<String>,
    pub timestamp: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct RecentAlert {
    pub id: i32,
    #[serde(rename = "type")]
    pub alert_type: AlertType,
    pub message: String,
    pub sensor_location: Option<String>,
    pub timestamp: String,
    pub is_acknowledged: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct SensorStatus {
    pub sensor_id: String,
    pub name: String,
    pub location: String,
    pub is_online: bool,
    pub last_reading: Option<String>,
    pub gas_level: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct RegulatorSnapshot {
    pub pressure: f64,
    pub is_on: bool,
    pub auto_mode: bool,
    pub flow_rate: f64,
    pub temperature: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct Dashboard {
    pub total_sensors: u64,
    pub active_alerts: u64,
    pub latest_reading: Option<LatestReading>,
    pub recent_alerts: Vec<RecentAlert>,
    pub sensor_status: Vec<SensorStatus>,
    pub regulator_status: Option<RegulatorSnapshot>,
    pub user_name: String,
    pub last_updated: String,
}

/// Domain service trait for gas monitoring.
#[async_trait::async_trait]
pub trait MonitoringService: Send + Sync {
    async fn list_sensors(&self, user_id: i32) -> Result<Vec<SensorDto>, MonitoringError>;

    /// # Errors
    ///
    /// Returns [`MonitoringError::Validation`] when `sensor_id` is already in use.
    async fn register_sensor(
        &self,
        user_id: i32,
        input: SensorInput,
    ) -> Result<SensorDto, MonitoringError>;

    /// Newest readings first.
    async fn sensor_readings(
        &self,
        user_id: i32,
        sensor_pk: i32,
        limit: u64,
    ) -> Result<Vec<ReadingDto>, MonitoringError>;

    async fn list_alerts(
        &self,
        user_id: i32,
        unacknowledged_only: bool,
    ) -> Result<Vec<AlertDto>, MonitoringError>;

    async fn acknowledge_alert(
        &self,
        user_id: i32,
        alert_id: i32,
    ) -> Result<AlertDto, MonitoringError>;

    async fn leak_status(&self, user_id: i32) -> Result<LeakStatus, MonitoringError>;

    /// Synthesizes a scan, persisting the reading and a leak alert when the
    /// user owns a leak sensor.
    async fn trigger_scan(&self, user_id: i32) -> Result<ScanResult, MonitoringError>;

    async fn gas_level(&self, user_id: i32) -> Result<GasLevelData, MonitoringError>;

    async fn dashboard(&self, user: &User) -> Result<Dashboard, MonitoringError>;
}
