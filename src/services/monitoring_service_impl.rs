//! `SeaORM` implementation of the `MonitoringService` trait.

use async_trait::async_trait;
use chrono::{Duration, Utc};
use std::sync::Arc;
use tracing::info;

use crate::constants::{limits, telemetry};
use crate::db::{self, NewSensor, ReadingValues, Store, User};
use crate::domain::FieldErrors;
use crate::entities::gas_alerts::AlertType;
use crate::entities::gas_sensors::SensorType;
use crate::services::monitoring_service::{
    AlertDto, Dashboard, GasLevelData, LatestReading, LeakState, LeakStatus, LevelPoint,
    MonitoringError, MonitoringService, ReadingDto, RecentAlert, RegulatorSnapshot, ScanResult,
    SensorDto, SensorInput, SensorStatus,
};
use crate::services::telemetry::{TelemetrySource, is_online};

pub struct SeaOrmMonitoringService {
    store: Store,
    telemetry: Arc<dyn TelemetrySource>,
    freshness_window_seconds: i64,
}

impl SeaOrmMonitoringService {
    #[must_use]
    pub fn new(
        store: Store,
        telemetry: Arc<dyn TelemetrySource>,
        freshness_window_seconds: i64,
    ) -> Self {
        Self {
            store,
            telemetry,
            freshness_window_seconds,
        }
    }
}

fn sensor_id_taken() -> MonitoringError {
    MonitoringError::Validation(FieldErrors::single(
        "sensor_id",
        "gas sensor with this sensor id already exists.",
    ))
}

#[async_trait]
impl MonitoringService for SeaOrmMonitoringService {
    async fn list_sensors(&self, user_id: i32) -> Result<Vec<SensorDto>, MonitoringError> {
        let sensors = self.store.sensor_repo().list_for_user(user_id).await?;
        Ok(sensors.into_iter().map(SensorDto::from).collect())
    }

    async fn register_sensor(
        &self,
        user_id: i32,
        input: SensorInput,
    ) -> Result<SensorDto, MonitoringError> {
        let sensors = self.store.sensor_repo();

        if sensors.sensor_id_taken(&input.sensor_id).await? {
            return Err(sensor_id_taken());
        }

        let sensor = sensors
            .create(
                user_id,
                NewSensor {
                    sensor_id: input.sensor_id,
                    sensor_name: input.sensor_name,
                    location: input.location,
                    sensor_type: input.sensor_type,
                },
            )
            .await
            .map_err(|err| match db::unique_violation(&err) {
                Some(_) => sensor_id_taken(),
                None => MonitoringError::from(err),
            })?;

        Ok(SensorDto::from(sensor))
    }

    async fn sensor_readings(
        &self,
        user_id: i32,
        sensor_pk: i32,
        limit: u64,
    ) -> Result<Vec<ReadingDto>, MonitoringError> {
        let sensors = self.store.sensor_repo();

        let sensor = sensors
            .get_owned(user_id, sensor_pk)
            .await?
            .ok_or(MonitoringError::SensorNotFound)?;

        let readings = sensors.readings(sensor.id, limit).await?;

        Ok(readings
            .into_iter()
            .map(|r| ReadingDto::new(r, &sensor))
            .collect())
    }

    async fn list_alerts(
        &self,
        user_id: i32,
        unacknowledged_only: bool,
    ) -> Result<Vec<AlertDto>, MonitoringError> {
        let alerts = self
            .store
            .alert_repo()
            .list(user_id, unacknowledged_only, None)
            .await?;

        Ok(alerts
            .into_iter()
            .map(|(alert, sensor)| AlertDto::new(alert, sensor.as_ref()))
            .collect())
    }

    async fn acknowledge_alert(
        &self,
        user_id: i32,
        alert_id: i32,
    ) -> Result<AlertDto, MonitoringError> {
        let alert = self
            .store
            .alert_repo()
            .acknowledge(user_id, alert_id)
            .await?
            .ok_or(MonitoringError::AlertNotFound)?;

        let sensor = self
            .store
            .sensor_repo()
            .get_owned(user_id, alert.sensor_id)
            .await?;

        Ok(AlertDto::new(alert, sensor.as_ref()))
    }

    async fn leak_status(&self, user_id: i32) -> Result<LeakStatus, MonitoringError> {
        let sensors = self.store.sensor_repo();
        let leak_sensors = sensors
            .list_active(user_id, Some(SensorType::GasLeak))
            .await?;
        let ids: Vec<i32> = leak_sensors.iter().map(|s| s.id).collect();

        let (status, gas_level) = match sensors.latest_reading_among(&ids).await? {
            Some((reading, _)) => (
                if reading.leak_detected {
                    LeakState::LeakDetected
                } else {
                    LeakState::Safe
                },
                reading.gas_level.unwrap_or(0.0),
            ),
            None => (LeakState::Safe, 0.0),
        };

        Ok(LeakStatus {
            status,
            gas_level,
            sensor_count: leak_sensors.len() as u64,
            last_scan: Utc::now().to_rfc3339(),
        })
    }

    async fn trigger_scan(&self, user_id: i32) -> Result<ScanResult, MonitoringError> {
        let now = Utc::now();
        let values = ReadingValues {
            gas_level: Some(self.telemetry.uniform(telemetry::SCAN_GAS_LEVEL)),
            pressure: Some(self.telemetry.uniform(telemetry::PRESSURE_PSI)),
            temperature: Some(self.telemetry.uniform(telemetry::TEMPERATURE_C)),
            flow_rate: Some(self.telemetry.uniform(telemetry::FLOW_RATE_LPH)),
            leak_detected: self.telemetry.leak(),
        };
        let scan_id = self.telemetry.integer(telemetry::SCAN_ID);
        let gas_level = values.gas_level.unwrap_or_default();

        metrics::counter!("gas_scans_total").increment(1);

        if let Some(sensor) = self
            .store
            .sensor_repo()
            .first_of_type(user_id, SensorType::GasLeak)
            .await?
        {
            self.store
                .sensor_repo()
                .record_reading(sensor.id, values, now)
                .await?;

            if values.leak_detected {
                let message = format!("Gas leak detected with level {gas_level:.1}%");
                self.store
                    .alert_repo()
                    .create(user_id, sensor.id, AlertType::LeakDetected, &message)
                    .await?;
                metrics::counter!("gas_leak_alerts_total").increment(1);
            }
        }

        info!(user_id, scan_id, leak = values.leak_detected, "Gas scan completed");

        Ok(ScanResult {
            scan_id,
            gas_level,
            pressure: values.pressure.unwrap_or_default(),
            temperature: values.temperature.unwrap_or_default(),
            flow_rate: values.flow_rate.unwrap_or_default(),
            leak_detected: values.leak_detected,
            scan_duration: telemetry::SCAN_DURATION_SECONDS,
            timestamp: now.to_rfc3339(),
        })
    }

    async fn gas_level(&self, user_id: i32) -> Result<GasLevelData, MonitoringError> {
        let sensor_count = self
            .store
            .sensor_repo()
            .list_active(user_id, Some(SensorType::GasLevel))
            .await?
            .len() as u64;

        let now = Utc::now();
        let current_level = self.telemetry.uniform(telemetry::TANK_LEVEL);
        let estimated_hours = self.telemetry.uniform(telemetry::ESTIMATED_HOURS);

        let recent_readings = (0..telemetry::RECENT_READINGS)
            .map(|i| LevelPoint {
                time: (now - Duration::minutes(i * telemetry::RECENT_READINGS_SPACING_MINUTES))
                    .format("%H:%M")
                    .to_string(),
                level: current_level + self.telemetry.uniform(telemetry::LEVEL_JITTER),
                status: "Good".to_string(),
            })
            .collect();

        Ok(GasLevelData {
            current_level,
            estimated_hours,
            flow_rate: self.telemetry.uniform(telemetry::FLOW_RATE_LPH),
            pressure: self.telemetry.uniform(telemetry::PRESSURE_PSI),
            sensor_count,
            recent_readings,
        })
    }

    async fn dashboard(&self, user: &User) -> Result<Dashboard, MonitoringError> {
        let sensors = self.store.sensor_repo();
        let now = Utc::now();

        let active_sensors = sensors.list_active(user.id, None).await?;
        let active_alerts = self.store.alert_repo().count_unacknowledged(user.id).await?;

        let latest_reading = sensors
            .latest_reading_for_user(user.id)
            .await?
            .map(|(reading, sensor)| LatestReading {
                gas_level: reading.gas_level,
                temperature: reading.temperature,
                pressure: reading.pressure,
                sensor_location: sensor.map(|s| s.location),
                timestamp: reading.timestamp.to_rfc3339(),
            });

        let recent_alerts = self
            .store
            .alert_repo()
            .list(user.id, false, Some(limits::DASHBOARD_RECENT_ALERTS))
            .await?
            .into_iter()
            .map(|(alert, sensor)| RecentAlert {
                id: alert.id,
                alert_type: alert.alert_type,
                message: alert.message,
                sensor_location: sensor.map(|s| s.location),
                timestamp: alert.created_at.to_rfc3339(),
                is_acknowledged: alert.is_acknowledged,
            })
            .collect();

        let mut sensor_status = Vec::with_capacity(active_sensors.len());
        for sensor in &active_sensors {
            let latest = sensors.latest_reading(sensor.id).await?;
            sensor_status.push(SensorStatus {
                sensor_id: sensor.sensor_id.clone(),
                name: sensor.sensor_name.clone(),
                location: sensor.location.clone(),
                is_online: latest.as_ref().is_some_and(|r| {
                    is_online(r.timestamp, now, self.freshness_window_seconds)
                }),
                last_reading: latest.as_ref().map(|r| r.timestamp.to_rfc3339()),
                gas_level: latest.and_then(|r| r.gas_level).unwrap_or(0.0),
            });
        }

        let regulator_status = self
            .store
            .regulator_repo()
            .get(user.id)
            .await?
            .map(|r| RegulatorSnapshot {
                pressure: r.current_pressure,
                is_on: r.is_on,
                auto_mode: r.auto_mode,
                flow_rate: r.flow_rate,
                temperature: r.temperature,
            });

        Ok(Dashboard {
            total_sensors: active_sensors.len() as u64,
            active_alerts,
            latest_reading,
            recent_alerts,
            sensor_status,
            regulator_status,
            user_name: user.username.clone(),
            last_updated: now.to_rfc3339(),
        })
    }
}
