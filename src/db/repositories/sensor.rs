use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect, Set,
};
use tracing::info;

use crate::entities::gas_sensors::SensorType;
use crate::entities::{gas_readings, gas_sensors, prelude::*};

pub type Sensor = gas_sensors::Model;
pub type Reading = gas_readings::Model;

#[derive(Debug, Clone)]
pub struct NewSensor {
    pub sensor_id: String,
    pub sensor_name: String,
    pub location: String,
    pub sensor_type: SensorType,
}

/// Measured values of a single reading, without identity or timestamp.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ReadingValues {
    pub gas_level: Option<f64>,
    pub pressure: Option<f64>,
    pub temperature: Option<f64>,
    pub flow_rate: Option<f64>,
    pub leak_detected: bool,
}

/// Repository for sensors and their readings
pub struct SensorRepository {
    conn: DatabaseConnection,
}

impl SensorRepository {
    pub fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    // ========================================================================
    // Sensors
    // ========================================================================

    pub async fn create(&self, user_id: i32, sensor: NewSensor) -> Result<Sensor> {
        let model = gas_sensors::ActiveModel {
            user_id: Set(user_id),
            sensor_id: Set(sensor.sensor_id),
            sensor_name: Set(sensor.sensor_name),
            location: Set(sensor.location),
            sensor_type: Set(sensor.sensor_type),
            is_active: Set(true),
            created_at: Set(Utc::now()),
            ..Default::default()
        }
        .insert(&self.conn)
        .await
        .context("Failed to insert sensor")?;

        info!(user_id, sensor_id = %model.sensor_id, "Registered sensor");
        Ok(model)
    }

    pub async fn sensor_id_taken(&self, sensor_id: &str) -> Result<bool> {
        let existing = GasSensors::find()
            .filter(gas_sensors::Column::SensorId.eq(sensor_id))
            .one(&self.conn)
            .await?;
        Ok(existing.is_some())
    }

    pub async fn list_for_user(&self, user_id: i32) -> Result<Vec<Sensor>> {
        GasSensors::find()
            .filter(gas_sensors::Column::UserId.eq(user_id))
            .order_by_asc(gas_sensors::Column::Id)
            .all(&self.conn)
            .await
            .context("Failed to list sensors")
    }

    /// Active sensors of the user, optionally restricted to one type.
    pub async fn list_active(
        &self,
        user_id: i32,
        sensor_type: Option<SensorType>,
    ) -> Result<Vec<Sensor>> {
        let mut query = GasSensors::find()
            .filter(gas_sensors::Column::UserId.eq(user_id))
            .filter(gas_sensors::Column::IsActive.eq(true));

        if let Some(kind) = sensor_type {
            query = query.filter(gas_sensors::Column::SensorType.eq(kind));
        }

        query
            .order_by_asc(gas_sensors::Column::Id)
            .all(&self.conn)
            .await
            .context("Failed to list active sensors")
    }

    /// First sensor of the given type regardless of its active flag.
    pub async fn first_of_type(
        &self,
        user_id: i32,
        sensor_type: SensorType,
    ) -> Result<Option<Sensor>> {
        GasSensors::find()
            .filter(gas_sensors::Column::UserId.eq(user_id))
            .filter(gas_sensors::Column::SensorType.eq(sensor_type))
            .order_by_asc(gas_sensors::Column::Id)
            .one(&self.conn)
            .await
            .context("Failed to query sensor by type")
    }

    pub async fn get_owned(&self, user_id: i32, id: i32) -> Result<Option<Sensor>> {
        GasSensors::find_by_id(id)
            .filter(gas_sensors::Column::UserId.eq(user_id))
            .one(&self.conn)
            .await
            .context("Failed to query sensor")
    }

    // ========================================================================
    // Readings
    // ========================================================================

    pub async fn record_reading(
        &self,
        sensor_pk: i32,
        values: ReadingValues,
        timestamp: DateTime<Utc>,
    ) -> Result<Reading> {
        gas_readings::ActiveModel {
            sensor_id: Set(sensor_pk),
            gas_level: Set(values.gas_level),
            pressure: Set(values.pressure),
            temperature: Set(values.temperature),
            flow_rate: Set(values.flow_rate),
            leak_detected: Set(values.leak_detected),
            timestamp: Set(timestamp),
            ..Default::default()
        }
        .insert(&self.conn)
        .await
        .context("Failed to insert reading")
    }

    /// Newest reading among the given sensors, with the sensor it belongs to.
    pub async fn latest_reading_among(
        &self,
        sensor_pks: &[i32],
    ) -> Result<Option<(Reading, Option<Sensor>)>> {
        if sensor_pks.is_empty() {
            return Ok(None);
        }

        GasReadings::find()
            .filter(gas_readings::Column::SensorId.is_in(sensor_pks.iter().copied()))
            .order_by_desc(gas_readings::Column::Timestamp)
            .order_by_desc(gas_readings::Column::Id)
            .find_also_related(GasSensors)
            .one(&self.conn)
            .await
            .context("Failed to query latest reading")
    }

    /// Newest reading across every sensor the user owns.
    pub async fn latest_reading_for_user(
        &self,
        user_id: i32,
    ) -> Result<Option<(Reading, Option<Sensor>)>> {
        let ids: Vec<i32> = GasSensors::find()
            .select_only()
            .column(gas_sensors::Column::Id)
            .filter(gas_sensors::Column::UserId.eq(user_id))
            .into_tuple()
            .all(&self.conn)
            .await?;

        self.latest_reading_among(&ids).await
    }

    pub async fn latest_reading(&self, sensor_pk: i32) -> Result<Option<Reading>> {
        GasReadings::find()
            .filter(gas_readings::Column::SensorId.eq(sensor_pk))
            .order_by_desc(gas_readings::Column::Timestamp)
            .order_by_desc(gas_readings::Column::Id)
            .one(&self.conn)
            .await
            .context("Failed to query latest reading for sensor")
    }

    pub async fn readings(&self, sensor_pk: i32, limit: u64) -> Result<Vec<Reading>> {
        GasReadings::find()
            .filter(gas_readings::Column::SensorId.eq(sensor_pk))
            .order_by_desc(gas_readings::Column::Timestamp)
            .order_by_desc(gas_readings::Column::Id)
            .limit(limit)
            .all(&self.conn)
            .await
            .context("Failed to list readings")
    }
}
