use anyhow::{Context, Result};
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Set,
};
use tracing::info;

use crate::entities::gas_alerts::AlertType;
use crate::entities::{gas_alerts, gas_sensors, prelude::*};

pub type Alert = gas_alerts::Model;

/// Repository for gas alerts
pub struct AlertRepository {
    conn: DatabaseConnection,
}

impl AlertRepository {
    pub fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn create(
        &self,
        user_id: i32,
        sensor_pk: i32,
        alert_type: AlertType,
        message: &str,
    ) -> Result<Alert> {
        let alert = gas_alerts::ActiveModel {
            user_id: Set(user_id),
            sensor_id: Set(sensor_pk),
            alert_type: Set(alert_type),
            message: Set(message.to_string()),
            is_acknowledged: Set(false),
            created_at: Set(Utc::now()),
            acknowledged_at: Set(None),
            ..Default::default()
        }
        .insert(&self.conn)
        .await
        .context("Failed to insert alert")?;

        info!(user_id, alert_id = alert.id, ?alert_type, "Raised alert");
        Ok(alert)
    }

    pub async fn count_unacknowledged(&self, user_id: i32) -> Result<u64> {
        let count = GasAlerts::find()
            .filter(gas_alerts::Column::UserId.eq(user_id))
            .filter(gas_alerts::Column::IsAcknowledged.eq(false))
            .count(&self.conn)
            .await?;
        Ok(count)
    }

    /// Newest alerts first, each with the sensor that raised it.
    pub async fn list(
        &self,
        user_id: i32,
        unacknowledged_only: bool,
        limit: Option<u64>,
    ) -> Result<Vec<(Alert, Option<gas_sensors::Model>)>> {
        let mut query = GasAlerts::find().filter(gas_alerts::Column::UserId.eq(user_id));

        if unacknowledged_only {
            query = query.filter(gas_alerts::Column::IsAcknowledged.eq(false));
        }

        query
            .order_by_desc(gas_alerts::Column::CreatedAt)
            .order_by_desc(gas_alerts::Column::Id)
            .limit(limit)
            .find_also_related(GasSensors)
            .all(&self.conn)
            .await
            .context("Failed to list alerts")
    }

    /// Returns `None` when the alert does not exist or belongs to someone else.
    pub async fn acknowledge(&self, user_id: i32, alert_id: i32) -> Result<Option<Alert>> {
        let Some(alert) = GasAlerts::find_by_id(alert_id)
            .filter(gas_alerts::Column::UserId.eq(user_id))
            .one(&self.conn)
            .await?
        else {
            return Ok(None);
        };

        if alert.is_acknowledged {
            return Ok(Some(alert));
        }

        let mut active: gas_alerts::ActiveModel = alert.into();
        active.is_acknowledged = Set(true);
        active.acknowledged_at = Set(Some(Utc::now()));
        let updated = active.update(&self.conn).await?;

        Ok(Some(updated))
    }
}
