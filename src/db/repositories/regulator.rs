use anyhow::{Context, Result};
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set,
    sea_query::OnConflict,
};

use crate::constants::defaults;
use crate::entities::{gas_regulators, prelude::*};

pub type Regulator = gas_regulators::Model;

/// Partial regulator update. `None` keeps the stored value.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RegulatorChanges {
    pub is_on: Option<bool>,
    pub auto_mode: Option<bool>,
    pub current_pressure: Option<f64>,
    pub flow_rate: Option<f64>,
    pub temperature: Option<f64>,
}

pub struct RegulatorRepository {
    conn: DatabaseConnection,
}

impl RegulatorRepository {
    pub fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn get(&self, user_id: i32) -> Result<Option<Regulator>> {
        GasRegulators::find()
            .filter(gas_regulators::Column::UserId.eq(user_id))
            .one(&self.conn)
            .await
            .context("Failed to query regulator")
    }

    /// Upserts the default regulator for `user_id` and returns the stored row.
    pub async fn get_or_create(&self, user_id: i32) -> Result<Regulator> {
        if let Some(regulator) = self.get(user_id).await? {
            return Ok(regulator);
        }

        let model = gas_regulators::ActiveModel {
            user_id: Set(user_id),
            regulator_id: Set(defaults::regulator_id(user_id)),
            is_on: Set(defaults::REGULATOR_ON),
            auto_mode: Set(defaults::REGULATOR_AUTO),
            current_pressure: Set(defaults::REGULATOR_PRESSURE),
            flow_rate: Set(defaults::REGULATOR_FLOW_RATE),
            temperature: Set(defaults::REGULATOR_TEMPERATURE),
            last_updated: Set(Utc::now()),
            ..Default::default()
        };

        GasRegulators::insert(model)
            .on_conflict(
                OnConflict::column(gas_regulators::Column::UserId)
                    .do_nothing()
                    .to_owned(),
            )
            .exec_without_returning(&self.conn)
            .await?;

        self.get(user_id)
            .await?
            .ok_or_else(|| anyhow::anyhow!("Regulator for user {user_id} vanished after insert"))
    }

    pub async fn apply(&self, user_id: i32, changes: RegulatorChanges) -> Result<Regulator> {
        let regulator = self.get_or_create(user_id).await?;

        let mut active: gas_regulators::ActiveModel = regulator.into();
        if let Some(is_on) = changes.is_on {
            active.is_on = Set(is_on);
        }
        if let Some(auto_mode) = changes.auto_mode {
            active.auto_mode = Set(auto_mode);
        }
        if let Some(pressure) = changes.current_pressure {
            active.current_pressure = Set(pressure);
        }
        if let Some(flow_rate) = changes.flow_rate {
            active.flow_rate = Set(flow_rate);
        }
        if let Some(temperature) = changes.temperature {
            active.temperature = Set(temperature);
        }
        active.last_updated = Set(Utc::now());

        active
            .update(&self.conn)
            .await
            .context("Failed to update regulator")
    }
}
