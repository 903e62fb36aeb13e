//! Domain service for the per-user gas regulator.

use serde::Serialize;
use thiserror::Error;

use crate::db::{Regulator, RegulatorChanges};

#[derive(Debug, Error)]
pub enum RegulatorError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<sea_orm::DbErr> for RegulatorError {
    fn from(err: sea_orm::DbErr) -> Self {
        Self::Database(err.to_string())
    }
}

impl From<anyhow::Error> for RegulatorError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err.to_string())
    }
}

/// Control command accepted by the regulator endpoint.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RegulatorAction {
    TogglePower,
    ToggleAuto,
    UpdateSettings(RegulatorChanges),
}

impl RegulatorAction {
    pub const NAMES: [&'static str; 3] = ["toggle_power", "toggle_auto", "update_settings"];

    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::TogglePower => "toggle_power",
            Self::ToggleAuto => "toggle_auto",
            Self::UpdateSettings(_) => "update_settings",
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RegulatorDto {
    pub id: i32,
    pub user: i32,
    pub regulator_id: String,
    pub is_on: bool,
    pub auto_mode: bool,
    pub current_pressure: f64,
    pub flow_rate: f64,
    pub temperature: f64,
    pub last_updated: String,
}

impl From<Regulator> for RegulatorDto {
    fn from(r: Regulator) -> Self {
        Self {
            id: r.id,
            user: r.user_id,
            regulator_id: r.regulator_id,
            is_on: r.is_on,
            auto_mode: r.auto_mode,
            current_pressure: r.current_pressure,
            flow_rate: r.flow_rate,
            temperature: r.temperature,
            last_updated: r.last_updated.to_rfc3339(),
        }
    }
}

#[async_trait::async_trait]
pub trait RegulatorService: Send + Sync {
    /// Current state, created with defaults on first access.
    async fn state(&self, user_id: i32) -> Result<RegulatorDto, RegulatorError>;

    async fn control(
        &self,
        user_id: i32,
        action: RegulatorAction,
    ) -> Result<RegulatorDto, RegulatorError>;
}
