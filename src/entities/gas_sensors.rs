use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(20))")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SensorType {
    #[sea_orm(string_value = "GAS_LEAK")]
    GasLeak,
    #[sea_orm(string_value = "GAS_LEVEL")]
    GasLevel,
    #[sea_orm(string_value = "PRESSURE")]
    Pressure,
    #[sea_orm(string_value = "TEMPERATURE")]
    Temperature,
}

impl SensorType {
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "GAS_LEAK" => Some(Self::GasLeak),
            "GAS_LEVEL" => Some(Self::GasLevel),
            "PRESSURE" => Some(Self::Pressure),
            "TEMPERATURE" => Some(Self::Temperature),
            _ => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "gas_sensors")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub user_id: i32,

    /// Hardware identifier printed on the device, unique across all users.
    #[sea_orm(unique)]
    pub sensor_id: String,

    pub sensor_name: String,

    pub location: String,

    pub sensor_type: SensorType,

    pub is_active: bool,

    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::UserId",
        to = "super::users::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Users,
    #[sea_orm(has_many = "super::gas_readings::Entity")]
    GasReadings,
    #[sea_orm(has_many = "super::gas_alerts::Entity")]
    GasAlerts,
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Users.def()
    }
}

impl Related<super::gas_readings::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::GasReadings.def()
    }
}

impl Related<super::gas_alerts::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::GasAlerts.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
