use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(20))")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AlertType {
    #[sea_orm(string_value = "LEAK_DETECTED")]
    LeakDetected,
    #[sea_orm(string_value = "LOW_LEVEL")]
    LowLevel,
    #[sea_orm(string_value = "HIGH_PRESSURE")]
    HighPressure,
    #[sea_orm(string_value = "MAINTENANCE_DUE")]
    MaintenanceDue,
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "gas_alerts")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub user_id: i32,

    pub sensor_id: i32,

    pub alert_type: AlertType,

    #[sea_orm(column_type = "Text")]
    pub message: String,

    pub is_acknowledged: bool,

    pub created_at: DateTimeUtc,

    pub acknowledged_at: Option<DateTimeUtc>,
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
    #[sea_orm(
        belongs_to = "super::gas_sensors::Entity",
        from = "Column::SensorId",
        to = "super::gas_sensors::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    GasSensors,
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Users.def()
    }
}

impl Related<super::gas_sensors::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::GasSensors.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
