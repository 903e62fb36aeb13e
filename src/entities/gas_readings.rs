use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "gas_readings")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub sensor_id: i32,

    /// Percentage
    pub gas_level: Option<f64>,

    /// PSI
    pub pressure: Option<f64>,

    /// Celsius
    pub temperature: Option<f64>,

    /// L/h
    pub flow_rate: Option<f64>,

    pub leak_detected: bool,

    pub timestamp: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::gas_sensors::Entity",
        from = "Column::SensorId",
        to = "super::gas_sensors::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    GasSensors,
}

impl Related<super::gas_sensors::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::GasSensors.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
