use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "gas_regulators")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    /// One regulator per user.
    #[sea_orm(unique)]
    pub user_id: i32,

    pub regulator_id: String,

    pub is_on: bool,

    pub auto_mode: bool,

    pub current_pressure: f64,

    pub flow_rate: f64,

    pub temperature: f64,

    pub last_updated: DateTimeUtc,
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
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Users.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
