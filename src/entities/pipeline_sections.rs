use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(20))")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SectionStatus {
    #[sea_orm(string_value = "EXCELLENT")]
    Excellent,
    #[sea_orm(string_value = "GOOD")]
    Good,
    #[sea_orm(string_value = "FAIR")]
    Fair,
    #[sea_orm(string_value = "POOR")]
    Poor,
}

impl SectionStatus {
    #[must_use]
    pub fn from_health(health: f64) -> Self {
        if health >= 90.0 {
            Self::Excellent
        } else if health >= 80.0 {
            Self::Good
        } else if health >= 60.0 {
            Self::Fair
        } else {
            Self::Poor
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "pipeline_sections")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub user_id: i32,

    pub section_name: String,

    /// 0..=100
    pub health_percentage: f64,

    pub status: SectionStatus,

    pub last_inspection: Option<DateTimeUtc>,

    pub next_inspection: Option<DateTimeUtc>,
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
