use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    #[sea_orm(unique)]
    pub username: String,

    /// Not unique at the storage level; lookups take the first match.
    pub email: String,

    /// Argon2id password hash
    pub password_hash: String,

    /// Disabled accounts cannot log in and their tokens are refused.
    pub is_active: bool,

    pub date_joined: DateTimeUtc,

    pub last_login: Option<DateTimeUtc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_one = "super::user_profiles::Entity")]
    UserProfiles,
    #[sea_orm(has_many = "super::gas_sensors::Entity")]
    GasSensors,
    #[sea_orm(has_many = "super::emergency_contacts::Entity")]
    EmergencyContacts,
}

impl Related<super::user_profiles::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::UserProfiles.def()
    }
}

impl Related<super::gas_sensors::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::GasSensors.def()
    }
}

impl Related<super::emergency_contacts::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::EmergencyContacts.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
