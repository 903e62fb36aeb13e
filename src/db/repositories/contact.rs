use anyhow::{Context, Result};
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set,
};
use tracing::info;

use crate::entities::emergency_contacts::ContactStatus;
use crate::entities::{emergency_contacts, prelude::*};

pub type Contact = emergency_contacts::Model;

#[derive(Debug, Clone)]
pub struct NewContact {
    pub name: String,
    pub phone_number: String,
    pub relationship: String,
    pub is_primary: bool,
}

/// Repository for emergency contacts
pub struct ContactRepository {
    conn: DatabaseConnection,
}

impl ContactRepository {
    pub fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    /// Active contacts, primary first then by name.
    pub async fn list_active(&self, user_id: i32) -> Result<Vec<Contact>> {
        EmergencyContacts::find()
            .filter(emergency_contacts::Column::UserId.eq(user_id))
            .filter(emergency_contacts::Column::Status.eq(ContactStatus::Active))
            .order_by_desc(emergency_contacts::Column::IsPrimary)
            .order_by_asc(emergency_contacts::Column::Name)
            .order_by_asc(emergency_contacts::Column::Id)
            .all(&self.conn)
            .await
            .context("Failed to list emergency contacts")
    }

    pub async fn count_active(&self, user_id: i32) -> Result<u64> {
        let count = EmergencyContacts::find()
            .filter(emergency_contacts::Column::UserId.eq(user_id))
            .filter(emergency_contacts::Column::Status.eq(ContactStatus::Active))
            .count(&self.conn)
            .await?;
        Ok(count)
    }

    pub async fn create(&self, user_id: i32, contact: NewContact) -> Result<Contact> {
        let model = emergency_contacts::ActiveModel {
            user_id: Set(user_id),
            name: Set(contact.name),
            phone_number: Set(contact.phone_number),
            relationship: Set(contact.relationship),
            is_primary: Set(contact.is_primary),
            status: Set(ContactStatus::Active),
            created_at: Set(Utc::now()),
            ..Default::default()
        }
        .insert(&self.conn)
        .await
        .context("Failed to insert emergency contact")?;

        info!(user_id, contact_id = model.id, "Added emergency contact");
        Ok(model)
    }

    /// Moves an active contact owned by `user_id` to `Inactive`. Returns
    /// `false` when there was no such contact.
    pub async fn deactivate(&self, user_id: i32, contact_id: i32) -> Result<bool> {
        let result = EmergencyContacts::update_many()
            .col_expr(
                emergency_contacts::Column::Status,
                sea_orm::sea_query::Expr::value(ContactStatus::Inactive),
            )
            .filter(emergency_contacts::Column::Id.eq(contact_id))
            .filter(emergency_contacts::Column::UserId.eq(user_id))
            .filter(emergency_contacts::Column::Status.eq(ContactStatus::Active))
            .exec(&self.conn)
            .await?;

        if result.rows_affected > 0 {
            info!(user_id, contact_id, "Deactivated emergency contact");
        }
        Ok(result.rows_affected > 0)
    }
}
