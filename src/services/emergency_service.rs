//! Domain service for emergency contacts and the SOS trigger.

use serde::Serialize;
use thiserror::Error;

use crate::db::{Contact, NewContact};

#[derive(Debug, Error)]
pub enum EmergencyError {
    #[error("No emergency contacts found")]
    NoContacts,

    #[error("Contact not found")]
    ContactNotFound,

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<sea_orm::DbErr> for EmergencyError {
    fn from(err: sea_orm::DbErr) -> Self {
        Self::Database(err.to_string())
    }
}

impl From<anyhow::Error> for EmergencyError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err.to_string())
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ContactDto {
    pub id: i32,
    pub name: String,
    pub phone_number: String,
    pub relationship: String,
    pub is_primary: bool,
    pub is_active: bool,
}

impl From<Contact> for ContactDto {
    fn from(c: Contact) -> Self {
        Self {
            is_active: c.is_active(),
            id: c.id,
            name: c.name,
            phone_number: c.phone_number,
            relationship: c.relationship,
            is_primary: c.is_primary,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SosConfirmation {
    pub sos_id: i64,
    pub triggered_at: String,
    pub contacts_called: u64,
    pub estimated_response_time: String,
}

#[async_trait::async_trait]
pub trait EmergencyService: Send + Sync {
    /// Active contacts, primary first then alphabetical.
    async fn contacts(&self, user_id: i32) -> Result<Vec<ContactDto>, EmergencyError>;

    async fn add_contact(
        &self,
        user_id: i32,
        contact: NewContact,
    ) -> Result<ContactDto, EmergencyError>;

    /// Soft-deletes a contact.
    ///
    /// # Errors
    ///
    /// Returns [`EmergencyError::ContactNotFound`] when the contact is not
    /// owned by the caller or already inactive.
    async fn remove_contact(&self, user_id: i32, contact_id: i32) -> Result<(), EmergencyError>;

    /// Simulated SOS. Nothing is dialed.
    ///
    /// # Errors
    ///
    /// Returns [`EmergencyError::NoContacts`] without active contacts.
    async fn trigger_sos(&self, user_id: i32) -> Result<SosConfirmation, EmergencyError>;
}
