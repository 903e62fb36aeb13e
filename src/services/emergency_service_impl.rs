//! `SeaORM` implementation of the `EmergencyService` trait.

use async_trait::async_trait;
use chrono::Utc;
use std::sync::Arc;
use tracing::warn;

use crate::constants::emergency;
use crate::db::{NewContact, Store};
use crate::services::emergency_service::{
    ContactDto, EmergencyError, EmergencyService, SosConfirmation,
};
use crate::services::telemetry::TelemetrySource;

pub struct SeaOrmEmergencyService {
    store: Store,
    telemetry: Arc<dyn TelemetrySource>,
}

impl SeaOrmEmergencyService {
    #[must_use]
    pub fn new(store: Store, telemetry: Arc<dyn TelemetrySource>) -> Self {
        Self { store, telemetry }
    }
}

#[async_trait]
impl EmergencyService for SeaOrmEmergencyService {
    async fn contacts(&self, user_id: i32) -> Result<Vec<ContactDto>, EmergencyError> {
        let contacts = self.store.contact_repo().list_active(user_id).await?;
        Ok(contacts.into_iter().map(ContactDto::from).collect())
    }

    async fn add_contact(
        &self,
        user_id: i32,
        contact: NewContact,
    ) -> Result<ContactDto, EmergencyError> {
        let created = self.store.contact_repo().create(user_id, contact).await?;
        Ok(ContactDto::from(created))
    }

    async fn remove_contact(&self, user_id: i32, contact_id: i32) -> Result<(), EmergencyError> {
        if self
            .store
            .contact_repo()
            .deactivate(user_id, contact_id)
            .await?
        {
            Ok(())
        } else {
            Err(EmergencyError::ContactNotFound)
        }
    }

    async fn trigger_sos(&self, user_id: i32) -> Result<SosConfirmation, EmergencyError> {
        let contacts_called = self.store.count_active_contacts(user_id).await?;
        if contacts_called == 0 {
            return Err(EmergencyError::NoContacts);
        }

        let sos_id = self.telemetry.integer(emergency::SOS_ID);
        warn!(user_id, sos_id, contacts_called, "Emergency SOS triggered");
        metrics::counter!("sos_triggered_total").increment(1);

        Ok(SosConfirmation {
            sos_id,
            triggered_at: Utc::now().to_rfc3339(),
            contacts_called,
            estimated_response_time: emergency::ESTIMATED_RESPONSE_TIME.to_string(),
        })
    }
}
