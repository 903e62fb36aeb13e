//! `SeaORM` implementation of the `RegulatorService` trait.

use async_trait::async_trait;
use tracing::info;

use crate::db::{RegulatorChanges, Store};
use crate::services::regulator_service::{
    RegulatorAction, RegulatorDto, RegulatorError, RegulatorService,
};

pub struct SeaOrmRegulatorService {
    store: Store,
}

impl SeaOrmRegulatorService {
    #[must_use]
    pub const fn new(store: Store) -> Self {
        Self { store }
    }
}

#[async_trait]
impl RegulatorService for SeaOrmRegulatorService {
    async fn state(&self, user_id: i32) -> Result<RegulatorDto, RegulatorError> {
        let regulator = self.store.get_or_create_regulator(user_id).await?;
        Ok(RegulatorDto::from(regulator))
    }

    async fn control(
        &self,
        user_id: i32,
        action: RegulatorAction,
    ) -> Result<RegulatorDto, RegulatorError> {
        let repo = self.store.regulator_repo();
        let current = repo.get_or_create(user_id).await?;

        let changes = match action {
            RegulatorAction::TogglePower => RegulatorChanges {
                is_on: Some(!current.is_on),
                ..RegulatorChanges::default()
            },
            RegulatorAction::ToggleAuto => RegulatorChanges {
                auto_mode: Some(!current.auto_mode),
                ..RegulatorChanges::default()
            },
            RegulatorAction::UpdateSettings(changes) => changes,
        };

        let updated = repo.apply(user_id, changes).await?;
        info!(user_id, action = action.name(), "Regulator updated");

        Ok(RegulatorDto::from(updated))
    }
}
