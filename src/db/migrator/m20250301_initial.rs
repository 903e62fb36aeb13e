use crate::entities::prelude::*;
use sea_orm_migration::prelude::*;
use sea_orm_migration::sea_orm::{EntityTrait, Schema};

#[derive(DeriveMigrationName)]
pub struct Migration;

async fn create<E: EntityTrait>(
    manager: &SchemaManager<'_>,
    schema: &Schema,
    entity: E,
) -> Result<(), DbErr> {
    manager
        .create_table(
            schema
                .create_table_from_entity(entity)
                .if_not_exists()
                .to_owned(),
        )
        .await
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let backend = manager.get_database_backend();
        let schema = Schema::new(backend);

        // Parents before children so foreign keys resolve.
        create(manager, &schema, Users).await?;
        create(manager, &schema, UserProfiles).await?;
        create(manager, &schema, GasSensors).await?;
        create(manager, &schema, GasReadings).await?;
        create(manager, &schema, GasAlerts).await?;
        create(manager, &schema, PipelineSections).await?;
        create(manager, &schema, MaintenanceSchedules).await?;
        create(manager, &schema, GasRegulators).await?;
        create(manager, &schema, EmergencyContacts).await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(EmergencyContacts).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(GasRegulators).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(MaintenanceSchedules).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(PipelineSections).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(GasAlerts).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(GasReadings).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(GasSensors).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(UserProfiles).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Users).to_owned())
            .await?;

        Ok(())
    }
}
