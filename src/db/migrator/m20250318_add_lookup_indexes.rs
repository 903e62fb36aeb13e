use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_gas_readings_sensor_timestamp")
                    .table(GasReadings::Table)
                    .col(GasReadings::SensorId)
                    .col(GasReadings::Timestamp)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_gas_alerts_user_created")
                    .table(GasAlerts::Table)
                    .col(GasAlerts::UserId)
                    .col(GasAlerts::CreatedAt)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_users_email")
                    .table(Users::Table)
                    .col(Users::Email)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let conn = manager.get_connection();

        conn.execute_unprepared("DROP INDEX IF EXISTS idx_users_email")
            .await?;
        conn.execute_unprepared("DROP INDEX IF EXISTS idx_gas_alerts_user_created")
            .await?;
        conn.execute_unprepared("DROP INDEX IF EXISTS idx_gas_readings_sensor_timestamp")
            .await?;

        Ok(())
    }
}

#[derive(DeriveIden)]
enum GasReadings {
    Table,
    SensorId,
    Timestamp,
}

#[derive(DeriveIden)]
enum GasAlerts {
    Table,
    UserId,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Users {
    Table,
    Email,
}
