use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // ========== SENSORS ==========
        // site_id references a site owned by another service, so no FK here.
        manager
            .create_table(
                Table::create()
                    .table(Sensors::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Sensors::Id)
                            .string_len(64)
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Sensors::SiteId).string_len(64).not_null())
                    .col(ColumnDef::new(Sensors::Name).string_len(128).not_null())
                    .col(ColumnDef::new(Sensors::Unit).string_len(32).not_null())
                    .col(ColumnDef::new(Sensors::MinSafe).double().not_null())
                    .col(ColumnDef::new(Sensors::MaxSafe).double().not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_sensors_site_id")
                    .table(Sensors::Table)
                    .col(Sensors::SiteId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Sensors::Table).if_exists().to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum Sensors {
    Table,
    Id,
    SiteId,
    Name,
    Unit,
    MinSafe,
    MaxSafe,
}
