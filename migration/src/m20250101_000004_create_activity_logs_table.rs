use sea_orm_migration::prelude::*;

use super::m20250101_000001_create_artists_table::Artists;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.create_table(
            Table::create()
                .table(ActivityLogs::Table)
                .if_not_exists()
                .col(ColumnDef::new(ActivityLogs::Id).uuid().not_null().primary_key())
                .col(ColumnDef::new(ActivityLogs::ArtistId).uuid().not_null())
                .col(ColumnDef::new(ActivityLogs::ActivityType).string().not_null())
                .col(ColumnDef::new(ActivityLogs::Title).string().not_null())
                .col(ColumnDef::new(ActivityLogs::Description).text().not_null())
                .col(ColumnDef::new(ActivityLogs::Metadata).json_binary().not_null())
                .col(
                    ColumnDef::new(ActivityLogs::CreatedAt)
                        .timestamp_with_time_zone()
                        .not_null()
                        .default(Expr::current_timestamp())
                )
                .foreign_key(
                    ForeignKey::create()
                        .name("fk_activity_logs_artist")
                        .from(ActivityLogs::Table, ActivityLogs::ArtistId)
                        .to(Artists::Table, Artists::Id)
                        .on_delete(ForeignKeyAction::Cascade)
                )
                .to_owned()
        ).await?;

        manager.create_index(
            Index::create()
                .if_not_exists()
                .name("idx_activity_logs_artist_created")
                .table(ActivityLogs::Table)
                .col(ActivityLogs::ArtistId)
                .col(ActivityLogs::CreatedAt)
                .to_owned()
        ).await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(ActivityLogs::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum ActivityLogs {
    Table,
    Id,
    ArtistId,
    ActivityType,
    Title,
    Description,
    Metadata,
    CreatedAt,
}
