use sea_orm_migration::prelude::*;

use super::m20250101_000001_create_artists_table::Artists;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.create_table(
            Table::create()
                .table(Withdrawals::Table)
                .if_not_exists()
                .col(ColumnDef::new(Withdrawals::Id).uuid().not_null().primary_key())
                .col(ColumnDef::new(Withdrawals::ArtistId).uuid().not_null())
                .col(ColumnDef::new(Withdrawals::UserId).uuid().not_null())
                .col(ColumnDef::new(Withdrawals::Amount).decimal_len(20, 2).not_null())
                .col(ColumnDef::new(Withdrawals::NairaAmount).decimal_len(20, 2).not_null())
                .col(
                    ColumnDef::new(Withdrawals::CreditDeduction)
                        .decimal_len(20, 2)
                        .not_null()
                        .default(0)
                )
                .col(ColumnDef::new(Withdrawals::FinalAmount).decimal_len(20, 2).not_null())
                .col(ColumnDef::new(Withdrawals::FinalNairaAmount).decimal_len(20, 2).not_null())
                .col(ColumnDef::new(Withdrawals::BankAccountName).string().not_null())
                .col(ColumnDef::new(Withdrawals::BankAccountNumber).string().not_null())
                .col(ColumnDef::new(Withdrawals::BankName).string().not_null())
                .col(ColumnDef::new(Withdrawals::Status).string().not_null().default("pending"))
                .col(ColumnDef::new(Withdrawals::AdminNote).text().null())
                .col(
                    ColumnDef::new(Withdrawals::CreatedAt)
                        .timestamp_with_time_zone()
                        .not_null()
                        .default(Expr::current_timestamp())
                )
                .col(
                    ColumnDef::new(Withdrawals::UpdatedAt)
                        .timestamp_with_time_zone()
                        .not_null()
                        .default(Expr::current_timestamp())
                )
                .col(ColumnDef::new(Withdrawals::ProcessedAt).timestamp_with_time_zone().null())
                .foreign_key(
                    ForeignKey::create()
                        .name("fk_withdrawals_artist")
                        .from(Withdrawals::Table, Withdrawals::ArtistId)
                        .to(Artists::Table, Artists::Id)
                        .on_delete(ForeignKeyAction::Cascade)
                )
                .to_owned()
        ).await?;

        manager.create_index(
            Index::create()
                .if_not_exists()
                .name("idx_withdrawals_artist_created")
                .table(Withdrawals::Table)
                .col(Withdrawals::ArtistId)
                .col(Withdrawals::CreatedAt)
                .to_owned()
        ).await?;

        manager.create_index(
            Index::create()
                .if_not_exists()
                .name("idx_withdrawals_status")
                .table(Withdrawals::Table)
                .col(Withdrawals::Status)
                .to_owned()
        ).await?;

        // At most one outstanding request per artist, enforced by the database.
        manager
            .get_connection()
            .execute_unprepared(
                "CREATE UNIQUE INDEX IF NOT EXISTS idx_withdrawals_one_outstanding \
                 ON withdrawals (artist_id) \
                 WHERE status IN ('pending', 'approved', 'processing')"
            ).await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Withdrawals::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
pub enum Withdrawals {
    Table,
    Id,
    ArtistId,
    UserId,
    Amount,
    NairaAmount,
    CreditDeduction,
    FinalAmount,
    FinalNairaAmount,
    BankAccountName,
    BankAccountNumber,
    BankName,
    Status,
    AdminNote,
    CreatedAt,
    UpdatedAt,
    ProcessedAt,
}
