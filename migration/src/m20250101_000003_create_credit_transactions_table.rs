use sea_orm_migration::prelude::*;

use super::m20250101_000001_create_artists_table::Artists;
use super::m20250101_000002_create_withdrawals_table::Withdrawals;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.create_table(
            Table::create()
                .table(CreditTransactions::Table)
                .if_not_exists()
                .col(ColumnDef::new(CreditTransactions::Id).uuid().not_null().primary_key())
                .col(ColumnDef::new(CreditTransactions::ArtistId).uuid().not_null())
                .col(ColumnDef::new(CreditTransactions::Amount).decimal_len(20, 2).not_null())
                .col(ColumnDef::new(CreditTransactions::TransactionType).string().not_null())
                .col(ColumnDef::new(CreditTransactions::Description).text().not_null())
                .col(ColumnDef::new(CreditTransactions::WithdrawalId).uuid().null())
                .col(ColumnDef::new(CreditTransactions::BalanceAfter).decimal_len(20, 2).not_null())
                .col(ColumnDef::new(CreditTransactions::CreatedBy).uuid().not_null())
                .col(
                    ColumnDef::new(CreditTransactions::CreatedAt)
                        .timestamp_with_time_zone()
                        .not_null()
                        .default(Expr::current_timestamp())
                )
                .foreign_key(
                    ForeignKey::create()
                        .name("fk_credit_transactions_artist")
                        .from(CreditTransactions::Table, CreditTransactions::ArtistId)
                        .to(Artists::Table, Artists::Id)
                        .on_delete(ForeignKeyAction::Cascade)
                )
                .foreign_key(
                    ForeignKey::create()
                        .name("fk_credit_transactions_withdrawal")
                        .from(CreditTransactions::Table, CreditTransactions::WithdrawalId)
                        .to(Withdrawals::Table, Withdrawals::Id)
                        .on_delete(ForeignKeyAction::SetNull)
                )
                .to_owned()
        ).await?;

        manager.create_index(
            Index::create()
                .if_not_exists()
                .name("idx_credit_transactions_artist_created")
                .table(CreditTransactions::Table)
                .col(CreditTransactions::ArtistId)
                .col(CreditTransactions::CreatedAt)
                .to_owned()
        ).await?;

        manager.create_index(
            Index::create()
                .if_not_exists()
                .name("idx_credit_transactions_withdrawal")
                .table(CreditTransactions::Table)
                .col(CreditTransactions::WithdrawalId)
                .to_owned()
        ).await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(CreditTransactions::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum CreditTransactions {
    Table,
    Id,
    ArtistId,
    Amount,
    TransactionType,
    Description,
    WithdrawalId,
    BalanceAfter,
    CreatedBy,
    CreatedAt,
}
