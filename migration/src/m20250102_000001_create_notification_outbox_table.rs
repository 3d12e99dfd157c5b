use sea_orm_migration::prelude::*;

use super::m20250101_000002_create_withdrawals_table::Withdrawals;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.create_table(
            Table::create()
                .table(NotificationOutbox::Table)
                .if_not_exists()
                .col(ColumnDef::new(NotificationOutbox::Id).uuid().not_null().primary_key())
                .col(ColumnDef::new(NotificationOutbox::WithdrawalId).uuid().not_null())
                .col(ColumnDef::new(NotificationOutbox::Recipient).string().not_null())
                .col(ColumnDef::new(NotificationOutbox::Event).string().not_null())
                .col(ColumnDef::new(NotificationOutbox::Amount).decimal_len(20, 2).not_null())
                .col(ColumnDef::new(NotificationOutbox::NairaAmount).decimal_len(20, 2).not_null())
                .col(
                    ColumnDef::new(NotificationOutbox::Status)
                        .string()
                        .not_null()
                        .default("pending")
                )
                .col(ColumnDef::new(NotificationOutbox::Attempts).integer().not_null().default(0))
                .col(ColumnDef::new(NotificationOutbox::LastError).text().null())
                .col(
                    ColumnDef::new(NotificationOutbox::CreatedAt)
                        .timestamp_with_time_zone()
                        .not_null()
                        .default(Expr::current_timestamp())
                )
                .col(
                    ColumnDef::new(NotificationOutbox::UpdatedAt)
                        .timestamp_with_time_zone()
                        .not_null()
                        .default(Expr::current_timestamp())
                )
                .col(ColumnDef::new(NotificationOutbox::SentAt).timestamp_with_time_zone().null())
                .foreign_key(
                    ForeignKey::create()
                        .name("fk_notification_outbox_withdrawal")
                        .from(NotificationOutbox::Table, NotificationOutbox::WithdrawalId)
                        .to(Withdrawals::Table, Withdrawals::Id)
                        .on_delete(ForeignKeyAction::Cascade)
                )
                .to_owned()
        ).await?;

        // Dispatcher polls pending rows oldest first
        manager.create_index(
            Index::create()
                .if_not_exists()
                .name("idx_notification_outbox_status_created")
                .table(NotificationOutbox::Table)
                .col(NotificationOutbox::Status)
                .col(NotificationOutbox::CreatedAt)
                .to_owned()
        ).await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(NotificationOutbox::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum NotificationOutbox {
    Table,
    Id,
    WithdrawalId,
    Recipient,
    Event,
    Amount,
    NairaAmount,
    Status,
    Attempts,
    LastError,
    CreatedAt,
    UpdatedAt,
    SentAt,
}
