use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.create_table(
            Table::create()
                .table(Artists::Table)
                .if_not_exists()
                .col(ColumnDef::new(Artists::Id).uuid().not_null().primary_key())
                .col(ColumnDef::new(Artists::Name).string().not_null())
                .col(ColumnDef::new(Artists::Email).string().not_null())
                .col(
                    ColumnDef::new(Artists::AvailableBalance)
                        .decimal_len(20, 2)
                        .not_null()
                        .default(0)
                )
                .col(
                    ColumnDef::new(Artists::CreditBalance)
                        .decimal_len(20, 2)
                        .not_null()
                        .default(0)
                )
                .col(
                    ColumnDef::new(Artists::CreatedAt)
                        .timestamp_with_time_zone()
                        .not_null()
                        .default(Expr::current_timestamp())
                )
                .col(
                    ColumnDef::new(Artists::UpdatedAt)
                        .timestamp_with_time_zone()
                        .not_null()
                        .default(Expr::current_timestamp())
                )
                .check(Expr::col(Artists::AvailableBalance).gte(0))
                .check(Expr::col(Artists::CreditBalance).gte(0))
                .to_owned()
        ).await?;

        manager.create_index(
            Index::create()
                .if_not_exists()
                .name("idx_artists_email")
                .table(Artists::Table)
                .col(Artists::Email)
                .to_owned()
        ).await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Artists::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
pub enum Artists {
    Table,
    Id,
    Name,
    Email,
    AvailableBalance,
    CreditBalance,
    CreatedAt,
    UpdatedAt,
}
