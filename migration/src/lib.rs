pub use sea_orm_migration::prelude::*;

mod m20250101_000001_create_artists_table;
mod m20250101_000002_create_withdrawals_table;
mod m20250101_000003_create_credit_transactions_table;
mod m20250101_000004_create_activity_logs_table;
mod m20250102_000001_create_notification_outbox_table;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250101_000001_create_artists_table::Migration),
            Box::new(m20250101_000002_create_withdrawals_table::Migration),
            Box::new(m20250101_000003_create_credit_transactions_table::Migration),
            Box::new(m20250101_000004_create_activity_logs_table::Migration),
            Box::new(m20250102_000001_create_notification_outbox_table::Migration)
        ]
    }
}
