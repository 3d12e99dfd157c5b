pub mod artist;
pub mod withdrawal;
pub mod credit_transaction;
pub mod activity_log;
pub mod notification_outbox;

pub use artist::Entity as Artist;
pub use withdrawal::Entity as Withdrawal;
pub use credit_transaction::Entity as CreditTransaction;
pub use activity_log::Entity as ActivityLog;
pub use notification_outbox::Entity as NotificationOutbox;
