use async_trait::async_trait;
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::credits::CreditChange;
use crate::db::entity::{ activity_log, artist, credit_transaction, notification_outbox, withdrawal };
use crate::enums::{ ActivityType, CreditTransactionType, NotificationEvent, WithdrawalStatus };
use crate::error::Result;
use crate::lifecycle::{ StatusChange, WithdrawalRequest };

/// Activity log entry to append.
#[derive(Debug, Clone, PartialEq)]
pub struct NewActivity {
    pub artist_id: Uuid,
    pub activity_type: ActivityType,
    pub title: String,
    pub description: String,
    pub metadata: serde_json::Value,
}

/// Credit transaction to append.
#[derive(Debug, Clone, PartialEq)]
pub struct NewCreditTransaction {
    pub artist_id: Uuid,
    pub amount: Decimal,
    pub transaction_type: CreditTransactionType,
    pub description: String,
    pub withdrawal_id: Option<Uuid>,
    pub balance_after: Decimal,
    pub created_by: Uuid,
}

/// Outbox row to enqueue alongside a withdrawal state change.
#[derive(Debug, Clone, PartialEq)]
pub struct NewNotification {
    pub withdrawal_id: Uuid,
    pub recipient: String,
    pub event: NotificationEvent,
    pub amount: Decimal,
    pub naira_amount: Decimal,
}

/// Persistent record store behind the payout services.
///
/// Every mutating method is atomic: either all of its rows are written or none are. Mutations
/// re-check their preconditions against the stored state, so callers may validate up front
/// without holding any lock.
#[async_trait]
pub trait LedgerStore: Send + Sync {
    async fn get_artist(&self, artist_id: Uuid) -> Result<artist::Model>;

    async fn get_withdrawal(&self, withdrawal_id: Uuid) -> Result<withdrawal::Model>;

    /// Withdrawals of an artist, newest first. An empty `statuses` slice means any status.
    async fn list_withdrawals(
        &self,
        artist_id: Uuid,
        statuses: &[WithdrawalStatus]
    ) -> Result<Vec<withdrawal::Model>>;

    /// Inserts a pending withdrawal with its activity entry and `requested` notification.
    async fn submit_withdrawal(&self, request: WithdrawalRequest) -> Result<withdrawal::Model>;

    /// Moves a withdrawal to a new status, applying balance side effects of approval or
    /// rejection-after-approval.
    async fn transition_withdrawal(&self, change: StatusChange) -> Result<withdrawal::Model>;

    async fn change_credit(&self, change: CreditChange) -> Result<credit_transaction::Model>;

    async fn list_credit_transactions(
        &self,
        artist_id: Uuid
    ) -> Result<Vec<credit_transaction::Model>>;

    /// Newest first.
    async fn list_activity(&self, artist_id: Uuid, limit: u64) -> Result<Vec<activity_log::Model>>;

    /// Oldest first.
    async fn pending_notifications(&self, limit: u64) -> Result<Vec<notification_outbox::Model>>;

    async fn mark_notification_sent(&self, notification_id: Uuid) -> Result<()>;

    /// Records a failed attempt. With `give_up` the row leaves the pending queue for good.
    async fn mark_notification_failed(
        &self,
        notification_id: Uuid,
        error: &str,
        give_up: bool
    ) -> Result<()>;
}
