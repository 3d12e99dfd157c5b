use async_trait::async_trait;
use chrono::{ DateTime, Utc };
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait,
    ColumnTrait,
    DatabaseConnection,
    DatabaseTransaction,
    DbErr,
    EntityTrait,
    QueryFilter,
    QueryOrder,
    QuerySelect,
    Set,
    SqlErr,
    TransactionTrait,
};
use uuid::Uuid;

use crate::credits::{ self, CreditChange };
use crate::db::entity::{ activity_log, artist, credit_transaction, notification_outbox, withdrawal };
use crate::db::store::{ LedgerStore, NewActivity, NewCreditTransaction, NewNotification };
use crate::enums::{ DeliveryStatus, WithdrawalStatus };
use crate::error::{ AppError, Result };
use crate::ledger::Settlement;
use crate::lifecycle::{ self, StatusChange, WithdrawalRequest };

/// PostgreSQL-backed [`LedgerStore`].
///
/// Mutations run in a transaction that first takes a row lock on the artist
/// (`SELECT ... FOR UPDATE`), so concurrent submissions and credit changes for one artist are
/// serialized. The partial unique index on outstanding withdrawals backs this up.
pub struct LedgerRepository {
    db: DatabaseConnection,
}

impl LedgerRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    async fn lock_artist(txn: &DatabaseTransaction, artist_id: Uuid) -> Result<artist::Model> {
        artist::Entity
            ::find_by_id(artist_id)
            .lock_exclusive()
            .one(txn).await?
            .ok_or_else(|| AppError::NotFound("Artist".to_string()))
    }

    async fn save_balances(
        txn: &DatabaseTransaction,
        artist: artist::Model,
        settlement: Settlement,
        now: DateTime<Utc>
    ) -> Result<()> {
        let mut active: artist::ActiveModel = artist.into();
        active.available_balance = Set(settlement.available_balance);
        active.credit_balance = Set(settlement.credit_balance);
        active.updated_at = Set(now);
        active.update(txn).await?;
        Ok(())
    }

    async fn insert_activity(
        txn: &DatabaseTransaction,
        activity: NewActivity,
        now: DateTime<Utc>
    ) -> Result<()> {
        let entry = activity_log::ActiveModel {
            id: Set(Uuid::new_v4()),
            artist_id: Set(activity.artist_id),
            activity_type: Set(activity.activity_type.to_string()),
            title: Set(activity.title),
            description: Set(activity.description),
            metadata: Set(activity.metadata),
            created_at: Set(now),
        };

        entry.insert(txn).await?;
        Ok(())
    }

    async fn insert_credit_transaction(
        txn: &DatabaseTransaction,
        entry: NewCreditTransaction,
        now: DateTime<Utc>
    ) -> Result<credit_transaction::Model> {
        let model = credit_transaction::ActiveModel {
            id: Set(Uuid::new_v4()),
            artist_id: Set(entry.artist_id),
            amount: Set(entry.amount),
            transaction_type: Set(entry.transaction_type.to_string()),
            description: Set(entry.description),
            withdrawal_id: Set(entry.withdrawal_id),
            balance_after: Set(entry.balance_after),
            created_by: Set(entry.created_by),
            created_at: Set(now),
        };

        Ok(model.insert(txn).await?)
    }

    async fn enqueue_notification(
        txn: &DatabaseTransaction,
        notification: NewNotification,
        now: DateTime<Utc>
    ) -> Result<()> {
        let row = notification_outbox::ActiveModel {
            id: Set(Uuid::new_v4()),
            withdrawal_id: Set(notification.withdrawal_id),
            recipient: Set(notification.recipient),
            event: Set(notification.event.to_string()),
            amount: Set(notification.amount),
            naira_amount: Set(notification.naira_amount),
            status: Set(DeliveryStatus::Pending.to_string()),
            attempts: Set(0),
            last_error: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
            sent_at: Set(None),
        };

        row.insert(txn).await?;
        Ok(())
    }

    async fn credit_applied(txn: &DatabaseTransaction, withdrawal_id: Uuid) -> Result<Decimal> {
        let entries = credit_transaction::Entity
            ::find()
            .filter(credit_transaction::Column::WithdrawalId.eq(withdrawal_id))
            .all(txn).await?;

        Ok(lifecycle::net_credit_applied(&entries))
    }

    async fn find_notification(&self, notification_id: Uuid) -> Result<notification_outbox::Model> {
        notification_outbox::Entity
            ::find_by_id(notification_id)
            .one(&self.db).await?
            .ok_or_else(|| AppError::NotFound("Notification".to_string()))
    }
}

fn outstanding_statuses() -> Vec<&'static str> {
    WithdrawalStatus::outstanding()
        .iter()
        .map(|s| s.as_str())
        .collect()
}

const OUTSTANDING_INDEX: &str = "idx_withdrawals_one_outstanding";

/// A second outstanding withdrawal trips [`OUTSTANDING_INDEX`]. Other errors pass through.
fn map_outstanding_conflict(err: DbErr) -> AppError {
    let names_index = match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(message)) => message.contains(OUTSTANDING_INDEX),
        _ => err.to_string().contains(OUTSTANDING_INDEX),
    };

    if names_index { AppError::PendingRequestExists } else { AppError::Database(err) }
}

#[async_trait]
impl LedgerStore for LedgerRepository {
    async fn get_artist(&self, artist_id: Uuid) -> Result<artist::Model> {
        artist::Entity
            ::find_by_id(artist_id)
            .one(&self.db).await?
            .ok_or_else(|| AppError::NotFound("Artist".to_string()))
    }

    async fn get_withdrawal(&self, withdrawal_id: Uuid) -> Result<withdrawal::Model> {
        withdrawal::Entity
            ::find_by_id(withdrawal_id)
            .one(&self.db).await?
            .ok_or_else(|| AppError::NotFound("Withdrawal".to_string()))
    }

    async fn list_withdrawals(
        &self,
        artist_id: Uuid,
        statuses: &[WithdrawalStatus]
    ) -> Result<Vec<withdrawal::Model>> {
        let mut query = withdrawal::Entity
            ::find()
            .filter(withdrawal::Column::ArtistId.eq(artist_id))
            .order_by_desc(withdrawal::Column::CreatedAt);

        if !statuses.is_empty() {
            query = query.filter(
                withdrawal::Column::Status.is_in(statuses.iter().map(|s| s.as_str()))
            );
        }

        Ok(query.all(&self.db).await?)
    }

    async fn submit_withdrawal(&self, request: WithdrawalRequest) -> Result<withdrawal::Model> {
        let txn = self.db.begin().await?;

        let artist = Self::lock_artist(&txn, request.artist_id).await?;
        let outstanding = withdrawal::Entity
            ::find()
            .filter(withdrawal::Column::ArtistId.eq(artist.id))
            .filter(withdrawal::Column::Status.is_in(outstanding_statuses()))
            .all(&txn).await?;

        let now = Utc::now();
        let plan = lifecycle::plan_submission(
            &artist,
            &outstanding,
            &request,
            Uuid::new_v4(),
            now
        )?;

        let w = plan.withdrawal;
        let row = withdrawal::ActiveModel {
            id: Set(w.id),
            artist_id: Set(w.artist_id),
            user_id: Set(w.user_id),
            amount: Set(w.amount),
            naira_amount: Set(w.naira_amount),
            credit_deduction: Set(w.credit_deduction),
            final_amount: Set(w.final_amount),
            final_naira_amount: Set(w.final_naira_amount),
            bank_account_name: Set(w.bank_account_name),
            bank_account_number: Set(w.bank_account_number),
            bank_name: Set(w.bank_name),
            status: Set(w.status),
            admin_note: Set(w.admin_note),
            created_at: Set(w.created_at),
            updated_at: Set(w.updated_at),
            processed_at: Set(w.processed_at),
        };

        let inserted = row.insert(&txn).await.map_err(map_outstanding_conflict)?;

        Self::insert_activity(&txn, plan.activity, now).await?;
        Self::enqueue_notification(&txn, plan.notification, now).await?;

        txn.commit().await?;

        tracing::info!(
            "Withdrawal {} requested by artist {}: amount={} credit_deduction={} final={}",
            inserted.id,
            inserted.artist_id,
            inserted.amount,
            inserted.credit_deduction,
            inserted.final_amount
        );

        Ok(inserted)
    }

    async fn transition_withdrawal(&self, change: StatusChange) -> Result<withdrawal::Model> {
        let txn = self.db.begin().await?;

        let withdrawal = withdrawal::Entity
            ::find_by_id(change.withdrawal_id)
            .lock_exclusive()
            .one(&txn).await?
            .ok_or_else(|| AppError::NotFound("Withdrawal".to_string()))?;
        let artist = Self::lock_artist(&txn, withdrawal.artist_id).await?;
        let credit_applied = Self::credit_applied(&txn, withdrawal.id).await?;

        let now = Utc::now();
        let plan = lifecycle::plan_transition(&withdrawal, &artist, &change, credit_applied, now)?;

        if let Some(settlement) = plan.settlement {
            Self::save_balances(&txn, artist, settlement, now).await?;
        }
        if let Some(entry) = plan.credit_entry {
            Self::insert_credit_transaction(&txn, entry, now).await?;
        }

        let mut active: withdrawal::ActiveModel = withdrawal.into();
        active.status = Set(plan.to.to_string());
        active.processed_at = Set(plan.processed_at);
        if plan.admin_note.is_some() {
            active.admin_note = Set(plan.admin_note);
        }
        active.updated_at = Set(now);
        let updated = active.update(&txn).await?;

        Self::insert_activity(&txn, plan.activity, now).await?;
        Self::enqueue_notification(&txn, plan.notification, now).await?;

        txn.commit().await?;

        tracing::info!("Withdrawal {} moved from {} to {}", updated.id, plan.from, plan.to);

        Ok(updated)
    }

    async fn change_credit(&self, change: CreditChange) -> Result<credit_transaction::Model> {
        let txn = self.db.begin().await?;

        let artist = Self::lock_artist(&txn, change.artist_id).await?;
        let plan = credits::plan_credit_change(&artist, &change)?;
        let now = Utc::now();

        let mut active: artist::ActiveModel = artist.into();
        active.credit_balance = Set(plan.credit_balance);
        active.updated_at = Set(now);
        active.update(&txn).await?;

        let entry = Self::insert_credit_transaction(&txn, plan.entry, now).await?;
        Self::insert_activity(&txn, plan.activity, now).await?;

        txn.commit().await?;

        tracing::info!(
            "Credit balance of artist {} changed by {} {} (now {})",
            entry.artist_id,
            entry.transaction_type,
            entry.amount,
            entry.balance_after
        );

        Ok(entry)
    }

    async fn list_credit_transactions(
        &self,
        artist_id: Uuid
    ) -> Result<Vec<credit_transaction::Model>> {
        let entries = credit_transaction::Entity
            ::find()
            .filter(credit_transaction::Column::ArtistId.eq(artist_id))
            .order_by_desc(credit_transaction::Column::CreatedAt)
            .all(&self.db).await?;

        Ok(entries)
    }

    async fn list_activity(&self, artist_id: Uuid, limit: u64) -> Result<Vec<activity_log::Model>> {
        let entries = activity_log::Entity
            ::find()
            .filter(activity_log::Column::ArtistId.eq(artist_id))
            .order_by_desc(activity_log::Column::CreatedAt)
            .limit(limit)
            .all(&self.db).await?;

        Ok(entries)
    }

    async fn pending_notifications(&self, limit: u64) -> Result<Vec<notification_outbox::Model>> {
        let rows = notification_outbox::Entity
            ::find()
            .filter(notification_outbox::Column::Status.eq(DeliveryStatus::Pending.as_str()))
            .order_by_asc(notification_outbox::Column::CreatedAt)
            .limit(limit)
            .all(&self.db).await?;

        Ok(rows)
    }

    async fn mark_notification_sent(&self, notification_id: Uuid) -> Result<()> {
        let row = self.find_notification(notification_id).await?;
        let now = Utc::now();
        let attempts = row.attempts + 1;

        let mut active: notification_outbox::ActiveModel = row.into();
        active.status = Set(DeliveryStatus::Sent.to_string());
        active.attempts = Set(attempts);
        active.last_error = Set(None);
        active.sent_at = Set(Some(now));
        active.updated_at = Set(now);
        active.update(&self.db).await?;

        Ok(())
    }

    async fn mark_notification_failed(
        &self,
        notification_id: Uuid,
        error: &str,
        give_up: bool
    ) -> Result<()> {
        let row = self.find_notification(notification_id).await?;
        let attempts = row.attempts + 1;
        let status = if give_up { DeliveryStatus::Failed } else { DeliveryStatus::Pending };

        let mut active: notification_outbox::ActiveModel = row.into();
        active.status = Set(status.to_string());
        active.attempts = Set(attempts);
        active.last_error = Set(Some(error.to_string()));
        active.updated_at = Set(Utc::now());
        active.update(&self.db).await?;

        Ok(())
    }
}
