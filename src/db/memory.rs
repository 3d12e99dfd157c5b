//! In-memory [`LedgerStore`] for tests. One mutex over all tables makes every method atomic.
//!
//! Money is rounded to two places on write, like the `NUMERIC(20, 2)` columns.

use std::collections::HashMap;
use std::sync::atomic::{ AtomicBool, AtomicUsize, Ordering };
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{ DateTime, Utc };
use rust_decimal::{ Decimal, RoundingStrategy };
use uuid::Uuid;

use crate::credits::{ self, CreditChange };
use crate::db::entity::{ activity_log, artist, credit_transaction, notification_outbox, withdrawal };
use crate::db::store::{ LedgerStore, NewActivity, NewCreditTransaction, NewNotification };
use crate::enums::{ DeliveryStatus, WithdrawalStatus };
use crate::error::{ AppError, Result };
use crate::ledger::CENT_PLACES;
use crate::lifecycle::{ self, StatusChange, WithdrawalRequest };

/// What a two-place money column keeps of `amount`.
fn column(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(CENT_PLACES, RoundingStrategy::MidpointAwayFromZero)
}

#[derive(Default)]
struct Tables {
    artists: HashMap<Uuid, artist::Model>,
    withdrawals: Vec<withdrawal::Model>,
    credit_transactions: Vec<credit_transaction::Model>,
    activity: Vec<activity_log::Model>,
    outbox: Vec<notification_outbox::Model>,
}

impl Tables {
    fn push_activity(&mut self, activity: NewActivity, now: DateTime<Utc>) {
        self.activity.push(activity_log::Model {
            id: Uuid::new_v4(),
            artist_id: activity.artist_id,
            activity_type: activity.activity_type.to_string(),
            title: activity.title,
            description: activity.description,
            metadata: activity.metadata,
            created_at: now,
        });
    }

    fn push_credit(&mut self, entry: NewCreditTransaction, now: DateTime<Utc>) -> credit_transaction::Model {
        let model = credit_transaction::Model {
            id: Uuid::new_v4(),
            artist_id: entry.artist_id,
            amount: column(entry.amount),
            transaction_type: entry.transaction_type.to_string(),
            description: entry.description,
            withdrawal_id: entry.withdrawal_id,
            balance_after: column(entry.balance_after),
            created_by: entry.created_by,
            created_at: now,
        };
        self.credit_transactions.push(model.clone());
        model
    }

    fn push_notification(&mut self, notification: NewNotification, now: DateTime<Utc>) {
        self.outbox.push(notification_outbox::Model {
            id: Uuid::new_v4(),
            withdrawal_id: notification.withdrawal_id,
            recipient: notification.recipient,
            event: notification.event.to_string(),
            amount: column(notification.amount),
            naira_amount: column(notification.naira_amount),
            status: DeliveryStatus::Pending.to_string(),
            attempts: 0,
            last_error: None,
            created_at: now,
            updated_at: now,
            sent_at: None,
        });
    }

    fn artist(&self, artist_id: Uuid) -> Result<artist::Model> {
        self.artists
            .get(&artist_id)
            .cloned()
            .ok_or_else(|| AppError::NotFound("Artist".to_string()))
    }

    fn notification_mut(&mut self, id: Uuid) -> Result<&mut notification_outbox::Model> {
        self.outbox
            .iter_mut()
            .find(|n| n.id == id)
            .ok_or_else(|| AppError::NotFound("Notification".to_string()))
    }
}

#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
    writes: AtomicUsize,
    fail_writes: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_artist(&self, available_balance: Decimal, credit_balance: Decimal) -> artist::Model {
        let now = Utc::now();
        let artist = artist::Model {
            id: Uuid::new_v4(),
            name: "Ada Obi".to_string(),
            email: "ada@example.com".to_string(),
            available_balance,
            credit_balance,
            created_at: now,
            updated_at: now,
        };
        self.lock().artists.insert(artist.id, artist.clone());
        artist
    }

    /// Stores a withdrawal row as-is, bypassing the submission rules.
    pub fn seed_withdrawal(&self, withdrawal: withdrawal::Model) {
        self.lock().withdrawals.push(withdrawal);
    }

    /// Makes every following mutation fail like a lost database connection.
    pub fn fail_writes(&self) {
        self.fail_writes.store(true, Ordering::SeqCst);
    }

    /// Number of committed mutations.
    pub fn writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    pub fn artist(&self, artist_id: Uuid) -> artist::Model {
        self.lock().artists[&artist_id].clone()
    }

    pub fn outbox(&self) -> Vec<notification_outbox::Model> {
        self.lock().outbox.clone()
    }

    pub fn activity(&self) -> Vec<activity_log::Model> {
        self.lock().activity.clone()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Tables> {
        self.tables.lock().expect("memory store poisoned")
    }

    fn begin_write(&self) -> Result<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(AppError::Database(sea_orm::DbErr::Custom("connection closed".into())));
        }
        Ok(())
    }

    fn commit(&self) {
        self.writes.fetch_add(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl LedgerStore for MemoryStore {
    async fn get_artist(&self, artist_id: Uuid) -> Result<artist::Model> {
        self.lock().artist(artist_id)
    }

    async fn get_withdrawal(&self, withdrawal_id: Uuid) -> Result<withdrawal::Model> {
        self.lock()
            .withdrawals.iter()
            .find(|w| w.id == withdrawal_id)
            .cloned()
            .ok_or_else(|| AppError::NotFound("Withdrawal".to_string()))
    }

    async fn list_withdrawals(
        &self,
        artist_id: Uuid,
        statuses: &[WithdrawalStatus]
    ) -> Result<Vec<withdrawal::Model>> {
        let mut rows: Vec<_> = self
            .lock()
            .withdrawals.iter()
            .filter(|w| w.artist_id == artist_id)
            .filter(|w| {
                statuses.is_empty() || statuses.iter().any(|s| s.as_str() == w.status)
            })
            .cloned()
            .collect();
        rows.reverse();
        Ok(rows)
    }

    async fn submit_withdrawal(&self, request: WithdrawalRequest) -> Result<withdrawal::Model> {
        self.begin_write()?;
        let mut tables = self.lock();

        let artist = tables.artist(request.artist_id)?;
        let now = Utc::now();
        let plan = lifecycle::plan_submission(
            &artist,
            &tables.withdrawals,
            &request,
            Uuid::new_v4(),
            now
        )?;

        let mut stored = plan.withdrawal;
        stored.amount = column(stored.amount);
        stored.naira_amount = column(stored.naira_amount);
        stored.credit_deduction = column(stored.credit_deduction);
        stored.final_amount = column(stored.final_amount);
        stored.final_naira_amount = column(stored.final_naira_amount);

        tables.withdrawals.push(stored.clone());
        tables.push_activity(plan.activity, now);
        tables.push_notification(plan.notification, now);
        self.commit();

        Ok(stored)
    }

    async fn transition_withdrawal(&self, change: StatusChange) -> Result<withdrawal::Model> {
        self.begin_write()?;
        let mut tables = self.lock();

        let withdrawal = tables.withdrawals
            .iter()
            .find(|w| w.id == change.withdrawal_id)
            .cloned()
            .ok_or_else(|| AppError::NotFound("Withdrawal".to_string()))?;
        let artist = tables.artist(withdrawal.artist_id)?;
        let related: Vec<_> = tables.credit_transactions
            .iter()
            .filter(|c| c.withdrawal_id == Some(withdrawal.id))
            .cloned()
            .collect();

        let now = Utc::now();
        let plan = lifecycle::plan_transition(
            &withdrawal,
            &artist,
            &change,
            lifecycle::net_credit_applied(&related),
            now
        )?;

        if let Some(settlement) = plan.settlement {
            let stored = tables.artists.get_mut(&artist.id).expect("artist checked above");
            stored.available_balance = column(settlement.available_balance);
            stored.credit_balance = column(settlement.credit_balance);
            stored.updated_at = now;
        }
        if let Some(entry) = plan.credit_entry {
            tables.push_credit(entry, now);
        }

        let stored = tables.withdrawals
            .iter_mut()
            .find(|w| w.id == withdrawal.id)
            .expect("withdrawal checked above");
        stored.status = plan.to.to_string();
        stored.processed_at = plan.processed_at;
        if plan.admin_note.is_some() {
            stored.admin_note = plan.admin_note;
        }
        stored.updated_at = now;
        let updated = stored.clone();

        tables.push_activity(plan.activity, now);
        tables.push_notification(plan.notification, now);
        self.commit();

        Ok(updated)
    }

    async fn change_credit(&self, change: CreditChange) -> Result<credit_transaction::Model> {
        self.begin_write()?;
        let mut tables = self.lock();

        let artist = tables.artist(change.artist_id)?;
        let plan = credits::plan_credit_change(&artist, &change)?;
        let now = Utc::now();

        let stored = tables.artists.get_mut(&artist.id).expect("artist checked above");
        stored.credit_balance = column(plan.credit_balance);
        stored.updated_at = now;

        let entry = tables.push_credit(plan.entry, now);
        tables.push_activity(plan.activity, now);
        self.commit();

        Ok(entry)
    }

    async fn list_credit_transactions(
        &self,
        artist_id: Uuid
    ) -> Result<Vec<credit_transaction::Model>> {
        let mut rows: Vec<_> = self
            .lock()
            .credit_transactions.iter()
            .filter(|c| c.artist_id == artist_id)
            .cloned()
            .collect();
        rows.reverse();
        Ok(rows)
    }

    async fn list_activity(&self, artist_id: Uuid, limit: u64) -> Result<Vec<activity_log::Model>> {
        Ok(
            self
                .lock()
                .activity.iter()
                .rev()
                .filter(|a| a.artist_id == artist_id)
                .take(limit as usize)
                .cloned()
                .collect()
        )
    }

    async fn pending_notifications(&self, limit: u64) -> Result<Vec<notification_outbox::Model>> {
        Ok(
            self
                .lock()
                .outbox.iter()
                .filter(|n| n.status == DeliveryStatus::Pending.as_str())
                .take(limit as usize)
                .cloned()
                .collect()
        )
    }

    async fn mark_notification_sent(&self, notification_id: Uuid) -> Result<()> {
        self.begin_write()?;
        let mut tables = self.lock();
        let row = tables.notification_mut(notification_id)?;
        let now = Utc::now();

        row.status = DeliveryStatus::Sent.to_string();
        row.attempts += 1;
        row.last_error = None;
        row.sent_at = Some(now);
        row.updated_at = now;
        self.commit();
        Ok(())
    }

    async fn mark_notification_failed(
        &self,
        notification_id: Uuid,
        error: &str,
        give_up: bool
    ) -> Result<()> {
        self.begin_write()?;
        let mut tables = self.lock();
        let row = tables.notification_mut(notification_id)?;

        row.status = (if give_up { DeliveryStatus::Failed } else { DeliveryStatus::Pending }).to_string();
        row.attempts += 1;
        row.last_error = Some(error.to_string());
        row.updated_at = Utc::now();
        self.commit();
        Ok(())
    }
}
