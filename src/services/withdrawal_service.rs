use std::sync::Arc;

use rust_decimal::Decimal;
use serde::{ Deserialize, Serialize };
use uuid::Uuid;

use crate::db::entity::withdrawal;
use crate::db::LedgerStore;
use crate::enums::WithdrawalStatus;
use crate::error::{ AppError, Result };
use crate::ledger::{ self, WithdrawalBreakdown };
use crate::lifecycle::{ BankDetails, StatusChange, WithdrawalRequest };

#[derive(Debug, Clone, Deserialize)]
pub struct SubmitWithdrawalRequest {
    pub user_id: Uuid,
    pub amount: Decimal,
    pub bank_account_name: String,
    pub bank_account_number: String,
    pub bank_name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: WithdrawalStatus,
    pub admin_id: Uuid,
    #[serde(default)]
    pub note: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct WithdrawalPreview {
    #[serde(flatten)]
    pub breakdown: WithdrawalBreakdown,
    pub exchange_rate: Decimal,
    pub available_balance: Decimal,
    pub credit_balance: Decimal,
}

pub struct WithdrawalService {
    store: Arc<dyn LedgerStore>,
}

impl WithdrawalService {
    pub fn new(store: Arc<dyn LedgerStore>) -> Self {
        Self { store }
    }

    /// Creates a pending withdrawal for `artist_id`.
    ///
    /// Everything checked here is checked again by the store under a row lock; this pass only
    /// exists to refuse bad requests before any write.
    pub async fn submit(
        &self,
        artist_id: Uuid,
        request: SubmitWithdrawalRequest
    ) -> Result<withdrawal::Model> {
        let bank = BankDetails {
            account_name: request.bank_account_name,
            account_number: request.bank_account_number,
            bank_name: request.bank_name,
        };
        bank.validate()?;

        let outstanding = self.store.list_withdrawals(artist_id, WithdrawalStatus::outstanding()).await?;
        if ledger::has_pending_request(&outstanding, artist_id) {
            tracing::warn!("Artist {} already has an outstanding withdrawal", artist_id);
            return Err(AppError::PendingRequestExists);
        }

        let artist = self.store.get_artist(artist_id).await?;
        ledger::validate(request.amount, artist.available_balance)?;

        self.store.submit_withdrawal(WithdrawalRequest {
            artist_id,
            user_id: request.user_id,
            amount: request.amount,
            bank,
        }).await
    }

    /// Validates `amount` for the artist and returns the payout breakdown without writing.
    pub async fn preview(&self, artist_id: Uuid, amount: Decimal) -> Result<WithdrawalPreview> {
        let artist = self.store.get_artist(artist_id).await?;
        ledger::validate(amount, artist.available_balance)?;
        tracing::debug!("Previewing withdrawal of {} for artist {}", amount, artist_id);

        Ok(WithdrawalPreview {
            breakdown: ledger::compute_breakdown(amount, artist.credit_balance),
            exchange_rate: ledger::EXCHANGE_RATE,
            available_balance: artist.available_balance,
            credit_balance: artist.credit_balance,
        })
    }

    /// Admin status change. Approval deducts the artist's balances in the same transaction.
    pub async fn update_status(
        &self,
        withdrawal_id: Uuid,
        request: UpdateStatusRequest
    ) -> Result<withdrawal::Model> {
        let current = self.store.get_withdrawal(withdrawal_id).await?;
        let from = current.status.parse::<WithdrawalStatus>()?;
        if !from.can_transition_to(request.status) {
            tracing::warn!(
                "Refused to move withdrawal {} from {} to {}",
                withdrawal_id,
                from,
                request.status
            );
            return Err(AppError::InvalidTransition { from, to: request.status });
        }

        self.store.transition_withdrawal(StatusChange {
            withdrawal_id,
            to: request.status,
            actor_id: request.admin_id,
            note: request.note,
        }).await
    }

    pub async fn get(&self, withdrawal_id: Uuid) -> Result<withdrawal::Model> {
        self.store.get_withdrawal(withdrawal_id).await
    }

    pub async fn list_for_artist(&self, artist_id: Uuid) -> Result<Vec<withdrawal::Model>> {
        tracing::debug!("Listing withdrawals for artist {}", artist_id);
        self.store.list_withdrawals(artist_id, &[]).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::memory::MemoryStore;
    use chrono::Utc;
    use rust_decimal_macros::dec;

    fn submission(amount: Decimal) -> SubmitWithdrawalRequest {
        SubmitWithdrawalRequest {
            user_id: Uuid::new_v4(),
            amount,
            bank_account_name: "Ada Obi".to_string(),
            bank_account_number: "0123456789".to_string(),
            bank_name: "First Bank".to_string(),
        }
    }

    fn direct_request(artist_id: Uuid, amount: Decimal) -> WithdrawalRequest {
        WithdrawalRequest {
            artist_id,
            user_id: Uuid::new_v4(),
            amount,
            bank: BankDetails {
                account_name: "Ada Obi".to_string(),
                account_number: "0123456789".to_string(),
                bank_name: "First Bank".to_string(),
            },
        }
    }

    fn status(status: WithdrawalStatus) -> UpdateStatusRequest {
        UpdateStatusRequest {
            status,
            admin_id: Uuid::new_v4(),
            note: None,
        }
    }

    fn setup(available: Decimal, credit: Decimal) -> (Arc<MemoryStore>, WithdrawalService, Uuid) {
        let store = Arc::new(MemoryStore::new());
        let artist = store.add_artist(available, credit);
        let service = WithdrawalService::new(store.clone());
        (store, service, artist.id)
    }

    #[tokio::test]
    async fn test_submit_without_credit() {
        let (store, service, artist_id) = setup(dec!(500), dec!(0));

        let withdrawal = service.submit(artist_id, submission(dec!(100))).await.unwrap();

        assert_eq!(withdrawal.status, "pending");
        assert_eq!(withdrawal.credit_deduction, dec!(0));
        assert_eq!(withdrawal.final_amount, dec!(100));
        assert_eq!(withdrawal.final_naira_amount, dec!(125000));

        // Balances move on approval, not on request.
        assert_eq!(store.artist(artist_id).available_balance, dec!(500));

        let activity = store.activity();
        assert_eq!(activity.len(), 1);
        assert_eq!(activity[0].activity_type, "withdrawal_requested");
        assert_eq!(activity[0].metadata["withdrawal_id"], serde_json::json!(withdrawal.id));

        let outbox = store.outbox();
        assert_eq!(outbox.len(), 1);
        assert_eq!(outbox[0].withdrawal_id, withdrawal.id);
        assert_eq!(outbox[0].event, "requested");
    }

    #[tokio::test]
    async fn test_submit_with_partial_and_full_credit() {
        let (_, service, artist_id) = setup(dec!(500), dec!(30));
        let withdrawal = service.submit(artist_id, submission(dec!(100))).await.unwrap();
        assert_eq!(withdrawal.credit_deduction, dec!(30));
        assert_eq!(withdrawal.final_amount, dec!(70));
        assert_eq!(withdrawal.final_naira_amount, dec!(87500));

        let (_, service, artist_id) = setup(dec!(500), dec!(150));
        let withdrawal = service.submit(artist_id, submission(dec!(100))).await.unwrap();
        assert_eq!(withdrawal.credit_deduction, dec!(100));
        assert_eq!(withdrawal.final_amount, dec!(0));
        assert_eq!(withdrawal.final_naira_amount, dec!(0));
    }

    #[tokio::test]
    async fn test_submit_below_minimum() {
        let (store, service, artist_id) = setup(dec!(500), dec!(0));

        let result = service.submit(artist_id, submission(dec!(20))).await;

        assert!(matches!(result, Err(AppError::BelowMinimum)));
        assert_eq!(store.writes(), 0);
    }

    #[tokio::test]
    async fn test_sub_cent_amount_is_refused() {
        let (store, service, artist_id) = setup(dec!(500), dec!(30));

        let result = service.submit(artist_id, submission(dec!(100.005))).await;
        assert!(matches!(result, Err(AppError::InvalidAmount)));

        let result = service.preview(artist_id, dec!(100.005)).await;
        assert!(matches!(result, Err(AppError::InvalidAmount)));

        // The store refuses it as well when called directly.
        let result = store.submit_withdrawal(direct_request(artist_id, dec!(100.005))).await;
        assert!(matches!(result, Err(AppError::InvalidAmount)));

        assert_eq!(store.writes(), 0);
        assert!(store.outbox().is_empty());
    }

    #[tokio::test]
    async fn test_submit_refused_while_processing() {
        let (store, service, artist_id) = setup(dec!(500), dec!(0));
        let first = service.submit(artist_id, submission(dec!(100))).await.unwrap();
        service.update_status(first.id, status(WithdrawalStatus::Approved)).await.unwrap();
        service.update_status(first.id, status(WithdrawalStatus::Processing)).await.unwrap();
        let writes = store.writes();

        let result = service.submit(artist_id, submission(dec!(100))).await;

        assert!(matches!(result, Err(AppError::PendingRequestExists)));
        assert_eq!(store.writes(), writes);
        assert_eq!(store.outbox().len(), 3);
    }

    #[tokio::test]
    async fn test_store_rechecks_outstanding_request() {
        let (store, _, artist_id) = setup(dec!(500), dec!(0));
        // Two tabs that both passed the fast-fail check.
        store.submit_withdrawal(direct_request(artist_id, dec!(100))).await.unwrap();
        let second = store.submit_withdrawal(direct_request(artist_id, dec!(60))).await;

        assert!(matches!(second, Err(AppError::PendingRequestExists)));
        assert_eq!(store.list_withdrawals(artist_id, &[]).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_submit_checks_stored_balance() {
        let (_, service, artist_id) = setup(dec!(80), dec!(0));
        let result = service.submit(artist_id, submission(dec!(100))).await;
        assert!(matches!(result, Err(AppError::InsufficientBalance)));
    }

    #[tokio::test]
    async fn test_submit_requires_bank_details() {
        let (store, service, artist_id) = setup(dec!(500), dec!(0));
        let mut request = submission(dec!(100));
        request.bank_name = String::new();

        let result = service.submit(artist_id, request).await;

        assert!(matches!(result, Err(AppError::MissingField(f)) if f == "bank_name"));
        assert_eq!(store.writes(), 0);
    }

    #[tokio::test]
    async fn test_store_failure_aborts_submit() {
        let (store, service, artist_id) = setup(dec!(500), dec!(0));
        store.fail_writes();

        let result = service.submit(artist_id, submission(dec!(100))).await;

        assert!(matches!(result, Err(AppError::Database(_))));
        assert!(service.list_for_artist(artist_id).await.unwrap().is_empty());
        assert!(store.activity().is_empty());
        assert!(store.outbox().is_empty());
    }

    #[tokio::test]
    async fn test_unknown_artist() {
        let (_, service, _) = setup(dec!(500), dec!(0));
        let result = service.submit(Uuid::new_v4(), submission(dec!(100))).await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_full_lifecycle() {
        let (store, service, artist_id) = setup(dec!(500), dec!(30));
        let withdrawal = service.submit(artist_id, submission(dec!(100))).await.unwrap();

        let approved = service
            .update_status(withdrawal.id, status(WithdrawalStatus::Approved)).await
            .unwrap();
        assert_eq!(approved.status, "approved");
        assert_eq!(approved.processed_at, None);

        let artist = store.artist(artist_id);
        assert_eq!(artist.available_balance, dec!(400));
        assert_eq!(artist.credit_balance, dec!(0));

        let credits = store.list_credit_transactions(artist_id).await.unwrap();
        assert_eq!(credits.len(), 1);
        assert_eq!(credits[0].transaction_type, "withdrawal_deduction");
        assert_eq!(credits[0].amount, dec!(30));
        assert_eq!(credits[0].withdrawal_id, Some(withdrawal.id));

        service.update_status(withdrawal.id, status(WithdrawalStatus::Processing)).await.unwrap();
        let before = Utc::now();
        let completed = service
            .update_status(withdrawal.id, status(WithdrawalStatus::Completed)).await
            .unwrap();
        assert_eq!(completed.status, "completed");
        assert!(completed.processed_at.unwrap() >= before);

        let events: Vec<_> = store
            .outbox()
            .into_iter()
            .map(|n| n.event)
            .collect();
        assert_eq!(events, ["requested", "approved", "processing", "completed"]);

        // Completed withdrawals are final and no longer block new requests.
        let result = service.update_status(withdrawal.id, status(WithdrawalStatus::Rejected)).await;
        assert!(matches!(result, Err(AppError::InvalidTransition { .. })));
        assert!(service.submit(artist_id, submission(dec!(50))).await.is_ok());
    }

    #[tokio::test]
    async fn test_reject_after_approval_restores_balances() {
        let (store, service, artist_id) = setup(dec!(500), dec!(30));
        let withdrawal = service.submit(artist_id, submission(dec!(100))).await.unwrap();
        service.update_status(withdrawal.id, status(WithdrawalStatus::Approved)).await.unwrap();

        let mut reject = status(WithdrawalStatus::Rejected);
        reject.note = Some("Account number does not match name".to_string());
        let rejected = service.update_status(withdrawal.id, reject).await.unwrap();

        assert_eq!(rejected.status, "rejected");
        assert_eq!(rejected.processed_at, None);
        assert_eq!(rejected.admin_note.as_deref(), Some("Account number does not match name"));

        let artist = store.artist(artist_id);
        assert_eq!(artist.available_balance, dec!(500));
        assert_eq!(artist.credit_balance, dec!(30));

        let credits = store.list_credit_transactions(artist_id).await.unwrap();
        assert_eq!(credits[0].transaction_type, "credit_added");
        assert_eq!(credits[0].amount, dec!(30));
    }

    #[tokio::test]
    async fn test_approval_fails_when_balance_was_spent() {
        let (store, service, artist_id) = setup(dec!(500), dec!(0));

        // A request admitted while the artist still had 1000 available.
        let earlier = store.add_artist(dec!(1000), dec!(0));
        let mut row = crate::lifecycle::plan_submission(
            &earlier,
            &[],
            &direct_request(earlier.id, dec!(600)),
            Uuid::new_v4(),
            Utc::now()
        ).unwrap().withdrawal;
        row.artist_id = artist_id;
        store.seed_withdrawal(row.clone());

        let result = service.update_status(row.id, status(WithdrawalStatus::Approved)).await;

        assert!(matches!(result, Err(AppError::InsufficientBalance)));
        assert_eq!(service.get(row.id).await.unwrap().status, "pending");
        assert_eq!(store.artist(artist_id).available_balance, dec!(500));
    }

    #[tokio::test]
    async fn test_preview() {
        let (_, service, artist_id) = setup(dec!(500), dec!(30));

        let preview = service.preview(artist_id, dec!(100)).await.unwrap();
        assert_eq!(preview.breakdown.final_amount, dec!(70));
        assert_eq!(preview.exchange_rate, dec!(1250));

        let result = service.preview(artist_id, dec!(10001)).await;
        assert!(matches!(result, Err(AppError::AboveMaximum)));
    }
}
