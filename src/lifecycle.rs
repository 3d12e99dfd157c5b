//! Withdrawal state machine.
//!
//! `plan_*` functions decide what a submission or status change writes, given the rows the
//! store has just read (and locked). They never touch the store themselves, so the same rules
//! apply whichever `LedgerStore` persists the result.

use chrono::{ DateTime, Utc };
use rust_decimal::Decimal;
use serde::{ Deserialize, Serialize };
use serde_json::json;
use uuid::Uuid;

use crate::db::entity::{ artist, credit_transaction, withdrawal };
use crate::db::store::{ NewActivity, NewCreditTransaction, NewNotification };
use crate::enums::{ ActivityType, CreditTransactionType, NotificationEvent, WithdrawalStatus };
use crate::error::{ AppError, Result };
use crate::ledger::{ self, format_naira, format_usd, Settlement };

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BankDetails {
    pub account_name: String,
    pub account_number: String,
    pub bank_name: String,
}

impl BankDetails {
    pub fn validate(&self) -> Result<()> {
        let fields = [
            ("bank_account_name", &self.account_name),
            ("bank_account_number", &self.account_number),
            ("bank_name", &self.bank_name),
        ];

        for (name, value) in fields {
            if value.trim().is_empty() {
                return Err(AppError::MissingField(name.to_string()));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct WithdrawalRequest {
    pub artist_id: Uuid,
    pub user_id: Uuid,
    pub amount: Decimal,
    pub bank: BankDetails,
}

/// Admin request to move a withdrawal to `to`.
#[derive(Debug, Clone)]
pub struct StatusChange {
    pub withdrawal_id: Uuid,
    pub to: WithdrawalStatus,
    pub actor_id: Uuid,
    pub note: Option<String>,
}

#[derive(Debug, Clone)]
pub struct SubmissionPlan {
    pub withdrawal: withdrawal::Model,
    pub activity: NewActivity,
    pub notification: NewNotification,
}

#[derive(Debug, Clone)]
pub struct TransitionPlan {
    pub from: WithdrawalStatus,
    pub to: WithdrawalStatus,
    pub processed_at: Option<DateTime<Utc>>,
    pub admin_note: Option<String>,
    /// New artist balances, when the transition moves money.
    pub settlement: Option<Settlement>,
    pub credit_entry: Option<NewCreditTransaction>,
    pub activity: NewActivity,
    pub notification: NewNotification,
}

pub fn plan_submission(
    artist: &artist::Model,
    outstanding: &[withdrawal::Model],
    request: &WithdrawalRequest,
    withdrawal_id: Uuid,
    now: DateTime<Utc>
) -> Result<SubmissionPlan> {
    request.bank.validate()?;

    if ledger::has_pending_request(outstanding, artist.id) {
        return Err(AppError::PendingRequestExists);
    }

    ledger::validate(request.amount, artist.available_balance)?;
    let breakdown = ledger::compute_breakdown(request.amount, artist.credit_balance);

    let withdrawal = withdrawal::Model {
        id: withdrawal_id,
        artist_id: artist.id,
        user_id: request.user_id,
        amount: breakdown.amount,
        naira_amount: breakdown.naira_amount,
        credit_deduction: breakdown.credit_deduction,
        final_amount: breakdown.final_amount,
        final_naira_amount: breakdown.final_naira_amount,
        bank_account_name: request.bank.account_name.trim().to_string(),
        bank_account_number: request.bank.account_number.trim().to_string(),
        bank_name: request.bank.bank_name.trim().to_string(),
        status: WithdrawalStatus::Pending.to_string(),
        admin_note: None,
        created_at: now,
        updated_at: now,
        processed_at: None,
    };

    let mut description = format!(
        "Requested withdrawal of {} ({})",
        format_usd(breakdown.amount),
        format_naira(breakdown.naira_amount)
    );
    if breakdown.credit_deduction > Decimal::ZERO {
        description.push_str(
            &format!(
                ". Credit deduction of {} applied, {} ({}) to be paid out",
                format_usd(breakdown.credit_deduction),
                format_usd(breakdown.final_amount),
                format_naira(breakdown.final_naira_amount)
            )
        );
    }

    let activity = NewActivity {
        artist_id: artist.id,
        activity_type: ActivityType::WithdrawalRequested,
        title: "Withdrawal Requested".to_string(),
        description,
        metadata: json!({
            "withdrawal_id": withdrawal_id,
            "amount": breakdown.amount,
            "naira_amount": breakdown.naira_amount,
            "credit_deduction": breakdown.credit_deduction,
            "final_amount": breakdown.final_amount,
            "final_naira_amount": breakdown.final_naira_amount,
        }),
    };

    let notification = NewNotification {
        withdrawal_id,
        recipient: artist.email.clone(),
        event: NotificationEvent::Requested,
        amount: breakdown.amount,
        naira_amount: breakdown.naira_amount,
    };

    Ok(SubmissionPlan { withdrawal, activity, notification })
}

/// Plans an admin status change.
///
/// `credit_applied` is the credit already taken from the artist for this withdrawal; it is
/// only used when an approved withdrawal is rejected.
pub fn plan_transition(
    withdrawal: &withdrawal::Model,
    artist: &artist::Model,
    change: &StatusChange,
    credit_applied: Decimal,
    now: DateTime<Utc>
) -> Result<TransitionPlan> {
    let from = withdrawal.status.parse::<WithdrawalStatus>()?;
    let to = change.to;

    if !from.can_transition_to(to) {
        return Err(AppError::InvalidTransition { from, to });
    }

    let note = change.note
        .as_deref()
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .map(str::to_string);

    let (settlement, credit_entry) = match (from, to) {
        (WithdrawalStatus::Pending, WithdrawalStatus::Approved) => {
            let settlement = ledger::settle_approval(
                artist.available_balance,
                artist.credit_balance,
                withdrawal.amount,
                withdrawal.credit_deduction
            )?;
            let entry = (settlement.credit_applied > Decimal::ZERO).then(|| NewCreditTransaction {
                artist_id: artist.id,
                amount: settlement.credit_applied,
                transaction_type: CreditTransactionType::WithdrawalDeduction,
                description: format!(
                    "Deducted from withdrawal of {}",
                    format_usd(withdrawal.amount)
                ),
                withdrawal_id: Some(withdrawal.id),
                balance_after: settlement.credit_balance,
                created_by: change.actor_id,
            });
            (Some(settlement), entry)
        }
        (WithdrawalStatus::Approved, WithdrawalStatus::Rejected) => {
            let settlement = ledger::settle_reversal(
                artist.available_balance,
                artist.credit_balance,
                withdrawal.amount,
                credit_applied
            );
            let entry = (credit_applied > Decimal::ZERO).then(|| NewCreditTransaction {
                artist_id: artist.id,
                amount: credit_applied,
                transaction_type: CreditTransactionType::CreditAdded,
                description: format!(
                    "Restored from rejected withdrawal of {}",
                    format_usd(withdrawal.amount)
                ),
                withdrawal_id: Some(withdrawal.id),
                balance_after: settlement.credit_balance,
                created_by: change.actor_id,
            });
            (Some(settlement), entry)
        }
        _ => (None, None),
    };

    let amount = format_usd(withdrawal.amount);
    let (title, mut description) = match to {
        WithdrawalStatus::Approved =>
            ("Withdrawal Approved", format!("Your withdrawal of {} was approved", amount)),
        WithdrawalStatus::Processing =>
            ("Withdrawal Processing", format!("Your withdrawal of {} is being processed", amount)),
        WithdrawalStatus::Completed =>
            (
                "Withdrawal Completed",
                format!(
                    "{} ({}) was paid to {} at {}",
                    format_usd(withdrawal.final_amount),
                    format_naira(withdrawal.final_naira_amount),
                    withdrawal.bank_account_name,
                    withdrawal.bank_name
                ),
            ),
        WithdrawalStatus::Rejected =>
            ("Withdrawal Rejected", format!("Your withdrawal of {} was rejected", amount)),
        WithdrawalStatus::Pending => {
            return Err(AppError::InvalidTransition { from, to });
        }
    };
    if let Some(note) = &note {
        description.push_str(&format!(": {}", note));
    }

    let activity = NewActivity {
        artist_id: artist.id,
        activity_type: ActivityType::for_withdrawal_status(to),
        title: title.to_string(),
        description,
        metadata: json!({
            "withdrawal_id": withdrawal.id,
            "from": from,
            "to": to,
            "actor_id": change.actor_id,
            "amount": withdrawal.amount,
            "credit_applied": settlement.map(|s| s.credit_applied),
        }),
    };

    let notification = NewNotification {
        withdrawal_id: withdrawal.id,
        recipient: artist.email.clone(),
        event: NotificationEvent::for_withdrawal_status(to),
        amount: withdrawal.amount,
        naira_amount: withdrawal.naira_amount,
    };

    Ok(TransitionPlan {
        from,
        to,
        processed_at: (to == WithdrawalStatus::Completed).then_some(now),
        admin_note: note,
        settlement,
        credit_entry,
        activity,
        notification,
    })
}

/// Credit taken for a withdrawal minus credit already given back for it.
pub fn net_credit_applied(entries: &[credit_transaction::Model]) -> Decimal {
    entries
        .iter()
        .filter_map(|entry| {
            match entry.transaction_type.parse::<CreditTransactionType>().ok()? {
                CreditTransactionType::WithdrawalDeduction => Some(entry.amount),
                CreditTransactionType::CreditAdded => Some(-entry.amount),
                CreditTransactionType::CreditDeducted => None,
            }
        })
        .sum::<Decimal>()
        .max(Decimal::ZERO)
}
