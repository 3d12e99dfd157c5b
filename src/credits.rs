use rust_decimal::Decimal;
use serde::{ Deserialize, Serialize };
use serde_json::json;
use uuid::Uuid;

use crate::db::entity::artist;
use crate::db::store::{ NewActivity, NewCreditTransaction };
use crate::enums::{ ActivityType, CreditTransactionType };
use crate::error::Result;
use crate::ledger::{ self, format_usd };

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CreditDirection {
    /// Artist owes more (e.g. an unpaid subscription).
    Add,
    /// Part of the debt is written off by an admin.
    Remove,
}

#[derive(Debug, Clone)]
pub struct CreditChange {
    pub artist_id: Uuid,
    pub direction: CreditDirection,
    pub amount: Decimal,
    pub description: String,
    pub actor_id: Uuid,
}

#[derive(Debug, Clone)]
pub struct CreditPlan {
    pub credit_balance: Decimal,
    pub entry: NewCreditTransaction,
    pub activity: NewActivity,
}

pub fn plan_credit_change(artist: &artist::Model, change: &CreditChange) -> Result<CreditPlan> {
    let (credit_balance, transaction_type, activity_type, title, default_description) = match
        change.direction
    {
        CreditDirection::Add =>
            (
                ledger::add_credit(artist.credit_balance, change.amount)?,
                CreditTransactionType::CreditAdded,
                ActivityType::CreditAdded,
                "Credit Added",
                "Outstanding balance added",
            ),
        CreditDirection::Remove =>
            (
                ledger::remove_credit(artist.credit_balance, change.amount)?,
                CreditTransactionType::CreditDeducted,
                ActivityType::CreditDeducted,
                "Credit Reduced",
                "Outstanding balance reduced",
            ),
    };

    let description = match change.description.trim() {
        "" => default_description.to_string(),
        text => text.to_string(),
    };

    let verb = match change.direction {
        CreditDirection::Add => "added to",
        CreditDirection::Remove => "removed from",
    };

    let activity = NewActivity {
        artist_id: artist.id,
        activity_type,
        title: title.to_string(),
        description: format!(
            "{} {} your credit balance: {}. Credit balance is now {}",
            format_usd(change.amount),
            verb,
            description,
            format_usd(credit_balance)
        ),
        metadata: json!({
            "amount": change.amount,
            "previous_balance": artist.credit_balance,
            "new_balance": credit_balance,
            "actor_id": change.actor_id,
        }),
    };

    let entry = NewCreditTransaction {
        artist_id: artist.id,
        amount: change.amount,
        transaction_type,
        description,
        withdrawal_id: None,
        balance_after: credit_balance,
        created_by: change.actor_id,
    };

    Ok(CreditPlan { credit_balance, entry, activity })
}
