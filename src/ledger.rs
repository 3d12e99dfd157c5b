//! Balance and credit arithmetic for payouts.
//!
//! Everything here is pure: no store access, no clock. Amounts are USD unless the name says
//! naira.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{ Deserialize, Serialize };
use uuid::Uuid;

use crate::db::entity::withdrawal;
use crate::enums::WithdrawalStatus;
use crate::error::{ AppError, Result };

/// NGN per USD. Fixed, not fetched live.
pub const EXCHANGE_RATE: Decimal = dec!(1250);
pub const MIN_WITHDRAWAL: Decimal = dec!(50);
pub const MAX_WITHDRAWAL: Decimal = dec!(10000);
/// Decimal places kept by every money column.
pub const CENT_PLACES: u32 = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WithdrawalBreakdown {
    pub amount: Decimal,
    pub credit_deduction: Decimal,
    pub final_amount: Decimal,
    pub naira_amount: Decimal,
    pub final_naira_amount: Decimal,
}

/// Artist balances after a ledger operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Settlement {
    pub available_balance: Decimal,
    pub credit_balance: Decimal,
    /// Credit actually consumed (approval) or restored (reversal).
    pub credit_applied: Decimal,
}

/// Checks a requested amount against the withdrawal bounds and the available balance.
///
/// Checks run in order: positivity and whole cents, minimum, maximum, balance.
pub fn validate(amount: Decimal, available_balance: Decimal) -> Result<()> {
    check_amount(amount)?;
    if amount < MIN_WITHDRAWAL {
        return Err(AppError::BelowMinimum);
    }
    if amount > MAX_WITHDRAWAL {
        return Err(AppError::AboveMaximum);
    }
    if amount > available_balance {
        return Err(AppError::InsufficientBalance);
    }
    Ok(())
}

pub fn compute_breakdown(amount: Decimal, credit_balance: Decimal) -> WithdrawalBreakdown {
    let owed = credit_balance.max(Decimal::ZERO);
    let credit_deduction = owed.min(amount).max(Decimal::ZERO);
    let final_amount = amount - credit_deduction;

    WithdrawalBreakdown {
        amount,
        credit_deduction,
        final_amount,
        naira_amount: amount * EXCHANGE_RATE,
        final_naira_amount: final_amount * EXCHANGE_RATE,
    }
}

/// True iff any withdrawal of `artist_id` is pending, approved or processing.
pub fn has_pending_request(withdrawals: &[withdrawal::Model], artist_id: Uuid) -> bool {
    withdrawals
        .iter()
        .filter(|w| w.artist_id == artist_id)
        .any(|w| {
            w.status
                .parse::<WithdrawalStatus>()
                .map(|s| s.is_outstanding())
                .unwrap_or(false)
        })
}

/// Balance effect of approving a withdrawal.
///
/// The available balance must still cover the full amount. The credit deduction fixed at
/// request time is capped at whatever credit is still owed.
pub fn settle_approval(
    available_balance: Decimal,
    credit_balance: Decimal,
    amount: Decimal,
    credit_deduction: Decimal
) -> Result<Settlement> {
    if amount > available_balance {
        return Err(AppError::InsufficientBalance);
    }

    let credit_applied = credit_deduction.min(credit_balance).max(Decimal::ZERO);

    Ok(Settlement {
        available_balance: available_balance - amount,
        credit_balance: credit_balance - credit_applied,
        credit_applied,
    })
}

/// Undoes [`settle_approval`] for a withdrawal rejected after approval.
pub fn settle_reversal(
    available_balance: Decimal,
    credit_balance: Decimal,
    amount: Decimal,
    credit_applied: Decimal
) -> Settlement {
    Settlement {
        available_balance: available_balance + amount,
        credit_balance: credit_balance + credit_applied,
        credit_applied,
    }
}

/// New credit balance after an admin adds outstanding debt.
pub fn add_credit(credit_balance: Decimal, amount: Decimal) -> Result<Decimal> {
    check_amount(amount)?;
    Ok(credit_balance + amount)
}

/// New credit balance after an admin writes off part of the debt.
pub fn remove_credit(credit_balance: Decimal, amount: Decimal) -> Result<Decimal> {
    check_amount(amount)?;
    if amount > credit_balance {
        return Err(AppError::InsufficientCredit);
    }
    Ok(credit_balance - amount)
}

/// Positive and stored without rounding. `100.005` would be rounded by the columns, so it is
/// refused instead.
pub fn check_amount(amount: Decimal) -> Result<()> {
    if amount <= Decimal::ZERO || amount.normalize().scale() > CENT_PLACES {
        return Err(AppError::InvalidAmount);
    }
    Ok(())
}

pub fn format_usd(amount: Decimal) -> String {
    format_money("$", amount)
}

pub fn format_naira(amount: Decimal) -> String {
    format_money("\u{20a6}", amount)
}

fn format_money(symbol: &str, amount: Decimal) -> String {
    let rounded = amount.round_dp(2);
    let sign = if rounded.is_sign_negative() && !rounded.is_zero() { "-" } else { "" };
    let text = format!("{:.2}", rounded.abs());
    let (whole, frac) = text.split_once('.').unwrap_or((text.as_str(), "00"));

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, ch) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    format!("{}{}{}.{}", sign, symbol, grouped, frac)
}
