use std::fmt;
use std::str::FromStr;

use serde::{ Deserialize, Serialize };

use crate::error::AppError;

// ─── WithdrawalStatus ───────────────────────────────────────────────

/// Lifecycle of a payout request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WithdrawalStatus {
    Pending,
    Approved,
    Processing,
    Completed,
    Rejected,
}

impl WithdrawalStatus {
    /// Canonical string stored in the database.
    pub fn as_str(&self) -> &'static str {
        match self {
            WithdrawalStatus::Pending => "pending",
            WithdrawalStatus::Approved => "approved",
            WithdrawalStatus::Processing => "processing",
            WithdrawalStatus::Completed => "completed",
            WithdrawalStatus::Rejected => "rejected",
        }
    }

    /// Statuses that block a new request for the same artist.
    pub fn outstanding() -> &'static [WithdrawalStatus] {
        &[WithdrawalStatus::Pending, WithdrawalStatus::Approved, WithdrawalStatus::Processing]
    }

    pub fn is_outstanding(&self) -> bool {
        Self::outstanding().contains(self)
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, WithdrawalStatus::Completed | WithdrawalStatus::Rejected)
    }

    pub fn can_transition_to(&self, next: WithdrawalStatus) -> bool {
        matches!(
            (self, next),
            (WithdrawalStatus::Pending, WithdrawalStatus::Approved) |
                (WithdrawalStatus::Approved, WithdrawalStatus::Processing) |
                (WithdrawalStatus::Processing, WithdrawalStatus::Completed) |
                (WithdrawalStatus::Pending, WithdrawalStatus::Rejected) |
                (WithdrawalStatus::Approved, WithdrawalStatus::Rejected)
        )
    }

    pub fn all() -> &'static [WithdrawalStatus] {
        &[
            WithdrawalStatus::Pending,
            WithdrawalStatus::Approved,
            WithdrawalStatus::Processing,
            WithdrawalStatus::Completed,
            WithdrawalStatus::Rejected,
        ]
    }
}

impl fmt::Display for WithdrawalStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WithdrawalStatus {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pending" => Ok(WithdrawalStatus::Pending),
            "approved" => Ok(WithdrawalStatus::Approved),
            "processing" => Ok(WithdrawalStatus::Processing),
            "completed" => Ok(WithdrawalStatus::Completed),
            "rejected" => Ok(WithdrawalStatus::Rejected),
            _ => Err(AppError::InvalidInput(format!(
                "Invalid withdrawal status: {}. Supported: pending, approved, processing, completed, rejected",
                s
            ))),
        }
    }
}

// ─── CreditTransactionType ──────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CreditTransactionType {
    CreditAdded,
    WithdrawalDeduction,
    CreditDeducted,
}

impl CreditTransactionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            CreditTransactionType::CreditAdded => "credit_added",
            CreditTransactionType::WithdrawalDeduction => "withdrawal_deduction",
            CreditTransactionType::CreditDeducted => "credit_deducted",
        }
    }
}

impl fmt::Display for CreditTransactionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CreditTransactionType {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "credit_added" => Ok(CreditTransactionType::CreditAdded),
            "withdrawal_deduction" => Ok(CreditTransactionType::WithdrawalDeduction),
            "credit_deducted" => Ok(CreditTransactionType::CreditDeducted),
            _ => Err(AppError::InvalidInput(format!("Invalid credit transaction type: {}", s))),
        }
    }
}

// ─── ActivityType ───────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityType {
    WithdrawalRequested,
    WithdrawalApproved,
    WithdrawalProcessing,
    WithdrawalCompleted,
    WithdrawalRejected,
    CreditAdded,
    CreditDeducted,
}

impl ActivityType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActivityType::WithdrawalRequested => "withdrawal_requested",
            ActivityType::WithdrawalApproved => "withdrawal_approved",
            ActivityType::WithdrawalProcessing => "withdrawal_processing",
            ActivityType::WithdrawalCompleted => "withdrawal_completed",
            ActivityType::WithdrawalRejected => "withdrawal_rejected",
            ActivityType::CreditAdded => "credit_added",
            ActivityType::CreditDeducted => "credit_deducted",
        }
    }

    /// Activity recorded when a withdrawal enters `status`.
    pub fn for_withdrawal_status(status: WithdrawalStatus) -> Self {
        match status {
            WithdrawalStatus::Pending => ActivityType::WithdrawalRequested,
            WithdrawalStatus::Approved => ActivityType::WithdrawalApproved,
            WithdrawalStatus::Processing => ActivityType::WithdrawalProcessing,
            WithdrawalStatus::Completed => ActivityType::WithdrawalCompleted,
            WithdrawalStatus::Rejected => ActivityType::WithdrawalRejected,
        }
    }
}

impl fmt::Display for ActivityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ─── NotificationEvent ──────────────────────────────────────────────

/// Withdrawal e-mail templates understood by the e-mail function.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationEvent {
    Requested,
    Approved,
    Processing,
    Completed,
    Rejected,
}

impl NotificationEvent {
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationEvent::Requested => "requested",
            NotificationEvent::Approved => "approved",
            NotificationEvent::Processing => "processing",
            NotificationEvent::Completed => "completed",
            NotificationEvent::Rejected => "rejected",
        }
    }

    pub fn for_withdrawal_status(status: WithdrawalStatus) -> Self {
        match status {
            WithdrawalStatus::Pending => NotificationEvent::Requested,
            WithdrawalStatus::Approved => NotificationEvent::Approved,
            WithdrawalStatus::Processing => NotificationEvent::Processing,
            WithdrawalStatus::Completed => NotificationEvent::Completed,
            WithdrawalStatus::Rejected => NotificationEvent::Rejected,
        }
    }
}

impl fmt::Display for NotificationEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NotificationEvent {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "requested" => Ok(NotificationEvent::Requested),
            "approved" => Ok(NotificationEvent::Approved),
            "processing" => Ok(NotificationEvent::Processing),
            "completed" => Ok(NotificationEvent::Completed),
            "rejected" => Ok(NotificationEvent::Rejected),
            _ => Err(AppError::InvalidInput(format!("Invalid notification event: {}", s))),
        }
    }
}

// ─── DeliveryStatus ─────────────────────────────────────────────────

/// Delivery state of an outbox row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeliveryStatus {
    Pending,
    Sent,
    Failed,
}

impl DeliveryStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            DeliveryStatus::Pending => "pending",
            DeliveryStatus::Sent => "sent",
            DeliveryStatus::Failed => "failed",
        }
    }
}

impl fmt::Display for DeliveryStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
