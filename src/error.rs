use thiserror::Error;

use crate::enums::WithdrawalStatus;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")] Database(#[from] sea_orm::DbErr),

    #[error("Invalid amount")]
    InvalidAmount,

    #[error("Amount is below the minimum withdrawal")]
    BelowMinimum,

    #[error("Amount is above the maximum withdrawal")]
    AboveMaximum,

    #[error("Insufficient balance")]
    InsufficientBalance,

    #[error("Insufficient credit balance")]
    InsufficientCredit,

    #[error("A withdrawal request is already outstanding")]
    PendingRequestExists,

    #[error("Missing field: {0}")] MissingField(String),

    #[error("Invalid status transition from {from} to {to}")] InvalidTransition {
        from: WithdrawalStatus,
        to: WithdrawalStatus,
    },

    #[error("Not found: {0}")] NotFound(String),

    #[error("Invalid input: {0}")] InvalidInput(String),

    #[error("Notification error: {0}")] Notification(String),

    #[error("Configuration error: {0}")] Config(String),

    #[error("Internal error: {0}")] Internal(String),
}

#[derive(serde::Serialize)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

/// Body rendered by the dashboard as a toast: `title` on top, `message` below.
#[derive(serde::Serialize)]
pub struct ErrorDetail {
    pub code: String,
    pub title: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
}

impl AppError {
    pub fn code(&self) -> &'static str {
        match self {
            AppError::Database(_) => "STORE_ERROR",
            AppError::InvalidAmount => "INVALID_AMOUNT",
            AppError::BelowMinimum => "BELOW_MINIMUM",
            AppError::AboveMaximum => "ABOVE_MAXIMUM",
            AppError::InsufficientBalance => "INSUFFICIENT_BALANCE",
            AppError::InsufficientCredit => "INSUFFICIENT_CREDIT",
            AppError::PendingRequestExists => "PENDING_REQUEST_EXISTS",
            AppError::MissingField(_) => "MISSING_FIELD",
            AppError::InvalidTransition { .. } => "INVALID_TRANSITION",
            AppError::NotFound(_) => "NOT_FOUND",
            AppError::InvalidInput(_) => "INVALID_INPUT",
            AppError::Notification(_) => "NOTIFICATION_ERROR",
            AppError::Config(_) => "CONFIG_ERROR",
            AppError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    pub fn to_error_response(&self) -> ErrorResponse {
        let (title, message, field) = match self {
            AppError::Database(_) =>
                ("Something went wrong", "Please try again in a moment.".to_string(), None),
            AppError::InvalidAmount =>
                (
                    "Invalid amount",
                    "Please enter a positive amount in whole cents.".to_string(),
                    Some("amount".to_string()),
                ),
            AppError::BelowMinimum =>
                (
                    "Amount too low",
                    format!("Minimum withdrawal amount is ${}.", crate::ledger::MIN_WITHDRAWAL),
                    Some("amount".to_string()),
                ),
            AppError::AboveMaximum =>
                (
                    "Amount too high",
                    format!("Maximum withdrawal amount is ${}.", crate::ledger::MAX_WITHDRAWAL),
                    Some("amount".to_string()),
                ),
            AppError::InsufficientBalance =>
                (
                    "Insufficient balance",
                    "You don't have enough available balance for this withdrawal.".to_string(),
                    Some("amount".to_string()),
                ),
            AppError::InsufficientCredit =>
                (
                    "Insufficient credit balance",
                    "The amount exceeds the artist's outstanding credit balance.".to_string(),
                    Some("amount".to_string()),
                ),
            AppError::PendingRequestExists =>
                (
                    "Pending request exists",
                    "You already have a withdrawal request in progress. Please wait for it to be processed.".to_string(),
                    None,
                ),
            AppError::MissingField(field) =>
                ("Missing information", format!("Please fill in {}.", field.replace('_', " ")), Some(field.clone())),
            AppError::InvalidTransition { from, to } =>
                (
                    "Status update failed",
                    format!("A {} withdrawal cannot be marked as {}.", from, to),
                    Some("status".to_string()),
                ),
            AppError::NotFound(what) => ("Not found", format!("{} not found", what), None),
            AppError::InvalidInput(msg) => ("Invalid request", msg.clone(), None),
            AppError::Notification(msg) => ("Notification failed", msg.clone(), None),
            AppError::Config(msg) => ("Configuration error", msg.clone(), None),
            AppError::Internal(_) =>
                ("Something went wrong", "Please try again in a moment.".to_string(), None),
        };

        ErrorResponse {
            error: ErrorDetail {
                code: self.code().to_string(),
                title: title.to_string(),
                message,
                field,
            },
        }
    }

    pub fn status_code(&self) -> axum::http::StatusCode {
        use axum::http::StatusCode;

        match self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            | AppError::InvalidAmount
            | AppError::BelowMinimum
            | AppError::AboveMaximum
            | AppError::MissingField(_)
            | AppError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            AppError::InsufficientBalance | AppError::InsufficientCredit => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            AppError::PendingRequestExists | AppError::InvalidTransition { .. } => {
                StatusCode::CONFLICT
            }
            AppError::Notification(_) => StatusCode::BAD_GATEWAY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl axum::response::IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let status = self.status_code();

        if status.is_server_error() {
            tracing::error!("Request failed: {}", self);
        }

        let response = self.to_error_response();
        (status, axum::Json(response)).into_response()
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
