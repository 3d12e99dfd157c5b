use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::{ Deserialize, Serialize };

use crate::enums::NotificationEvent;
use crate::error::Result;

/// Payload accepted by the e-mail function.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WithdrawalEmail {
    pub to: String,
    #[serde(rename = "type")]
    pub event: NotificationEvent,
    pub amount: Decimal,
    #[serde(rename = "nairaAmount")]
    pub naira_amount: Decimal,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DeliveryResponse {
    pub success: bool,
    #[serde(default)]
    pub error: Option<String>,
}

#[async_trait]
pub trait Notifier: Send + Sync {
    /// Sends one withdrawal e-mail. An `Err` means the message was not delivered.
    async fn send_withdrawal_notification(&self, email: &WithdrawalEmail) -> Result<()>;
}
