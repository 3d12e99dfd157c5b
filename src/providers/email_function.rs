use std::time::Duration;

use async_trait::async_trait;

use crate::error::{ AppError, Result };

use super::notifier::{ DeliveryResponse, Notifier, WithdrawalEmail };

const REQUEST_TIMEOUT_SECS: u64 = 10;

/// Delivers withdrawal e-mails through the hosted `send-withdrawal-email` function.
pub struct EmailFunctionNotifier {
    client: reqwest::Client,
    url: String,
    api_key: Option<String>,
}

impl EmailFunctionNotifier {
    pub fn new(url: String, api_key: Option<String>) -> Result<Self> {
        let client = reqwest::Client
            ::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|e| AppError::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self { client, url, api_key })
    }
}

#[async_trait]
impl Notifier for EmailFunctionNotifier {
    async fn send_withdrawal_notification(&self, email: &WithdrawalEmail) -> Result<()> {
        let mut request = self.client.post(&self.url).json(email);
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request
            .send().await
            .map_err(|e| AppError::Notification(format!("E-mail function unreachable: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::Notification(format!("E-mail function returned {}: {}", status, body)));
        }

        let delivery: DeliveryResponse = response
            .json().await
            .map_err(|e| AppError::Notification(format!("Invalid e-mail function response: {}", e)))?;

        if !delivery.success {
            return Err(
                AppError::Notification(
                    delivery.error.unwrap_or_else(|| "E-mail function reported failure".to_string())
                )
            );
        }

        tracing::debug!("Sent {} e-mail to {}", email.event, email.to);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::enums::NotificationEvent;
    use rust_decimal_macros::dec;

    #[test]
    fn test_payload_matches_function_contract() {
        let email = WithdrawalEmail {
            to: "ada@example.com".to_string(),
            event: NotificationEvent::Requested,
            amount: dec!(100),
            naira_amount: dec!(125000),
        };

        let body = serde_json::to_value(&email).unwrap();
        assert_eq!(body["to"], "ada@example.com");
        assert_eq!(body["type"], "requested");
        assert_eq!(body["amount"], "100");
        assert_eq!(body["nairaAmount"], "125000");
    }

    #[test]
    fn test_failure_response_parses() {
        let response: DeliveryResponse = serde_json
            ::from_str(r#"{"success":false,"error":"mailbox full"}"#)
            .unwrap();
        assert!(!response.success);
        assert_eq!(response.error.as_deref(), Some("mailbox full"));

        let response: DeliveryResponse = serde_json::from_str(r#"{"success":true}"#).unwrap();
        assert!(response.success);
    }

    #[tokio::test]
    async fn test_unreachable_function_is_notification_error() {
        let notifier = EmailFunctionNotifier::new(
            "http://127.0.0.1:9/send-withdrawal-email".to_string(),
            None
        ).unwrap();
        let email = WithdrawalEmail {
            to: "ada@example.com".to_string(),
            event: NotificationEvent::Approved,
            amount: dec!(100),
            naira_amount: dec!(125000),
        };

        let result = notifier.send_withdrawal_notification(&email).await;
        assert!(matches!(result, Err(AppError::Notification(_))));
    }
}
