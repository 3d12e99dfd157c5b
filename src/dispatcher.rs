use std::sync::Arc;

use tokio::time::{ interval, Duration };
use uuid::Uuid;

use crate::db::entity::notification_outbox;
use crate::db::LedgerStore;
use crate::enums::NotificationEvent;
use crate::error::Result;
use crate::providers::{ Notifier, WithdrawalEmail };

/// Outcome of one pass over the outbox.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct DispatchReport {
    pub sent: usize,
    pub retrying: usize,
    pub failed: usize,
}

/// Background worker delivering withdrawal e-mails from the outbox.
///
/// A delivery failure never touches the withdrawal it belongs to; the row is retried on the
/// next tick until `max_attempts` is reached. Delivery is at least once: an e-mail whose
/// `sent` mark is lost is sent again.
pub struct NotificationDispatcher {
    store: Arc<dyn LedgerStore>,
    notifier: Arc<dyn Notifier>,
    poll_interval: Duration,
    batch_size: u64,
    max_attempts: i32,
}

impl NotificationDispatcher {
    pub fn new(
        store: Arc<dyn LedgerStore>,
        notifier: Arc<dyn Notifier>,
        poll_interval: Duration,
        batch_size: u64,
        max_attempts: i32
    ) -> Self {
        Self {
            store,
            notifier,
            poll_interval,
            batch_size,
            max_attempts: max_attempts.max(1),
        }
    }

    pub async fn start(self) {
        let mut interval = interval(self.poll_interval);

        loop {
            interval.tick().await;

            match self.run_once().await {
                Ok(report) if report != DispatchReport::default() => {
                    tracing::info!(
                        "Notification dispatch: {} sent, {} retrying, {} failed",
                        report.sent,
                        report.retrying,
                        report.failed
                    );
                }
                Ok(_) => {}
                Err(e) => tracing::error!("Notification dispatcher error: {}", e),
            }
        }
    }

    /// Only reading the batch can fail the pass. A row whose outcome cannot be recorded is
    /// logged and left pending, so the next pass picks it up again.
    pub async fn run_once(&self) -> Result<DispatchReport> {
        let pending = self.store.pending_notifications(self.batch_size).await?;
        let mut report = DispatchReport::default();

        for row in pending {
            let email = match Self::to_email(&row) {
                Ok(email) => email,
                Err(e) => {
                    tracing::warn!("Dropping malformed notification {}: {}", row.id, e);
                    self.record(
                        row.id,
                        self.store.mark_notification_failed(row.id, &e.to_string(), true).await
                    );
                    report.failed += 1;
                    continue;
                }
            };

            match self.notifier.send_withdrawal_notification(&email).await {
                Ok(()) => {
                    self.record(row.id, self.store.mark_notification_sent(row.id).await);
                    report.sent += 1;
                }
                Err(e) => {
                    let give_up = row.attempts + 1 >= self.max_attempts;
                    tracing::warn!(
                        "Failed to send {} e-mail for withdrawal {} (attempt {}/{}): {}",
                        row.event,
                        row.withdrawal_id,
                        row.attempts + 1,
                        self.max_attempts,
                        e
                    );
                    self.record(
                        row.id,
                        self.store.mark_notification_failed(row.id, &e.to_string(), give_up).await
                    );
                    if give_up {
                        report.failed += 1;
                    } else {
                        report.retrying += 1;
                    }
                }
            }
        }

        Ok(report)
    }

    fn record(&self, notification_id: Uuid, outcome: Result<()>) {
        if let Err(e) = outcome {
            tracing::error!("Could not record delivery of notification {}: {}", notification_id, e);
        }
    }

    fn to_email(row: &notification_outbox::Model) -> Result<WithdrawalEmail> {
        Ok(WithdrawalEmail {
            to: row.recipient.clone(),
            event: row.event.parse::<NotificationEvent>()?,
            amount: row.amount,
            naira_amount: row.naira_amount,
        })
    }
}
