//! Claim notification delivery for the API server.

use async_trait::async_trait;
use eyre::Result;
use miny_core::notification::{ClaimNotification, Notifier};
use tracing::info;

/// Writes rendered claim notifications to the log instead of a mail relay.
#[derive(Debug, Clone, Default)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn notify_claim(&self, notification: &ClaimNotification) -> Result<()> {
        info!(
            to = %notification.recipient_email,
            subject = %notification.subject(),
            "Claim notification\n{}",
            notification.text_body()
        );
        Ok(())
    }
}
