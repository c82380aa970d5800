use anyhow::Result;
use async_trait::async_trait;
use tracing::info;

use super::account::AccountId;

/// Destination of user facing notifications. Delivery is best-effort.
#[async_trait]
pub trait NotificationSink: Send + Sync {
  async fn notify(&self, account: AccountId, title: &str, body: &str) -> Result<()>;
}

/// A [`NotificationSink`] that only writes the notifications to the log.
#[derive(Debug, Default)]
pub struct TracingNotificationSink;

#[async_trait]
impl NotificationSink for TracingNotificationSink {
  async fn notify(&self, account: AccountId, title: &str, body: &str) -> Result<()> {
    info!(account, title, body, "notification");
    Ok(())
  }
}
