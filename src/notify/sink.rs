//! Notification sink seam

use async_trait::async_trait;
use tracing::info;
use crate::errors::BotResult;

#[async_trait]
pub trait NotificationSink: Send + Sync {
    async fn send(&self, message: &str) -> BotResult<()>;
}

/// Used when no chat is configured; messages only reach the log.
pub struct LogSink;

#[async_trait]
impl NotificationSink for LogSink {
    async fn send(&self, message: &str) -> BotResult<()> {
        info!(target: "notify", "{}", message);
        Ok(())
    }
}
