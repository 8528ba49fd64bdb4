//! Bounded, non-blocking notification queue

use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, warn};
use crate::notify::NotificationSink;

pub const NOTIFICATION_QUEUE_SIZE: usize = 64;

/// Hands messages to a background task that delivers them to the sink. Enqueueing never
/// waits; when the queue is full the message is dropped.
#[derive(Clone)]
pub struct Notifier {
    tx: mpsc::Sender<String>,
}

impl Notifier {
    /// Starts the delivery task. It exits after every `Notifier` clone has been dropped and
    /// the queue has drained.
    pub fn spawn(sink: Arc<dyn NotificationSink>, capacity: usize) -> (Self, JoinHandle<()>) {
        let (tx, mut rx) = mpsc::channel::<String>(capacity.max(1));

        let handle = tokio::spawn(async move {
            while let Some(message) = rx.recv().await {
                if let Err(e) = sink.send(&message).await {
                    warn!("⚠️ Notification delivery failed: {}", e);
                }
            }
            debug!("Notification queue closed");
        });

        (Self { tx }, handle)
    }

    /// Returns false when the message was dropped.
    pub fn notify(&self, message: impl Into<String>) -> bool {
        match self.tx.try_send(message.into()) {
            Ok(()) => true,
            Err(mpsc::error::TrySendError::Full(_)) => {
                warn!("Notification queue full, dropping message");
                false
            }
            Err(mpsc::error::TrySendError::Closed(_)) => {
                debug!("Notification queue closed, dropping message");
                false
            }
        }
    }
}
