//! Outbound notifications (out-of-stock alerts to buyers).

use std::sync::Mutex;

use thiserror::Error;

use allocation_events::HandlerError;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum NotificationError {
    #[error("notification channel unavailable: {0}")]
    Unavailable(String),

    #[error("notification log lock poisoned")]
    Poisoned,
}

impl From<NotificationError> for HandlerError {
    fn from(value: NotificationError) -> Self {
        HandlerError::Other(anyhow::Error::new(value))
    }
}

/// Sends a short text message to a destination address.
pub trait Notifications: Send + Sync {
    fn send(&self, destination: &str, message: &str) -> Result<(), NotificationError>;
}

/// Emits notifications as structured log events.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifications;

impl Notifications for LogNotifications {
    fn send(&self, destination: &str, message: &str) -> Result<(), NotificationError> {
        tracing::info!(destination, message, "sending notification");
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentNotification {
    pub destination: String,
    pub message: String,
}

/// Records notifications instead of sending them.
///
/// Intended for tests/dev.
#[derive(Debug, Default)]
pub struct InMemoryNotifications {
    sent: Mutex<Vec<SentNotification>>,
    unavailable: Option<String>,
}

impl InMemoryNotifications {
    pub fn new() -> Self {
        Self::default()
    }

    /// A channel whose every `send` fails with `reason`.
    pub fn unavailable(reason: impl Into<String>) -> Self {
        Self {
            sent: Mutex::new(Vec::new()),
            unavailable: Some(reason.into()),
        }
    }

    /// Everything recorded so far, including records made before a panic
    /// poisoned the log.
    pub fn sent(&self) -> Vec<SentNotification> {
        self.sent
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }
}

impl Notifications for InMemoryNotifications {
    fn send(&self, destination: &str, message: &str) -> Result<(), NotificationError> {
        if let Some(reason) = &self.unavailable {
            return Err(NotificationError::Unavailable(reason.clone()));
        }
        let mut sent = self.sent.lock().map_err(|_| NotificationError::Poisoned)?;
        sent.push(SentNotification {
            destination: destination.to_string(),
            message: message.to_string(),
        });
        Ok(())
    }
}
