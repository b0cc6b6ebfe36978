//! User-visible notifications.
//!
//! The controller never decides how a message is shown; it hands it to a
//! [`NotificationSink`] chosen by whoever embeds it.

use serde::Serialize;
use std::fmt;
use std::sync::{Mutex, PoisonError};
use tracing::{info, warn};

/// Severity of a notification.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
    Success,
    Error,
}

impl fmt::Display for NotificationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NotificationKind::Success => f.write_str("success"),
            NotificationKind::Error => f.write_str("error"),
        }
    }
}

/// Destination for user-facing messages.
pub trait NotificationSink: Send + Sync {
    fn notify(&self, kind: NotificationKind, message: &str);
}

/// Sink that only logs through `tracing`.
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingSink;

impl NotificationSink for TracingSink {
    fn notify(&self, kind: NotificationKind, message: &str) {
        match kind {
            NotificationKind::Success => info!(kind = %kind, "{}", message),
            NotificationKind::Error => warn!(kind = %kind, "{}", message),
        }
    }
}

/// A delivered notification, as kept by [`MemorySink`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Notification {
    pub kind: NotificationKind,
    pub message: String,
}

/// Sink that records every notification in order.
#[derive(Debug, Default)]
pub struct MemorySink {
    delivered: Mutex<Vec<Notification>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Notifications delivered so far, oldest first.
    pub fn delivered(&self) -> Vec<Notification> {
        self.delivered
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn last(&self) -> Option<Notification> {
        self.delivered
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .last()
            .cloned()
    }
}

impl NotificationSink for MemorySink {
    fn notify(&self, kind: NotificationKind, message: &str) {
        self.delivered
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(Notification {
                kind,
                message: message.to_string(),
            });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_sink_keeps_order() {
        let sink = MemorySink::new();
        assert!(sink.last().is_none());

        sink.notify(NotificationKind::Error, "first");
        sink.notify(NotificationKind::Success, "second");

        let delivered = sink.delivered();
        assert_eq!(delivered.len(), 2);
        assert_eq!(delivered[0].message, "first");
        assert_eq!(sink.last().unwrap().kind, NotificationKind::Success);
    }

    #[test]
    fn test_notification_serialization() {
        let n = Notification {
            kind: NotificationKind::Success,
            message: "Notion disconnected successfully".to_string(),
        };
        let json = serde_json::to_string(&n).unwrap();
        assert!(json.contains("\"kind\":\"success\""));
    }
}
