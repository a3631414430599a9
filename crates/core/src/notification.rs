//! Notification model - transient user-facing messages.

use serde::{Deserialize, Serialize};
use crate::id::NotificationId;
use crate::time::Time;

/// Severity of a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationLevel {
    /// Operation succeeded
    Success,
    /// Neutral information
    Info,
    /// Operation failed
    Error,
}

/// A message shown to the user once and then discarded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    /// Unique identifier
    pub id: NotificationId,

    /// Severity
    pub level: NotificationLevel,

    /// Short title
    pub title: String,

    /// Body text
    pub message: String,

    /// When it was raised
    pub at: Time,
}

impl Notification {
    /// Create a new notification.
    pub fn new(
        level: NotificationLevel,
        title: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            id: NotificationId::new(),
            level,
            title: title.into(),
            message: message.into(),
            at: chrono::Utc::now(),
        }
    }

    /// Success notification.
    pub fn success(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(NotificationLevel::Success, title, message)
    }

    /// Error notification.
    pub fn error(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(NotificationLevel::Error, title, message)
    }

    /// Whether this reports a failure.
    pub fn is_error(&self) -> bool {
        self.level == NotificationLevel::Error
    }
}
