// Notification channel value object

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NotificationChannel {
    Slack,
    Webhook,
    Email,
}

impl NotificationChannel {
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationChannel::Slack => "slack",
            NotificationChannel::Webhook => "webhook",
            NotificationChannel::Email => "email",
        }
    }

    /// Unknown channel names are skipped by the dispatcher, so parsing is
    /// fallible rather than defaulting.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "slack" => Some(NotificationChannel::Slack),
            "webhook" => Some(NotificationChannel::Webhook),
            "email" => Some(NotificationChannel::Email),
            _ => None,
        }
    }
}
