use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    Success,
    Error,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub notification_id: String,
    pub kind: NotificationKind,
    pub message: String,
    pub event_type: String,
    pub metadata: BTreeMap<String, String>,
    pub occurred_at: DateTime<Utc>,
}

impl Notification {
    pub fn new(
        kind: NotificationKind,
        event_type: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            notification_id: Uuid::new_v4().to_string(),
            kind,
            message: message.into(),
            event_type: event_type.into(),
            metadata: BTreeMap::new(),
            occurred_at: Utc::now(),
        }
    }

    pub fn success(event_type: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(NotificationKind::Success, event_type, message)
    }

    pub fn error(event_type: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(NotificationKind::Error, event_type, message)
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }
}

/// Toast/analytics outlet. Fire-and-forget: the engine never waits on or inspects delivery.
pub trait NotificationSink: Send + Sync {
    fn notify(&self, notification: Notification);
}

#[derive(Clone, Default)]
pub struct InMemoryNotificationSink {
    notifications: Arc<Mutex<Vec<Notification>>>,
}

impl InMemoryNotificationSink {
    pub fn notifications(&self) -> Vec<Notification> {
        match self.notifications.lock() {
            Ok(notifications) => notifications.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    pub fn messages(&self) -> Vec<String> {
        self.notifications().into_iter().map(|notification| notification.message).collect()
    }
}

impl NotificationSink for InMemoryNotificationSink {
    fn notify(&self, notification: Notification) {
        match self.notifications.lock() {
            Ok(mut notifications) => notifications.push(notification),
            Err(poisoned) => poisoned.into_inner().push(notification),
        }
    }
}

/// Forwards notifications to the log.
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingNotificationSink;

impl NotificationSink for TracingNotificationSink {
    fn notify(&self, notification: Notification) {
        match notification.kind {
            NotificationKind::Success => tracing::info!(
                event_name = %notification.event_type,
                notification_id = %notification.notification_id,
                metadata = ?notification.metadata,
                "{}",
                notification.message
            ),
            NotificationKind::Error => tracing::warn!(
                event_name = %notification.event_type,
                notification_id = %notification.notification_id,
                metadata = ?notification.metadata,
                "{}",
                notification.message
            ),
        }
    }
}
