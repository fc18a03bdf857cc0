//! Toast notifications.
//!
//! Every mutating action reports its outcome here. Toasts are queued for the
//! front end to display and mirrored into the log.

use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ToastLevel {
    Success,
    Info,
    Warning,
    Error,
}

#[derive(Debug, Clone, Serialize)]
pub struct Toast {
    pub id: Uuid,
    pub level: ToastLevel,
    pub message: String,
    pub created_at: DateTime<Utc>,
}

/// Shared toast queue. Clones share the same queue.
#[derive(Debug, Clone, Default)]
pub struct Toasts {
    queue: Arc<Mutex<Vec<Toast>>>,
}

impl Toasts {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, level: ToastLevel, message: impl Into<String>) {
        let message = message.into();
        match level {
            ToastLevel::Success | ToastLevel::Info => tracing::info!(toast = ?level, "{}", message),
            ToastLevel::Warning => tracing::warn!(toast = ?level, "{}", message),
            ToastLevel::Error => tracing::error!(toast = ?level, "{}", message),
        }

        let toast = Toast {
            id: Uuid::new_v4(),
            level,
            message,
            created_at: Utc::now(),
        };
        if let Ok(mut queue) = self.queue.lock() {
            queue.push(toast);
        }
    }

    pub fn success(&self, message: impl Into<String>) {
        self.push(ToastLevel::Success, message);
    }

    pub fn info(&self, message: impl Into<String>) {
        self.push(ToastLevel::Info, message);
    }

    pub fn warning(&self, message: impl Into<String>) {
        self.push(ToastLevel::Warning, message);
    }

    pub fn error(&self, message: impl Into<String>) {
        self.push(ToastLevel::Error, message);
    }

    /// Take every queued toast, oldest first.
    pub fn drain(&self) -> Vec<Toast> {
        self.queue
            .lock()
            .map(|mut queue| std::mem::take(&mut *queue))
            .unwrap_or_default()
    }

    /// Peek at the most recent toast.
    pub fn last(&self) -> Option<Toast> {
        self.queue.lock().ok().and_then(|queue| queue.last().cloned())
    }

    pub fn len(&self) -> usize {
        self.queue.lock().map(|queue| queue.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clones_share_queue() {
        let toasts = Toasts::new();
        let handle = toasts.clone();
        handle.success("Saved");
        toasts.error("Failed");

        assert_eq!(toasts.len(), 2);
        assert_eq!(toasts.last().unwrap().level, ToastLevel::Error);

        let drained = handle.drain();
        assert_eq!(drained[0].message, "Saved");
        assert!(toasts.is_empty());
    }
}
