//! Notification boundary. Presentation is the host's concern.

use std::sync::Arc;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
    Info,
    Success,
    Warning,
    Error,
    /// Skill or agent level-up.
    Reward,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub kind: NotificationKind,
    pub title: String,
    pub message: String,
}

/// Receives user-visible notifications raised after state changes.
pub trait Notifier: Send + Sync + std::fmt::Debug {
    fn notify(&self, kind: NotificationKind, message: &str, title: &str);
}

/// Routes notifications to the `log` facade.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, kind: NotificationKind, message: &str, title: &str) {
        match kind {
            NotificationKind::Error => log::error!("{}: {}", title, message),
            NotificationKind::Warning => log::warn!("{}: {}", title, message),
            _ => log::info!("[{:?}] {}: {}", kind, title, message),
        }
    }
}

/// Keeps every notification in memory. Clones share the same buffer.
#[derive(Debug, Clone, Default)]
pub struct RecordingNotifier {
    records: Arc<Mutex<Vec<Notification>>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn notifications(&self) -> Vec<Notification> {
        self.records.lock().clone()
    }

    /// Drain everything recorded so far.
    pub fn take(&self) -> Vec<Notification> {
        std::mem::take(&mut *self.records.lock())
    }

    pub fn titles(&self) -> Vec<String> {
        self.records.lock().iter().map(|n| n.title.clone()).collect()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, kind: NotificationKind, message: &str, title: &str) {
        self.records.lock().push(Notification {
            kind,
            title: title.to_string(),
            message: message.to_string(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recording_notifier_shares_buffer() {
        let notifier = RecordingNotifier::new();
        let handle = notifier.clone();
        notifier.notify(NotificationKind::Reward, "Data Analysis reached level 2", "Skill up");
        assert_eq!(handle.titles(), vec!["Skill up".to_string()]);
        assert_eq!(handle.take().len(), 1);
        assert!(notifier.notifications().is_empty());
    }

    #[test]
    fn test_log_notifier_does_not_panic() {
        LogNotifier.notify(NotificationKind::Error, "boom", "Crash");
        LogNotifier.notify(NotificationKind::Info, "ok", "Note");
    }
}
