//! Fire-and-forget toast notifications

use std::collections::VecDeque;
use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    Info,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub kind: NotificationKind,
    pub message: String,
    pub expires_at: Instant,
}

/// Queue of toasts, newest last. Expired entries are dropped on `prune`.
#[derive(Debug)]
pub struct Notifier {
    queue: VecDeque<Notification>,
    default_timeout: Duration,
}

impl Default for Notifier {
    fn default() -> Self {
        Self::new(Duration::from_secs(5))
    }
}

impl Notifier {
    pub fn new(default_timeout: Duration) -> Self {
        Self {
            queue: VecDeque::new(),
            default_timeout,
        }
    }

    pub fn notify(&mut self, kind: NotificationKind, message: impl Into<String>) {
        self.notify_for(kind, message, self.default_timeout);
    }

    pub fn notify_for(
        &mut self,
        kind: NotificationKind,
        message: impl Into<String>,
        timeout: Duration,
    ) {
        let message = message.into();
        if message.is_empty() {
            return;
        }
        match kind {
            NotificationKind::Info => tracing::info!("{}", message),
            NotificationKind::Error => tracing::warn!("{}", message),
        }
        self.queue.push_back(Notification {
            kind,
            message,
            expires_at: Instant::now() + timeout,
        });
    }

    /// Drop expired toasts. Returns true when anything was removed.
    pub fn prune(&mut self, now: Instant) -> bool {
        let before = self.queue.len();
        self.queue.retain(|n| n.expires_at > now);
        self.queue.len() != before
    }

    pub fn visible(&self) -> impl Iterator<Item = &Notification> {
        self.queue.iter()
    }

    #[cfg(test)]
    pub fn latest(&self) -> Option<&Notification> {
        self.queue.back()
    }
}
