//! Transient notifications.
//!
//! Notifications are raised by the component that issued a request and
//! expire on their own after a fixed time. Time is read from
//! [`tokio::time::Instant`] so tests can pause the clock.

use std::time::Duration;

use tokio::time::Instant;
use uuid::Uuid;

/// Fallback shown when a failure carries no server detail.
pub const GENERIC_ERROR: &str = "An error occurred";

/// How long a notification stays visible unless configured otherwise.
pub const DEFAULT_TTL: Duration = Duration::from_millis(3000);

/// Severity of a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Success,
    Warning,
    Error,
}

/// A single toast.
#[derive(Debug, Clone)]
pub struct Notification {
    pub id: Uuid,
    pub level: Level,
    pub title: String,
    pub description: Option<String>,
    pub raised_at: Instant,
    pub ttl: Duration,
    pub closable: bool,
}

impl Notification {
    fn new(level: Level, title: impl Into<String>, description: Option<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            level,
            title: title.into(),
            description,
            raised_at: Instant::now(),
            ttl: DEFAULT_TTL,
            closable: true,
        }
    }

    pub fn success(title: impl Into<String>) -> Self {
        Self::new(Level::Success, title, None)
    }

    pub fn warning(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self::new(Level::Warning, title, Some(description.into()))
    }

    /// Error toast carrying the server's detail, or the generic fallback.
    pub fn error(title: impl Into<String>, detail: Option<&str>) -> Self {
        Self::new(
            Level::Error,
            title,
            Some(detail.unwrap_or(GENERIC_ERROR).to_string()),
        )
    }

    /// Whether the toast is still visible at `now`.
    #[must_use]
    pub fn is_active(&self, now: Instant) -> bool {
        now.saturating_duration_since(self.raised_at) < self.ttl
    }
}

/// Queue of raised notifications.
#[derive(Debug, Clone)]
pub struct Notifications {
    items: Vec<Notification>,
    ttl: Duration,
}

impl Default for Notifications {
    fn default() -> Self {
        Self::with_ttl(DEFAULT_TTL)
    }
}

impl Notifications {
    #[must_use]
    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            items: Vec::new(),
            ttl,
        }
    }

    /// Raise a notification, stamping it with the queue's time-to-live.
    pub fn push(&mut self, mut notification: Notification) -> Uuid {
        notification.ttl = self.ttl;
        let id = notification.id;
        tracing::debug!(
            name: "notification.raised",
            level = ?notification.level,
            title = %notification.title,
            "Notification raised"
        );
        self.items.push(notification);
        id
    }

    /// Notifications still visible at `now`, oldest first.
    pub fn active(&self, now: Instant) -> impl Iterator<Item = &Notification> {
        self.items.iter().filter(move |n| n.is_active(now))
    }

    /// Close a notification early. Returns whether it was present.
    pub fn dismiss(&mut self, id: Uuid) -> bool {
        let before = self.items.len();
        self.items.retain(|n| !(n.closable && n.id == id));
        self.items.len() != before
    }

    /// Close every closable notification still visible at `now`.
    ///
    /// Returns how many were closed.
    pub fn dismiss_active(&mut self, now: Instant) -> usize {
        let ids: Vec<Uuid> = self
            .active(now)
            .filter(|n| n.closable)
            .map(|n| n.id)
            .collect();
        ids.into_iter().filter(|id| self.dismiss(*id)).count()
    }

    /// Drop everything that expired before `now`.
    pub fn prune(&mut self, now: Instant) {
        self.items.retain(|n| n.is_active(now));
    }

    #[must_use]
    pub fn latest(&self) -> Option<&Notification> {
        self.items.last()
    }

    /// Every notification raised and not yet pruned, oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &Notification> {
        self.items.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
