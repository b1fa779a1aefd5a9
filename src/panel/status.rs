use std::time::{Duration, Instant};

pub const STATUS_TTL: Duration = Duration::from_secs(3);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusKind {
    Info,
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusMessage {
    pub text: String,
    pub kind: StatusKind,
    pub posted_at: Instant,
}

/// Transient status line; a message disappears once its TTL has elapsed.
#[derive(Debug, Clone)]
pub struct StatusBanner {
    current: Option<StatusMessage>,
    ttl: Duration,
}

impl Default for StatusBanner {
    fn default() -> Self {
        Self::new(STATUS_TTL)
    }
}

impl StatusBanner {
    pub fn new(ttl: Duration) -> Self {
        Self { current: None, ttl }
    }

    pub fn post(&mut self, text: impl Into<String>, kind: StatusKind) {
        self.current = Some(StatusMessage {
            text: text.into(),
            kind,
            posted_at: Instant::now(),
        });
    }

    /// The message still showing at `now`.
    pub fn visible_at(&self, now: Instant) -> Option<&StatusMessage> {
        self.current
            .as_ref()
            .filter(|m| now.saturating_duration_since(m.posted_at) < self.ttl)
    }

    pub fn visible(&self) -> Option<&StatusMessage> {
        self.visible_at(Instant::now())
    }

    /// Last posted message regardless of expiry.
    pub fn last(&self) -> Option<&StatusMessage> {
        self.current.as_ref()
    }
}
