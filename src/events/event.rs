//! # Runtime events emitted by the registry, live tasks, watchers and engine.
//!
//! The [`EventKind`] enum classifies event types across four categories:
//! - **Live report events**: start, replacement, stop, per-tick failures
//! - **Watcher events**: sample failures and detected transitions
//! - **Delivery events**: best-effort sends/deletes that failed
//! - **Runtime events**: shutdown and subscriber health
//!
//! The [`Event`] struct carries additional metadata such as the chat, the
//! displayed message, the reporter or watcher name, the watched key and a reason.
//!
//! ## Ordering guarantees
//! Each event has a globally unique sequence number (`seq`) that increases monotonically.
//!
//! ## Example
//! ```rust
//! use hostwatch::{Event, EventKind};
//!
//! let ev = Event::new(EventKind::EditFailed)
//!     .with_chat(42)
//!     .with_message(7)
//!     .with_reason("timeout");
//!
//! assert_eq!(ev.kind, EventKind::EditFailed);
//! assert_eq!(ev.chat, Some(42));
//! assert_eq!(ev.reason.as_deref(), Some("timeout"));
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::time::SystemTime;

use crate::notify::{ChatId, MessageId};

/// Global sequence counter for event ordering.
static EVENT_SEQ: AtomicU64 = AtomicU64::new(0);

/// Classification of runtime events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    // === Subscriber events ===
    /// Subscriber panicked during event processing.
    ///
    /// Sets `source` (subscriber name) and `reason` (panic message).
    SubscriberPanicked,

    /// Subscriber dropped an event (queue full or worker closed).
    ///
    /// Sets `source` (subscriber name) and `reason` ("full" / "closed").
    SubscriberOverflow,

    // === Shutdown events ===
    /// Shutdown requested (OS signal observed or token cancelled).
    ShutdownRequested,

    /// All units stopped within the configured grace period.
    AllStoppedWithin,

    /// Grace period exceeded; some units did not stop in time.
    GraceExceeded,

    // === Live report events ===
    /// A live report was installed for a chat.
    ///
    /// Sets `chat`, `message` (displayed message) and `source` (reporter name).
    LiveStarted,

    /// A live report was superseded by a newer one for the same chat.
    ///
    /// Sets `chat` and `message` (the superseded message).
    LiveReplaced,

    /// A live report loop has exited.
    ///
    /// Sets `chat`, `message` and `reason` (stop reason label).
    LiveStopped,

    /// Starting a live report failed; nothing was installed.
    ///
    /// Sets `chat`, `source` (reporter name) and `reason`.
    StartFailed,

    /// A reporter failed for one tick.
    ///
    /// Sets `chat`, `source` (reporter name) and `reason`.
    ReportFailed,

    /// An edit failed transiently for one tick.
    ///
    /// Sets `chat`, `message` and `reason`.
    EditFailed,

    // === Watcher events ===
    /// Reading one watched key failed; its baseline was left untouched.
    ///
    /// Sets `source` (watcher name), `key` and `reason`.
    WatchSampleFailed,

    /// A watched key crossed a transition edge; a notice is being broadcast.
    ///
    /// Sets `source` (watcher name), `key` and `reason` (notice text).
    WatchTransition,

    // === Delivery events ===
    /// A best-effort send or delete failed.
    ///
    /// Sets `chat`, optionally `message`, and `reason`.
    DeliveryFailed,
}

/// Runtime event with optional metadata.
///
/// - `seq`: monotonic global sequence for ordering
/// - `at`: wall-clock timestamp (for logs)
/// - other optional fields are set depending on the [`EventKind`]
#[derive(Clone, Debug)]
pub struct Event {
    /// Globally unique, monotonically increasing sequence number.
    pub seq: u64,
    /// Wall-clock timestamp.
    pub at: SystemTime,
    /// Event classification.
    pub kind: EventKind,

    /// Chat (or user) the event concerns.
    pub chat: Option<ChatId>,
    /// Displayed message the event concerns.
    pub message: Option<MessageId>,
    /// Reporter, watcher or subscriber name.
    pub source: Option<Arc<str>>,
    /// Watched key (directory, unit, boot).
    pub key: Option<Arc<str>>,
    /// Human-readable reason (errors, stop labels, notice text).
    pub reason: Option<Arc<str>>,
}

impl Event {
    /// Creates a new event of the given kind with current timestamp and next sequence number.
    pub fn new(kind: EventKind) -> Self {
        Self {
            seq: EVENT_SEQ.fetch_add(1, AtomicOrdering::Relaxed),
            at: SystemTime::now(),
            kind,
            chat: None,
            message: None,
            source: None,
            key: None,
            reason: None,
        }
    }

    /// Attaches a chat id.
    #[inline]
    pub fn with_chat(mut self, chat: ChatId) -> Self {
        self.chat = Some(chat);
        self
    }

    /// Attaches a message id.
    #[inline]
    pub fn with_message(mut self, message: MessageId) -> Self {
        self.message = Some(message);
        self
    }

    /// Attaches a reporter, watcher or subscriber name.
    #[inline]
    pub fn with_source(mut self, source: impl Into<Arc<str>>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// Attaches a watched key.
    #[inline]
    pub fn with_key(mut self, key: impl Into<Arc<str>>) -> Self {
        self.key = Some(key.into());
        self
    }

    /// Attaches a human-readable reason.
    #[inline]
    pub fn with_reason(mut self, reason: impl Into<Arc<str>>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    /// Creates a subscriber overflow event.
    #[inline]
    pub fn subscriber_overflow(subscriber: &'static str, reason: &'static str) -> Self {
        Event::new(EventKind::SubscriberOverflow)
            .with_source(subscriber)
            .with_reason(reason)
    }

    /// Creates a subscriber panic event.
    #[inline]
    pub fn subscriber_panicked(subscriber: &'static str, info: String) -> Self {
        Event::new(EventKind::SubscriberPanicked)
            .with_source(subscriber)
            .with_reason(info)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sequence_numbers_increase() {
        let a = Event::new(EventKind::LiveStarted);
        let b = Event::new(EventKind::LiveStopped);
        assert!(b.seq > a.seq);
    }

    #[test]
    fn builders_fill_fields() {
        let ev = Event::new(EventKind::WatchTransition)
            .with_source("units")
            .with_key("nginx.service")
            .with_reason("inactive");
        assert_eq!(ev.source.as_deref(), Some("units"));
        assert_eq!(ev.key.as_deref(), Some("nginx.service"));
        assert!(ev.chat.is_none());
    }
}
