//! # Subscribe: pluggable consumers of runtime events.
//!
//! A subscriber sees the events it [accepts](Subscribe::accepts), one at a
//! time, on a worker of its own. A slow or panicking subscriber only hurts
//! itself: its queue fills and drops, its panic becomes
//! `EventKind::SubscriberPanicked`.
//!
//! ## Example
//! ```rust
//! use async_trait::async_trait;
//! use hostwatch::{Event, EventKind, Subscribe};
//!
//! /// Counts watcher alerts.
//! struct Alerts(std::sync::atomic::AtomicUsize);
//!
//! #[async_trait]
//! impl Subscribe for Alerts {
//!     async fn on_event(&self, _ev: &Event) {
//!         self.0.fetch_add(1, std::sync::atomic::Ordering::Relaxed);
//!     }
//!
//!     fn name(&self) -> &'static str { "alerts" }
//!
//!     fn accepts(&self, kind: EventKind) -> bool {
//!         kind == EventKind::WatchTransition
//!     }
//! }
//! ```

use async_trait::async_trait;

use crate::events::{Event, EventKind};

/// Consumer of runtime events.
///
/// `on_event` runs on the subscriber's own worker, so it may await I/O, but it
/// should not block the thread and should not panic.
#[async_trait]
pub trait Subscribe: Send + Sync + 'static {
    /// Handles one accepted event. Events arrive in publish order.
    async fn on_event(&self, event: &Event);

    /// Name used in overflow and panic reports.
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }

    /// Whether events of `kind` should be queued for this subscriber at all.
    fn accepts(&self, _kind: EventKind) -> bool {
        true
    }

    /// Queue length before new events are dropped (min 1).
    fn queue_capacity(&self) -> usize {
        1024
    }
}
