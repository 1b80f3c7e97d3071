//! # Event bus.
//!
//! Every runtime component holds a clone of the same [`Bus`] and publishes
//! into it; the engine's listener is the one reader that matters, tests may
//! attach more.
//!
//! ```text
//! LiveTask ─┐
//! Registry ─┤
//! Watcher  ─┼──► Bus (broadcast ring) ──► Engine listener ──► SubscriberSet
//! Engine   ─┘
//! ```
//!
//! Publishing never waits. A reader that falls more than `capacity` events
//! behind loses the oldest ones (`RecvError::Lagged`); events published while
//! nobody listens are gone.

use tokio::sync::broadcast;

use super::event::Event;

/// Shared handle to the broadcast channel. Clones publish into the same ring.
#[derive(Clone, Debug)]
pub struct Bus {
    tx: broadcast::Sender<Event>,
}

impl Bus {
    /// Creates a bus holding up to `capacity` undelivered events (min 1).
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    /// Hands `ev` to every current reader. Dropped silently without readers.
    pub fn publish(&self, ev: Event) {
        let _ = self.tx.send(ev);
    }

    /// Opens a reader that sees events published from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.tx.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::EventKind;

    #[tokio::test]
    async fn readers_see_events_in_publish_order() {
        let bus = Bus::new(4);
        let mut rx = bus.subscribe();
        bus.publish(Event::new(EventKind::ShutdownRequested));
        bus.publish(Event::new(EventKind::AllStoppedWithin));

        let first = rx.recv().await.unwrap();
        let second = rx.recv().await.unwrap();
        assert_eq!(first.kind, EventKind::ShutdownRequested);
        assert_eq!(second.kind, EventKind::AllStoppedWithin);
        assert!(first.seq < second.seq);
    }

    #[test]
    fn publish_without_readers_is_silent() {
        let bus = Bus::new(0);
        bus.publish(Event::new(EventKind::AllStoppedWithin));
    }
}
