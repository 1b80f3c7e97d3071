//! # SubscriberSet: per-subscriber queues and workers.
//!
//! ```text
//! emit(&Event) ──► for each lane that accepts the kind:
//!                    try_send ── ok ──► queue ─► worker ─► on_event()
//!                             └─ full/closed ─► SubscriberOverflow
//! ```
//!
//! `emit` never waits. Each lane keeps publish order; lanes are unordered
//! relative to each other. A dropped event is reported once and never retried.

use std::any::Any;
use std::sync::Arc;

use futures::FutureExt;
use tokio::sync::mpsc::{self, error::TrySendError};
use tokio::task::JoinHandle;

use crate::events::{Bus, Event, EventKind};

use super::Subscribe;

/// One subscriber with its queue.
struct Lane {
    sub: Arc<dyn Subscribe>,
    tx: mpsc::Sender<Arc<Event>>,
}

/// Fan-out of events to a fixed list of subscribers.
pub struct SubscriberSet {
    lanes: Vec<Lane>,
    workers: Vec<JoinHandle<()>>,
    bus: Bus,
}

impl SubscriberSet {
    /// Spawns one worker per subscriber. Panics are published on `bus`.
    #[must_use]
    pub fn new(subs: Vec<Arc<dyn Subscribe>>, bus: Bus) -> Self {
        let mut lanes = Vec::with_capacity(subs.len());
        let mut workers = Vec::with_capacity(subs.len());

        for sub in subs {
            let (tx, rx) = mpsc::channel(sub.queue_capacity().max(1));
            workers.push(tokio::spawn(drive(Arc::clone(&sub), rx, bus.clone())));
            lanes.push(Lane { sub, tx });
        }

        Self {
            lanes,
            workers,
            bus,
        }
    }

    /// Queues `event` for every subscriber that accepts its kind.
    ///
    /// Overflow and panic reports are never themselves reported as overflow.
    pub fn emit(&self, event: &Event) {
        let self_report = matches!(
            event.kind,
            EventKind::SubscriberOverflow | EventKind::SubscriberPanicked
        );
        let mut shared: Option<Arc<Event>> = None;

        for lane in self.lanes.iter().filter(|l| l.sub.accepts(event.kind)) {
            let ev = shared.get_or_insert_with(|| Arc::new(event.clone()));
            let reason = match lane.tx.try_send(Arc::clone(ev)) {
                Ok(()) => continue,
                Err(TrySendError::Full(_)) => "full",
                Err(TrySendError::Closed(_)) => "closed",
            };
            if !self_report {
                self.bus
                    .publish(Event::subscriber_overflow(lane.sub.name(), reason));
            }
        }
    }

    /// Closes every queue and waits until the workers have drained them.
    pub async fn shutdown(self) {
        drop(self.lanes);
        for worker in self.workers {
            let _ = worker.await;
        }
    }

    /// Number of subscribers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lanes.len()
    }

    /// True if there are no subscribers.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lanes.is_empty()
    }
}

/// Worker loop of one subscriber; runs until its queue is closed and empty.
async fn drive(sub: Arc<dyn Subscribe>, mut rx: mpsc::Receiver<Arc<Event>>, bus: Bus) {
    while let Some(ev) = rx.recv().await {
        let handled = std::panic::AssertUnwindSafe(sub.on_event(&ev))
            .catch_unwind()
            .await;
        if let Err(payload) = handled {
            bus.publish(Event::subscriber_panicked(
                sub.name(),
                panic_message(payload.as_ref()),
            ));
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    payload
        .downcast_ref::<&'static str>()
        .map(|s| s.to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown panic".to_string())
}
