//! # Watcher: periodic sampler with edge-triggered notices.
//!
//! A [`Watch`] describes what to read and which changes matter; the generic
//! [`Watcher`] loop owns the baselines and drives it on a timer.
//!
//! ```text
//! loop {
//!   ├─► tick (first one fires immediately)
//!   ├─► sample_all() ──► per key:
//!   │       ├─ Err  → WatchSampleFailed, baseline untouched
//!   │       └─ Ok(v) → Baselines::observe(key, v, classify)
//!   │                    └─ Some(text) → WatchTransition + broadcast(text)
//!   └─► cancelled? → exit
//! }
//! ```
//!
//! ## Rules
//! - Keys are sampled sequentially within a tick.
//! - The first value seen for a key never produces a notice.
//! - Cancellation is observed between ticks; an in-flight broadcast completes.

use std::fmt::Debug;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::time::{self, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use crate::error::ProbeError;
use crate::events::{Bus, Event, EventKind};
use crate::notify::Broadcaster;

use super::baseline::Baselines;

/// # One kind of watched external condition.
#[async_trait]
pub trait Watch: Send + Sync + 'static {
    /// Observed value of one key.
    type Value: Clone + PartialEq + Debug + Send + Sync + 'static;

    /// Stable watcher name (used in events).
    fn name(&self) -> &str;

    /// Watched keys, in notification order.
    fn keys(&self) -> Vec<String>;

    /// Reads the current value of `key`.
    async fn sample(&self, key: &str) -> Result<Self::Value, ProbeError>;

    /// Reads every key. Override when one scan serves all keys.
    async fn sample_all(&self) -> Vec<(String, Result<Self::Value, ProbeError>)> {
        let mut out = Vec::new();
        for key in self.keys() {
            let res = self.sample(&key).await;
            out.push((key, res));
        }
        out
    }

    /// Returns notice text when `prev → cur` is a transition worth reporting.
    ///
    /// Only called when the value actually changed.
    fn classify(&self, key: &str, prev: &Self::Value, cur: &Self::Value) -> Option<String>;
}

/// Drives one [`Watch`] until cancelled.
pub struct Watcher<W: Watch> {
    watch: W,
    period: Duration,
    baselines: Baselines<W::Value>,
    broadcaster: Arc<Broadcaster>,
    bus: Bus,
}

impl<W: Watch> Watcher<W> {
    /// Creates a watcher with every key unsampled.
    pub fn new(watch: W, period: Duration, broadcaster: Arc<Broadcaster>, bus: Bus) -> Self {
        Self {
            watch,
            period,
            baselines: Baselines::new(),
            broadcaster,
            bus,
        }
    }

    /// Runs until `token` is cancelled.
    pub async fn run(mut self, token: CancellationToken) {
        let mut ticker = time::interval(self.period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                biased;
                _ = token.cancelled() => break,
                _ = ticker.tick() => {}
            }
            self.tick().await;
        }
    }

    /// Samples every key once and broadcasts the resulting notices.
    pub(crate) async fn tick(&mut self) {
        let name = self.watch.name().to_string();
        for (key, res) in self.watch.sample_all().await {
            let value = match res {
                Ok(value) => value,
                Err(err) => {
                    self.bus.publish(
                        Event::new(EventKind::WatchSampleFailed)
                            .with_source(name.as_str())
                            .with_key(key.as_str())
                            .with_reason(err.to_string()),
                    );
                    continue;
                }
            };

            let watch = &self.watch;
            let notice = self
                .baselines
                .observe(&key, value, |prev, cur| watch.classify(&key, prev, cur));
            if let Some(text) = notice {
                self.bus.publish(
                    Event::new(EventKind::WatchTransition)
                        .with_source(name.as_str())
                        .with_key(key.as_str())
                        .with_reason(text.as_str()),
                );
                self.broadcaster.broadcast(&text).await;
            }
        }
    }
}
