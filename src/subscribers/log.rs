//! # LogWriter: events to `tracing`
//!
//! Maps every [`Event`] to one `tracing` record with structured fields.
//! Lifecycle and transitions are logged at `info`, per-tick failures at `warn`.
//!
//! ## Example output
//! ```text
//! INFO live report started chat=42 message=7 report="status"
//! WARN edit failed chat=42 message=7 reason="transport error: operation timed out"
//! INFO live report stopped chat=42 message=7 reason="deadline_exceeded"
//! INFO watch transition watcher="units" key="nginx.service"
//! ```

use async_trait::async_trait;
use tracing::{debug, error, info, warn};

use crate::events::{Event, EventKind};
use crate::subscribers::Subscribe;

/// Event writer subscriber.
#[derive(Default)]
pub struct LogWriter;

impl LogWriter {
    /// Construct a new [`LogWriter`].
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Subscribe for LogWriter {
    async fn on_event(&self, e: &Event) {
        let source = e.source.as_deref().unwrap_or("-");
        let key = e.key.as_deref().unwrap_or("-");
        let reason = e.reason.as_deref().unwrap_or("-");

        match e.kind {
            EventKind::LiveStarted => {
                info!(chat = ?e.chat, message = ?e.message, report = source, "live report started");
            }
            EventKind::LiveReplaced => {
                info!(chat = ?e.chat, message = ?e.message, "live report superseded");
            }
            EventKind::LiveStopped => {
                info!(chat = ?e.chat, message = ?e.message, reason, "live report stopped");
            }
            EventKind::StartFailed => {
                warn!(chat = ?e.chat, report = source, reason, "live report start failed");
            }
            EventKind::ReportFailed => {
                warn!(chat = ?e.chat, report = source, reason, "report failed");
            }
            EventKind::EditFailed => {
                warn!(chat = ?e.chat, message = ?e.message, reason, "edit failed");
            }
            EventKind::WatchSampleFailed => {
                warn!(watcher = source, key, reason, "watch sample failed");
            }
            EventKind::WatchTransition => {
                info!(watcher = source, key, "watch transition");
            }
            EventKind::DeliveryFailed => {
                warn!(chat = ?e.chat, message = ?e.message, reason, "delivery failed");
            }
            EventKind::ShutdownRequested => {
                info!(cause = reason, "shutdown requested");
            }
            EventKind::AllStoppedWithin => {
                info!("all units stopped within grace");
            }
            EventKind::GraceExceeded => {
                error!(reason, "shutdown grace exceeded");
            }
            EventKind::SubscriberOverflow => {
                debug!(subscriber = source, reason, "subscriber dropped event");
            }
            EventKind::SubscriberPanicked => {
                error!(subscriber = source, reason, "subscriber panicked");
            }
        }
    }

    fn name(&self) -> &'static str {
        "log-writer"
    }
}
