//! # LiveTask: periodic refresh of one displayed message.
//!
//! One live task is bound to one chat, one displayed message and one
//! [`Reporter`](crate::Reporter). It rewrites that message on a fixed period
//! until it is cancelled, its deadline passes, or the message can no longer be
//! edited.
//!
//! ## Event flow
//! ```text
//! tick ──► deadline passed? ── yes ──► DeadlineExceeded
//!            │ no
//!            ▼
//!          report() ── Err ──► ReportFailed (next tick)
//!            │ Ok(text)
//!            ▼
//!          cancelled? ── yes ──► Cancelled
//!            │ no
//!            ▼
//!          edit(text) ──► Success / BenignNoOp ──► next tick
//!                     ├─► Terminal(reason)     ──► Terminal(reason)
//!                     └─► Transient            ──► EditFailed (next tick)
//! ```
//!
//! ## Rules
//! - Report and edit of one tick are sequential and never overlap the next tick.
//! - Cancellation is cooperative: an in-flight report or edit completes, then
//!   the loop exits without a further edit.
//! - Benign no-op edits publish nothing.

use std::time::Duration;

use tokio::time::{self, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use crate::error::TerminalReason;
use crate::events::{Bus, Event, EventKind};
use crate::notify::{ChatId, EditOutcome, MessageId, NotifierRef};
use crate::report::ReporterRef;

/// Why a live task loop exited.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// Stopped or superseded through its own token.
    Cancelled,
    /// The runtime is shutting down.
    Shutdown,
    /// The lifetime measured from start has passed.
    DeadlineExceeded,
    /// The displayed message can no longer be edited.
    Terminal(TerminalReason),
    /// The loop panicked (reporter or notifier bug).
    Panicked,
}

impl StopReason {
    /// Returns a short stable label (snake_case) for use in logs.
    pub fn as_label(&self) -> &'static str {
        match self {
            StopReason::Cancelled => "stopped",
            StopReason::Shutdown => "shutdown",
            StopReason::DeadlineExceeded => "deadline_exceeded",
            StopReason::Terminal(reason) => reason.as_label(),
            StopReason::Panicked => "panicked",
        }
    }

    /// True when the loop ended by itself rather than through a token.
    pub fn is_self_stop(&self) -> bool {
        matches!(
            self,
            StopReason::DeadlineExceeded | StopReason::Terminal(_) | StopReason::Panicked
        )
    }
}

/// Timing parameters of a live task.
#[derive(Clone, Copy, Debug)]
pub struct LiveParams {
    /// Period between refreshes.
    pub refresh: Duration,
    /// Lifetime measured from `started`.
    pub deadline: Duration,
}

/// Refresh loop for one displayed message.
pub struct LiveTask {
    pub chat: ChatId,
    pub message: MessageId,
    pub started: Instant,
    params: LiveParams,
    reporter: ReporterRef,
    notifier: NotifierRef,
    bus: Bus,
    shutdown: CancellationToken,
}

impl LiveTask {
    /// Creates a task that starts counting its lifetime now.
    ///
    /// `shutdown` is the runtime token; it only decides whether a cancellation
    /// is reported as [`StopReason::Shutdown`].
    pub fn new(
        chat: ChatId,
        message: MessageId,
        params: LiveParams,
        reporter: ReporterRef,
        notifier: NotifierRef,
        bus: Bus,
        shutdown: CancellationToken,
    ) -> Self {
        Self {
            chat,
            message,
            started: Instant::now(),
            params,
            reporter,
            notifier,
            bus,
            shutdown,
        }
    }

    fn cancelled(&self) -> StopReason {
        if self.shutdown.is_cancelled() {
            StopReason::Shutdown
        } else {
            StopReason::Cancelled
        }
    }

    /// Runs until cancelled, past the deadline, or terminally failed.
    pub async fn run(self, token: CancellationToken) -> StopReason {
        let period = self.params.refresh;
        let deadline = self.started + self.params.deadline;
        let mut ticker = time::interval_at(self.started + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                biased;
                _ = token.cancelled() => return self.cancelled(),
                _ = ticker.tick() => {}
            }

            if Instant::now() > deadline {
                return StopReason::DeadlineExceeded;
            }

            let text = match self.reporter.report().await {
                Ok(text) => text,
                Err(err) => {
                    self.bus.publish(
                        Event::new(EventKind::ReportFailed)
                            .with_chat(self.chat)
                            .with_source(self.reporter.name())
                            .with_reason(err.to_string()),
                    );
                    continue;
                }
            };

            if token.is_cancelled() {
                return self.cancelled();
            }

            let res = self.notifier.edit(self.chat, self.message, &text).await;
            match EditOutcome::from(res) {
                EditOutcome::Success | EditOutcome::BenignNoOp => {}
                EditOutcome::Terminal(reason) => return StopReason::Terminal(reason),
                EditOutcome::Transient(err) => {
                    self.bus.publish(
                        Event::new(EventKind::EditFailed)
                            .with_chat(self.chat)
                            .with_message(self.message)
                            .with_reason(err.to_string()),
                    );
                }
            }
        }
    }
}
