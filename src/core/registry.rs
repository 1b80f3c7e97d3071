//! # Task registry: at most one live task per chat.
//!
//! The registry owns every live task handle (JoinHandle + CancellationToken)
//! and is the only place the chat → task map is touched.
//!
//! ## Architecture
//! ```text
//! start(chat, reporter)
//!   ├─► take old handle ─► cancel ─► join ─► delete old message   (LiveReplaced)
//!   ├─► reporter.report()   ── Err ─► StartError::Report         (StartFailed)
//!   ├─► notifier.send()     ── Err ─► StartError::Send           (StartFailed)
//!   └─► lock { spawn LiveTask; insert } ── displaced? ─► cancel in lock
//!                                                         delete after (LiveReplaced)
//!
//! stop(chat)
//!   └─► remove ─► cancel ─► join ─► delete message
//!
//! LiveTask exits by itself (deadline / terminal edit / panic)
//!   └─► remove only if the installed handle is still this task
//! ```
//!
//! ## Rules
//! - Install and displacement happen in one critical section, so two tasks
//!   never address the same chat.
//! - A failed start installs nothing.
//! - Message deletion is best-effort; failures publish `DeliveryFailed`.

use std::collections::HashMap;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use futures::FutureExt;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::config::Config;
use crate::core::live::{LiveParams, LiveTask, StopReason};
use crate::error::StartError;
use crate::events::{Bus, Event, EventKind};
use crate::notify::{ChatId, MessageId, NotifierRef};
use crate::report::ReporterRef;

/// Handle to a running live task.
struct Handle {
    /// Install id; distinguishes a task from its replacement.
    id: u64,
    /// Displayed message the task edits.
    message: MessageId,
    /// Join handle for the task loop.
    join: JoinHandle<StopReason>,
    /// Individual cancellation token for this task.
    cancel: CancellationToken,
}

/// Registry of live tasks keyed by chat.
pub struct TaskRegistry {
    tasks: Mutex<HashMap<ChatId, Handle>>,
    next_id: AtomicU64,
    params: LiveParams,
    notifier: NotifierRef,
    bus: Bus,
    runtime_token: CancellationToken,
}

impl TaskRegistry {
    /// Creates an empty registry. Task tokens are children of `runtime_token`.
    pub fn new(
        cfg: &Config,
        notifier: NotifierRef,
        bus: Bus,
        runtime_token: CancellationToken,
    ) -> Arc<Self> {
        Arc::new(Self {
            tasks: Mutex::new(HashMap::new()),
            next_id: AtomicU64::new(1),
            params: LiveParams {
                refresh: cfg.refresh,
                deadline: cfg.live_deadline,
            },
            notifier,
            bus,
            runtime_token,
        })
    }

    /// Replaces whatever runs for `chat` with a fresh live report.
    ///
    /// Returns the id of the newly displayed message.
    pub async fn start(
        self: &Arc<Self>,
        chat: ChatId,
        reporter: ReporterRef,
    ) -> Result<MessageId, StartError> {
        let old = self.tasks.lock().await.remove(&chat);
        if let Some(old) = old {
            self.retire(chat, old, true).await;
        }

        let res = self.open(chat, &reporter).await;
        let message = match res {
            Ok(message) => message,
            Err(err) => {
                self.bus.publish(
                    Event::new(EventKind::StartFailed)
                        .with_chat(chat)
                        .with_source(reporter.name())
                        .with_reason(err.to_string()),
                );
                return Err(err);
            }
        };

        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let cancel = self.runtime_token.child_token();
        let live = LiveTask::new(
            chat,
            message,
            self.params,
            reporter.clone(),
            self.notifier.clone(),
            self.bus.clone(),
            self.runtime_token.clone(),
        );

        let displaced = {
            let mut tasks = self.tasks.lock().await;
            let me = Arc::clone(self);
            let token = cancel.clone();
            let join = tokio::spawn(async move {
                let reason = AssertUnwindSafe(live.run(token))
                    .catch_unwind()
                    .await
                    .unwrap_or(StopReason::Panicked);
                me.finish(chat, id, message, reason).await;
                reason
            });
            let displaced = tasks.insert(
                chat,
                Handle {
                    id,
                    message,
                    join,
                    cancel,
                },
            );
            if let Some(prev) = &displaced {
                prev.cancel.cancel();
            }
            displaced
        };

        self.bus.publish(
            Event::new(EventKind::LiveStarted)
                .with_chat(chat)
                .with_message(message)
                .with_source(reporter.name()),
        );
        if let Some(prev) = displaced {
            self.retire(chat, prev, true).await;
        }
        Ok(message)
    }

    /// Stops the live report of `chat`; returns false when none was running.
    pub async fn stop(&self, chat: ChatId) -> bool {
        let handle = self.tasks.lock().await.remove(&chat);
        match handle {
            Some(handle) => {
                self.retire(chat, handle, false).await;
                true
            }
            None => false,
        }
    }

    /// Returns true when a live task is installed for `chat`.
    pub async fn contains(&self, chat: ChatId) -> bool {
        self.tasks.lock().await.contains_key(&chat)
    }

    /// Returns the message shown by the installed task of `chat`.
    pub async fn message_of(&self, chat: ChatId) -> Option<MessageId> {
        self.tasks.lock().await.get(&chat).map(|h| h.message)
    }

    /// Number of installed tasks.
    pub async fn len(&self) -> usize {
        self.tasks.lock().await.len()
    }

    /// Returns true if no task is installed.
    pub async fn is_empty(&self) -> bool {
        self.tasks.lock().await.is_empty()
    }

    /// Cancels every task and hands back their join handles.
    ///
    /// Displayed messages are left in place.
    pub(crate) async fn drain(&self) -> Vec<JoinHandle<StopReason>> {
        let handles: Vec<Handle> = self.tasks.lock().await.drain().map(|(_, h)| h).collect();
        for h in &handles {
            h.cancel.cancel();
        }
        handles.into_iter().map(|h| h.join).collect()
    }

    /// Produces the initial report and sends it.
    async fn open(&self, chat: ChatId, reporter: &ReporterRef) -> Result<MessageId, StartError> {
        let text = reporter.report().await?;
        Ok(self.notifier.send(chat, &text).await?)
    }

    /// Cancels a removed task, waits for it and deletes its message.
    async fn retire(&self, chat: ChatId, handle: Handle, replaced: bool) {
        handle.cancel.cancel();
        // The loop exits at its next check; an in-flight edit completes first.
        if let Err(err) = handle.join.await {
            self.bus.publish(
                Event::new(EventKind::LiveStopped)
                    .with_chat(chat)
                    .with_message(handle.message)
                    .with_reason(format!("{}: {err}", StopReason::Panicked.as_label())),
            );
        }

        if replaced {
            self.bus.publish(
                Event::new(EventKind::LiveReplaced)
                    .with_chat(chat)
                    .with_message(handle.message),
            );
        }
        if let Err(err) = self.notifier.delete(chat, handle.message).await {
            self.bus.publish(
                Event::new(EventKind::DeliveryFailed)
                    .with_chat(chat)
                    .with_message(handle.message)
                    .with_reason(err.to_string()),
            );
        }
    }

    /// Called by a task loop after it exits.
    async fn finish(&self, chat: ChatId, id: u64, message: MessageId, reason: StopReason) {
        if reason.is_self_stop() {
            let mut tasks = self.tasks.lock().await;
            if tasks.get(&chat).is_some_and(|h| h.id == id) {
                tasks.remove(&chat);
            }
        }
        self.bus.publish(
            Event::new(EventKind::LiveStopped)
                .with_chat(chat)
                .with_message(message)
                .with_reason(reason.as_label()),
        );
    }
}
