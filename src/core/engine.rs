//! # Engine: live reports, watchers, event fan-out and graceful shutdown.
//!
//! The [`Engine`] owns the event bus, the [`TaskRegistry`], the
//! [`Broadcaster`] and the runtime cancellation token. Commands come in
//! through [`Engine::dispatch`]; watchers are attached with
//! [`Engine::spawn_watcher`]; [`Engine::run`] blocks until shutdown.
//!
//! ## High-level architecture
//! ```text
//! poller ──► Engine::dispatch(chat, cmd)
//!               ├─► Status/Network/Process ─► TaskRegistry::start(chat, reporter)
//!               └─► Stop                   ─► TaskRegistry::stop(chat)
//!
//! Engine::spawn_watcher(watch, period)
//!               └─► Watcher::run(runtime_token.child_token())
//!                        └─► Broadcaster::broadcast(notice)
//!
//! Event flow:
//!   LiveTask / Watcher / Registry ── publish ──► Bus ──► listener ──► SubscriberSet
//!
//! Shutdown path:
//!   signal or runtime_token.cancel()
//!        └─► Bus.publish(ShutdownRequested)
//!        └─► runtime_token.cancel()   → live tasks and watchers
//!        └─► wait up to cfg.grace:
//!               ├─ all joined → AllStoppedWithin
//!               └─ timeout    → GraceExceeded + RuntimeError::GraceExceeded
//! ```
//!
//! Live messages are left in place on shutdown.

use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use futures::future::join_all;
use tokio::sync::broadcast::error::RecvError;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::config::Config;
use crate::core::{dispatch::Command, registry::TaskRegistry, shutdown};
use crate::error::{RuntimeError, StartError};
use crate::events::{Bus, Event, EventKind};
use crate::notify::{AuthorizedUsers, Broadcaster, ChatId, MessageId, NotifierRef};
use crate::probe::Procfs;
use crate::report::{NetworkReporter, ProcessReporter, ReporterRef, StatusReporter};
use crate::subscribers::SubscriberSet;
use crate::watch::{Watch, Watcher};

use super::builder::EngineBuilder;

/// The three reports a chat can ask for.
#[derive(Clone)]
pub struct Reporters {
    pub status: ReporterRef,
    pub network: ReporterRef,
    pub process: ReporterRef,
}

impl Reporters {
    /// Host reporters reading from `procfs`.
    pub fn from_procfs(procfs: Procfs) -> Self {
        Self {
            status: Arc::new(StatusReporter::new(procfs.clone())),
            network: Arc::new(NetworkReporter::new(procfs.clone())),
            process: Arc::new(ProcessReporter::new(procfs)),
        }
    }

    /// Reporter started by `cmd`, if it starts one.
    pub fn for_command(&self, cmd: Command) -> Option<&ReporterRef> {
        match cmd {
            Command::Status => Some(&self.status),
            Command::Network => Some(&self.network),
            Command::Process => Some(&self.process),
            Command::Stop => None,
        }
    }
}

/// Coordinates live reports, watchers, event delivery and shutdown.
pub struct Engine {
    cfg: Config,
    bus: Bus,
    registry: Arc<TaskRegistry>,
    broadcaster: Arc<Broadcaster>,
    reporters: Reporters,
    runtime_token: CancellationToken,
    watchers: Mutex<Vec<JoinHandle<()>>>,
    listener_stop: CancellationToken,
    listener: Mutex<Option<JoinHandle<()>>>,
}

impl Engine {
    /// Starts building an engine.
    pub fn builder(
        cfg: Config,
        notifier: NotifierRef,
        users: Arc<AuthorizedUsers>,
    ) -> EngineBuilder {
        EngineBuilder::new(cfg, notifier, users)
    }

    pub(super) fn new_internal(
        cfg: Config,
        bus: Bus,
        subs: SubscriberSet,
        registry: Arc<TaskRegistry>,
        broadcaster: Arc<Broadcaster>,
        reporters: Reporters,
        runtime_token: CancellationToken,
    ) -> Self {
        let listener_stop = CancellationToken::new();
        let listener = subscriber_listener(&bus, subs, listener_stop.clone());
        Self {
            cfg,
            bus,
            registry,
            broadcaster,
            reporters,
            runtime_token,
            watchers: Mutex::new(Vec::new()),
            listener_stop,
            listener: Mutex::new(Some(listener)),
        }
    }

    /// Returns the runtime configuration.
    pub fn config(&self) -> &Config {
        &self.cfg
    }

    /// Returns the event bus.
    pub fn bus(&self) -> &Bus {
        &self.bus
    }

    /// Returns the live task registry.
    pub fn registry(&self) -> &Arc<TaskRegistry> {
        &self.registry
    }

    /// Returns the broadcaster shared by watchers.
    pub fn broadcaster(&self) -> &Arc<Broadcaster> {
        &self.broadcaster
    }

    /// Returns the runtime token; cancelling it starts shutdown.
    pub fn shutdown_token(&self) -> CancellationToken {
        self.runtime_token.clone()
    }

    /// Starts (or restarts) a live report for `chat`.
    pub async fn start_live(
        &self,
        chat: ChatId,
        reporter: ReporterRef,
    ) -> Result<MessageId, StartError> {
        self.registry.start(chat, reporter).await
    }

    /// Stops the live report of `chat`, if any.
    pub async fn stop_live(&self, chat: ChatId) -> bool {
        self.registry.stop(chat).await
    }

    /// Executes one chat command.
    ///
    /// Start failures are already published as `StartFailed`; nothing is
    /// returned to the chat.
    pub async fn dispatch(&self, chat: ChatId, cmd: Command) {
        match self.reporters.for_command(cmd) {
            Some(reporter) => {
                let _ = self.start_live(chat, reporter.clone()).await;
            }
            None => {
                self.stop_live(chat).await;
            }
        }
    }

    /// Runs `watch` every `period` until shutdown. The first sample is taken now.
    pub fn spawn_watcher<W: Watch>(&self, watch: W, period: Duration) {
        let watcher = Watcher::new(
            watch,
            period,
            Arc::clone(&self.broadcaster),
            self.bus.clone(),
        );
        let handle = tokio::spawn(watcher.run(self.runtime_token.child_token()));
        self.watchers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(handle);
    }

    /// Waits for a termination signal (or the runtime token), then stops every
    /// unit within [`Config::grace`].
    pub async fn run(&self) -> Result<(), RuntimeError> {
        let cause = tokio::select! {
            sig = shutdown::terminated() => sig.as_label(),
            _ = self.runtime_token.cancelled() => "requested",
        };

        self.bus
            .publish(Event::new(EventKind::ShutdownRequested).with_reason(cause));
        self.runtime_token.cancel();
        let res = self.wait_all_with_grace().await;
        self.stop_listener().await;
        res
    }

    /// Waits for live tasks and watchers to finish within the grace period.
    async fn wait_all_with_grace(&self) -> Result<(), RuntimeError> {
        let grace = self.cfg.grace;
        let mut live = self.registry.drain().await;
        let mut watchers: Vec<JoinHandle<()>> = std::mem::take(
            &mut *self.watchers.lock().unwrap_or_else(PoisonError::into_inner),
        );

        let done = async {
            join_all(live.iter_mut()).await;
            join_all(watchers.iter_mut()).await;
        };
        match tokio::time::timeout(grace, done).await {
            Ok(()) => {
                self.bus.publish(Event::new(EventKind::AllStoppedWithin));
                Ok(())
            }
            Err(_) => {
                let stuck = live.iter().filter(|h| !h.is_finished()).count()
                    + watchers.iter().filter(|h| !h.is_finished()).count();
                self.bus.publish(
                    Event::new(EventKind::GraceExceeded).with_reason(format!("{stuck} stuck")),
                );
                Err(RuntimeError::GraceExceeded { grace, stuck })
            }
        }
    }

    /// Flushes pending events to subscribers and waits for their workers.
    async fn stop_listener(&self) {
        self.listener_stop.cancel();
        let handle = self
            .listener
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(handle) = handle {
            let _ = handle.await;
        }
    }
}

/// Forwards bus events to the subscriber set until `stop`, then drains and
/// shuts the set down.
fn subscriber_listener(bus: &Bus, set: SubscriberSet, stop: CancellationToken) -> JoinHandle<()> {
    let mut rx = bus.subscribe();
    tokio::spawn(async move {
        loop {
            tokio::select! {
                biased;
                msg = rx.recv() => match msg {
                    Ok(ev) => set.emit(&ev),
                    Err(RecvError::Lagged(_)) => continue,
                    Err(RecvError::Closed) => break,
                },
                _ = stop.cancelled() => {
                    while let Ok(ev) = rx.try_recv() {
                        set.emit(&ev);
                    }
                    break;
                }
            }
        }
        set.shutdown().await;
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Mutex as StdMutex;

    use crate::error::{ProbeError, ReportError};
    use crate::events::Event;
    use crate::report::ReporterFn;
    use crate::subscribers::Subscribe;
    use crate::testing::FakeNotifier;

    fn reporters() -> Reporters {
        let make = |name: &'static str| -> ReporterRef {
            ReporterFn::arc(name, move || async move { Ok::<_, ReportError>(name.to_string()) })
        };
        Reporters {
            status: make("status"),
            network: make("network"),
            process: make("process"),
        }
    }

    struct Record(Arc<StdMutex<Vec<EventKind>>>);

    #[async_trait]
    impl Subscribe for Record {
        async fn on_event(&self, ev: &Event) {
            self.0.lock().unwrap().push(ev.kind);
        }
        fn name(&self) -> &'static str {
            "record"
        }
    }

    fn engine(notifier: &Arc<FakeNotifier>, seen: &Arc<StdMutex<Vec<EventKind>>>) -> Arc<Engine> {
        let users = Arc::new(AuthorizedUsers::new([1, 2]).unwrap());
        Engine::builder(Config::default(), notifier.clone(), users)
            .with_subscribers(vec![Arc::new(Record(seen.clone()))])
            .with_reporters(reporters())
            .build()
    }

    /// A watch whose sampling never finishes.
    struct Hang;

    #[async_trait]
    impl Watch for Hang {
        type Value = u8;

        fn name(&self) -> &str {
            "hang"
        }

        fn keys(&self) -> Vec<String> {
            vec!["k".into()]
        }

        async fn sample(&self, _key: &str) -> Result<u8, ProbeError> {
            std::future::pending().await
        }

        fn classify(&self, _key: &str, _prev: &u8, _cur: &u8) -> Option<String> {
            None
        }
    }

    #[tokio::test(start_paused = true)]
    async fn dispatch_starts_replaces_and_stops() {
        let notifier = Arc::new(FakeNotifier::new());
        let seen = Arc::new(StdMutex::new(Vec::new()));
        let engine = engine(&notifier, &seen);

        engine.dispatch(5, Command::Status).await;
        engine.dispatch(5, Command::Network).await;
        let texts: Vec<_> = notifier.sent().into_iter().map(|s| s.text).collect();
        assert_eq!(texts, vec!["status", "network"]);
        assert_eq!(engine.registry().len().await, 1);

        engine.dispatch(5, Command::Stop).await;
        assert!(engine.registry().is_empty().await);
        assert_eq!(notifier.deleted().len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn shutdown_within_grace_flushes_events() {
        let notifier = Arc::new(FakeNotifier::new());
        let seen = Arc::new(StdMutex::new(Vec::new()));
        let engine = engine(&notifier, &seen);

        engine.dispatch(5, Command::Process).await;
        engine.shutdown_token().cancel();
        engine.run().await.unwrap();

        let seen = seen.lock().unwrap().clone();
        assert!(seen.contains(&EventKind::LiveStarted));
        assert!(seen.contains(&EventKind::ShutdownRequested));
        assert_eq!(seen.last(), Some(&EventKind::AllStoppedWithin));
        assert!(notifier.deleted().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn stuck_watcher_exceeds_grace() {
        let notifier = Arc::new(FakeNotifier::new());
        let seen = Arc::new(StdMutex::new(Vec::new()));
        let engine = engine(&notifier, &seen);

        engine.spawn_watcher(Hang, Duration::from_secs(30));
        tokio::task::yield_now().await;
        engine.shutdown_token().cancel();

        let err = engine.run().await.unwrap_err();
        assert!(matches!(err, RuntimeError::GraceExceeded { stuck: 1, .. }));
    }
}
