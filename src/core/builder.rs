use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use crate::{
    config::Config,
    events::Bus,
    notify::{AuthorizedUsers, Broadcaster, NotifierRef},
    probe::Procfs,
    subscribers::{Subscribe, SubscriberSet},
};

use super::{
    engine::{Engine, Reporters},
    registry::TaskRegistry,
};

/// Builder for constructing an [`Engine`].
pub struct EngineBuilder {
    cfg: Config,
    notifier: NotifierRef,
    users: Arc<AuthorizedUsers>,
    subscribers: Vec<Arc<dyn Subscribe>>,
    reporters: Option<Reporters>,
}

impl EngineBuilder {
    /// Creates a new builder over the given transport and user set.
    pub fn new(cfg: Config, notifier: NotifierRef, users: Arc<AuthorizedUsers>) -> Self {
        Self {
            cfg,
            notifier,
            users,
            subscribers: Vec::new(),
            reporters: None,
        }
    }

    /// Sets event subscribers for observability.
    ///
    /// Subscribers receive runtime events (live reports, watcher transitions,
    /// delivery failures) through dedicated workers with bounded queues.
    pub fn with_subscribers(mut self, subscribers: Vec<Arc<dyn Subscribe>>) -> Self {
        self.subscribers = subscribers;
        self
    }

    /// Sets the reporters behind the status, network and process commands.
    ///
    /// Defaults to host reporters over `/proc`.
    pub fn with_reporters(mut self, reporters: Reporters) -> Self {
        self.reporters = Some(reporters);
        self
    }

    /// Builds the engine. Must be called inside a Tokio runtime.
    ///
    /// Initializes the event bus, the subscriber workers and their listener,
    /// the task registry and the broadcaster.
    pub fn build(self) -> Arc<Engine> {
        let bus = Bus::new(self.cfg.bus_capacity_clamped());
        let subs = SubscriberSet::new(self.subscribers, bus.clone());
        let runtime_token = CancellationToken::new();

        let registry = TaskRegistry::new(
            &self.cfg,
            self.notifier.clone(),
            bus.clone(),
            runtime_token.clone(),
        );
        let broadcaster = Arc::new(Broadcaster::new(self.notifier, self.users, bus.clone()));
        let reporters = self
            .reporters
            .unwrap_or_else(|| Reporters::from_procfs(Procfs::default()));

        Arc::new(Engine::new_internal(
            self.cfg,
            bus,
            subs,
            registry,
            broadcaster,
            reporters,
            runtime_token,
        ))
    }
}
