//! # hostwatch
//!
//! **hostwatch** is a Telegram bot that serves live host reports to a fixed
//! set of users and alerts them about host-level changes.
//!
//! A user sends `/status`, `/network` or `/process`; the bot answers with a
//! report and keeps rewriting that message every couple of seconds for ten
//! minutes. `/stop` deletes it. In the background, watchers poll the boot time,
//! the processes running out of configured directories and the state of
//! systemd units, and broadcast a notice to every user on each change.
//!
//! ## Architecture
//! ```text
//!   poll_loop (getUpdates)
//!        │ authorized command
//!        ▼
//! ┌───────────────────────────────────────────────────────────────────┐
//! │  Engine                                                           │
//! │  - Bus (broadcast events)                                         │
//! │  - TaskRegistry (one live report per chat)                        │
//! │  - Broadcaster (one notice to every authorized user)              │
//! │  - SubscriberSet (fans events out to subscribers)                 │
//! └──────┬──────────────────────────────┬─────────────────────────────┘
//!        ▼                              ▼
//!   ┌──────────────┐             ┌──────────────┐
//!   │   LiveTask   │             │   Watcher    │  RebootWatch / DirWatch /
//!   │ (edit loop)  │             │ (poll loop)  │  UnitWatch
//!   └──────┬───────┘             └──────┬───────┘
//!          │ Notifier::edit             │ Broadcaster::broadcast
//!          ▼                            ▼
//!                    TelegramApi (Bot API over HTTPS)
//! ```
//!
//! ### Live report lifecycle
//! ```text
//! start(chat, reporter)
//!   ├─► report() ─► send() ─► install (replacing and deleting any previous one)
//!   └─► every refresh:
//!         ├─ past deadline          ─► LiveStopped(deadline_exceeded), exit
//!         ├─ report() fails         ─► ReportFailed, next tick
//!         └─ edit():
//!              ├─ ok / not modified ─► next tick
//!              ├─ message gone      ─► LiveStopped(message_gone), exit
//!              └─ anything else     ─► EditFailed, next tick
//! ```
//!
//! ## Features
//! | Area              | Description                                          | Key types / traits                          |
//! |-------------------|------------------------------------------------------|---------------------------------------------|
//! | **Engine**        | Commands, watchers and graceful shutdown.            | [`Engine`], [`EngineBuilder`], [`Command`]  |
//! | **Live reports**  | One refreshing message per chat.                     | [`TaskRegistry`], [`LiveTask`]              |
//! | **Reports**       | Host status, network and process summaries.          | [`Reporter`], [`ReporterFn`]                |
//! | **Watchers**      | Edge-triggered host alerts.                          | [`Watch`], [`Watcher`], [`Baselines`]       |
//! | **Delivery**      | Messaging contract and the Bot API transport.        | [`Notifier`], [`TelegramApi`]               |
//! | **Subscriber API**| Hook into runtime events.                            | [`Subscribe`], [`LogWriter`]                |
//! | **Errors**        | Typed errors with stable labels.                     | [`DeliveryError`], [`RuntimeError`]         |
//! | **Configuration** | Timers, limits and watch targets.                    | [`Config`], [`WatchConfig`]                 |
//!
//! ## Example
//! ```rust,no_run
//! use std::sync::Arc;
//! use hostwatch::{AuthorizedUsers, Config, Engine, LogWriter, TelegramApi, poll_loop};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let cfg = Config::default();
//!     let users = Arc::new(AuthorizedUsers::parse("123456789")?);
//!     let api = Arc::new(TelegramApi::new("bot-token", &cfg)?);
//!
//!     let engine = Engine::builder(cfg, api.clone(), users.clone())
//!         .with_subscribers(vec![Arc::new(LogWriter::new())])
//!         .build();
//!
//!     tokio::spawn(poll_loop(api, Arc::clone(&engine), users));
//!     engine.run().await?;
//!     Ok(())
//! }
//! ```
pub mod config;
mod core;
mod error;
mod events;
pub mod notify;
pub mod probe;
pub mod report;
mod subscribers;
pub mod telegram;
pub mod watch;

#[cfg(test)]
mod testing;

// ---- Public re-exports ----

pub use config::{Config, WatchConfig};
pub use core::{Command, Engine, EngineBuilder, LiveParams, LiveTask, Reporters, StopReason, TaskRegistry};
pub use error::{
    ConfigError, DeliveryError, FailureClass, ProbeError, ReportError, RuntimeError, StartError,
    TerminalReason,
};
pub use events::{Bus, Event, EventKind};
pub use notify::{AuthorizedUsers, Broadcaster, EditOutcome, Notifier, NotifierRef};
pub use report::{Reporter, ReporterFn, ReporterRef};
pub use subscribers::{LogWriter, Subscribe, SubscriberSet};
pub use telegram::{TelegramApi, poll_loop};
pub use watch::{Baselines, Watch, Watcher};
