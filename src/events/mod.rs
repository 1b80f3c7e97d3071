//! Runtime events: types and broadcast bus.
//!
//! This module groups the event **data model** and the **bus** used to
//! publish/subscribe to events emitted by the task registry, live report
//! loops, watchers, the broadcaster and the engine.
//!
//! ## Contents
//! - [`EventKind`], [`Event`] event classification and payload metadata
//! - [`Bus`] thin wrapper over `tokio::sync::broadcast`
//!
//! ## Quick reference
//! - **Publishers**: `TaskRegistry`, `LiveTask`, `Watcher`, `Broadcaster`, `Engine`,
//!   `SubscriberSet` workers (overflow/panic).
//! - **Consumers**: the engine's subscriber listener (fans out to `SubscriberSet`)
//!   and tests observing behavior.

mod bus;
mod event;

pub use bus::Bus;
pub use event::{Event, EventKind};
