//! Core runtime: live report registry, refresh loop, engine and shutdown.
//!
//! - [`TaskRegistry`] keeps at most one [`LiveTask`] per chat
//! - [`Engine`] wires registry, watchers, broadcaster and subscribers together
//! - [`Command`] is what a chat can ask for

mod builder;
mod dispatch;
mod engine;
mod live;
mod registry;
mod shutdown;

pub use builder::EngineBuilder;
pub use dispatch::Command;
pub use engine::{Engine, Reporters};
pub use live::{LiveParams, LiveTask, StopReason};
pub use registry::TaskRegistry;
