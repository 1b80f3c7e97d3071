//! Telegram Bot API transport.
//!
//! - [`TelegramApi`]: HTTP client and production `Notifier`
//! - [`poll_loop`]: long-polls updates and dispatches commands to the engine

mod api;
mod poller;
mod types;

pub use api::TelegramApi;
pub use poller::poll_loop;
