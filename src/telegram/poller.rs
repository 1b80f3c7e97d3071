//! Long-polling loop for Telegram Bot API `getUpdates`.
//!
//! Filters incoming updates by sender, parses text commands and hands them to
//! the [`Engine`].

use std::sync::Arc;

use tokio::time;
use tracing::{debug, info, warn};

use crate::core::{Command, Engine};
use crate::notify::AuthorizedUsers;

use super::api::TelegramApi;
use super::types::Update;

/// Runs the long-polling loop until the engine's runtime token fires.
///
/// Every received update advances the offset, whether or not it is acted on.
/// A failed poll is retried after `Config::poll_retry`.
pub async fn poll_loop(api: Arc<TelegramApi>, engine: Arc<Engine>, users: Arc<AuthorizedUsers>) {
    let token = engine.shutdown_token();
    let retry = engine.config().poll_retry;
    let mut offset = 0;

    info!(users = users.len(), "telegram poller started");

    loop {
        let updates = tokio::select! {
            _ = token.cancelled() => break,
            res = api.get_updates(offset) => res,
        };

        match updates {
            Ok(updates) => {
                for update in updates {
                    offset = update.update_id + 1;
                    if let Some((chat, cmd)) = accept(&update, &users) {
                        engine.dispatch(chat, cmd).await;
                    }
                }
            }
            Err(err) => {
                warn!(error = %err, "getUpdates failed");
                tokio::select! {
                    _ = token.cancelled() => break,
                    _ = time::sleep(retry) => {}
                }
            }
        }
    }

    info!("telegram poller stopped");
}

/// Returns the chat and command an update asks for, if it should be handled.
fn accept(update: &Update, users: &AuthorizedUsers) -> Option<(i64, Command)> {
    let msg = update.message.as_ref()?;
    let from = msg.from.as_ref()?;
    if !users.contains(from.id) {
        debug!(user = from.id, "ignoring message from unauthorized user");
        return None;
    }
    let cmd = Command::parse(msg.text.as_deref()?)?;
    Some((msg.chat.id, cmd))
}
