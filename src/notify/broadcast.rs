//! # Broadcaster: best-effort fan-out of one notice to every authorized user.
//!
//! ```text
//! broadcast(text)
//!     ├──► send(user 1, text) ─┐
//!     ├──► send(user 2, text) ─┼─► join_all ─► failures published as DeliveryFailed
//!     └──► send(user N, text) ─┘
//! ```
//!
//! ## Rules
//! - Sends run concurrently and independently; one failure never skips another user.
//! - No retries and no aggregate result.

use std::sync::Arc;

use futures::future::join_all;

use crate::events::{Bus, Event, EventKind};

use super::{AuthorizedUsers, NotifierRef};

/// Fans notices out to the authorized user set.
pub struct Broadcaster {
    notifier: NotifierRef,
    users: Arc<AuthorizedUsers>,
    bus: Bus,
}

impl Broadcaster {
    /// Creates a broadcaster over the given notifier and user set.
    pub fn new(notifier: NotifierRef, users: Arc<AuthorizedUsers>, bus: Bus) -> Self {
        Self {
            notifier,
            users,
            bus,
        }
    }

    /// Returns the authorized user set.
    pub fn users(&self) -> &AuthorizedUsers {
        &self.users
    }

    /// Sends `text` to every authorized user; returns once every attempt has finished.
    pub async fn broadcast(&self, text: &str) {
        let sends = self.users.iter().map(|user| async move {
            let res = self.notifier.send(user, text).await;
            (user, res)
        });

        for (user, res) in join_all(sends).await {
            if let Err(err) = res {
                self.bus.publish(
                    Event::new(EventKind::DeliveryFailed)
                        .with_chat(user)
                        .with_reason(err.to_string()),
                );
            }
        }
    }
}
