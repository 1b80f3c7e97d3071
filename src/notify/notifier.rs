//! # Notifier contract.
//!
//! A [`Notifier`] delivers, edits and deletes messages in a chat. The engine
//! never talks to a transport directly; it only sees this trait and classifies
//! edit results through [`EditOutcome`].

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::{DeliveryError, FailureClass, TerminalReason};

/// Chat (or user) identifier.
pub type ChatId = i64;

/// Identifier of a message inside one chat.
pub type MessageId = i64;

/// Shared handle to a notifier.
pub type NotifierRef = Arc<dyn Notifier>;

/// Message delivery backend.
///
/// Implementations enforce their own bounded request timeout and truncate
/// overly long texts before sending or editing.
#[async_trait]
pub trait Notifier: Send + Sync + 'static {
    /// Sends a new message and returns its id.
    async fn send(&self, chat: ChatId, text: &str) -> Result<MessageId, DeliveryError>;

    /// Replaces the text of an existing message.
    async fn edit(&self, chat: ChatId, message: MessageId, text: &str)
    -> Result<(), DeliveryError>;

    /// Deletes a message. Callers treat failure as best-effort.
    async fn delete(&self, chat: ChatId, message: MessageId) -> Result<(), DeliveryError>;
}

/// Result of one edit, as seen by the live refresh loop.
#[derive(Debug)]
pub enum EditOutcome {
    /// The message now shows the new text.
    Success,
    /// The message already showed identical content.
    BenignNoOp,
    /// The message can never be edited again.
    Terminal(TerminalReason),
    /// Something went wrong this time; the next tick may succeed.
    Transient(DeliveryError),
}

impl EditOutcome {
    /// True for outcomes that keep the task running without a log entry.
    pub fn is_success(&self) -> bool {
        matches!(self, EditOutcome::Success | EditOutcome::BenignNoOp)
    }
}

impl From<Result<(), DeliveryError>> for EditOutcome {
    fn from(res: Result<(), DeliveryError>) -> Self {
        match res {
            Ok(()) => EditOutcome::Success,
            Err(err) => match err.classify() {
                FailureClass::BenignNoOp => EditOutcome::BenignNoOp,
                FailureClass::Terminal(reason) => EditOutcome::Terminal(reason),
                FailureClass::Transient => EditOutcome::Transient(err),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn outcome_from_result() {
        assert!(matches!(EditOutcome::from(Ok(())), EditOutcome::Success));

        let gone = Err(DeliveryError::Api {
            code: Some(400),
            description: "Bad Request: message to edit not found".into(),
        });
        assert!(matches!(
            EditOutcome::from(gone),
            EditOutcome::Terminal(TerminalReason::MessageGone)
        ));

        let same = Err(DeliveryError::Api {
            code: Some(400),
            description: "Bad Request: message is not modified".into(),
        });
        let outcome = EditOutcome::from(same);
        assert!(outcome.is_success());

        let flaky = Err(DeliveryError::Transport("connection reset".into()));
        assert!(matches!(EditOutcome::from(flaky), EditOutcome::Transient(_)));
    }
}
