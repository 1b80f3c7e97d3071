//! Test doubles shared by unit tests.

use std::collections::{HashSet, VecDeque};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use tokio::time::Instant;

use crate::error::DeliveryError;
use crate::notify::{ChatId, MessageId, Notifier};

#[derive(Clone, Debug)]
pub(crate) struct Sent {
    pub chat: ChatId,
    pub message: MessageId,
    pub text: String,
}

#[derive(Clone, Debug)]
pub(crate) struct Edited {
    pub chat: ChatId,
    pub message: MessageId,
    pub text: String,
    pub at: Instant,
}

#[derive(Default)]
struct State {
    next_id: MessageId,
    sent: Vec<Sent>,
    edits: Vec<Edited>,
    deleted: Vec<(ChatId, MessageId)>,
    edit_script: VecDeque<Result<(), DeliveryError>>,
    failing: HashSet<ChatId>,
}

/// Records every call; edits answer from a script, then succeed.
#[derive(Default)]
pub(crate) struct FakeNotifier {
    state: Mutex<State>,
    send_attempts: AtomicUsize,
}

impl FakeNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_sends_to(&self, chat: ChatId) {
        self.state.lock().unwrap().failing.insert(chat);
    }

    pub fn script_edit(&self, res: Result<(), DeliveryError>) {
        self.state.lock().unwrap().edit_script.push_back(res);
    }

    pub fn sent(&self) -> Vec<Sent> {
        self.state.lock().unwrap().sent.clone()
    }

    pub fn send_attempts(&self) -> usize {
        self.send_attempts.load(Ordering::SeqCst)
    }

    pub fn edits(&self) -> Vec<Edited> {
        self.state.lock().unwrap().edits.clone()
    }

    pub fn edits_of(&self, message: MessageId) -> Vec<Edited> {
        self.edits()
            .into_iter()
            .filter(|e| e.message == message)
            .collect()
    }

    pub fn deleted(&self) -> Vec<(ChatId, MessageId)> {
        self.state.lock().unwrap().deleted.clone()
    }
}

pub(crate) fn api_error(description: &str) -> DeliveryError {
    DeliveryError::Api {
        code: Some(400),
        description: description.to_string(),
    }
}

#[async_trait]
impl Notifier for FakeNotifier {
    async fn send(&self, chat: ChatId, text: &str) -> Result<MessageId, DeliveryError> {
        self.send_attempts.fetch_add(1, Ordering::SeqCst);
        let mut state = self.state.lock().unwrap();
        if state.failing.contains(&chat) {
            return Err(api_error("Forbidden: bot was blocked by the user"));
        }
        state.next_id += 1;
        let message = state.next_id;
        state.sent.push(Sent {
            chat,
            message,
            text: text.to_string(),
        });
        Ok(message)
    }

    async fn edit(
        &self,
        chat: ChatId,
        message: MessageId,
        text: &str,
    ) -> Result<(), DeliveryError> {
        let mut state = self.state.lock().unwrap();
        state.edits.push(Edited {
            chat,
            message,
            text: text.to_string(),
            at: Instant::now(),
        });
        state.edit_script.pop_front().unwrap_or(Ok(()))
    }

    async fn delete(&self, chat: ChatId, message: MessageId) -> Result<(), DeliveryError> {
        self.state.lock().unwrap().deleted.push((chat, message));
        Ok(())
    }
}
