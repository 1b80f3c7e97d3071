//! Raw HTTP calls to the Telegram Bot API.
//!
//! Wraps reqwest for `sendMessage`, `editMessageText`, `deleteMessage` and
//! `getUpdates`. [`TelegramApi`] is the production [`Notifier`].

use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use tracing::debug;

use crate::config::Config;
use crate::error::DeliveryError;
use crate::notify::{ChatId, MessageId, Notifier, truncate};

use super::types::{ApiResponse, SentMessage, Update};

/// Telegram Bot API client.
pub struct TelegramApi {
    client: Client,
    base_url: String,
    max_chars: usize,
    poll_timeout: u64,
}

impl TelegramApi {
    /// Creates a client for the given bot token.
    pub fn new(bot_token: &str, cfg: &Config) -> Result<Self, DeliveryError> {
        Self::with_base_url(bot_token, "https://api.telegram.org", cfg)
    }

    /// Creates a client with a custom base URL (for testing).
    pub fn with_base_url(bot_token: &str, base_url: &str, cfg: &Config) -> Result<Self, DeliveryError> {
        let client = Client::builder().timeout(cfg.request_timeout).build()?;
        Ok(Self {
            client,
            base_url: format!("{}/bot{}", base_url.trim_end_matches('/'), bot_token),
            max_chars: cfg.max_message_chars,
            poll_timeout: cfg.poll_timeout.as_secs(),
        })
    }

    /// Posts `body` to `method` and unwraps the API envelope.
    async fn call<T: DeserializeOwned>(&self, method: &str, body: Value) -> Result<T, DeliveryError> {
        let resp = self
            .client
            .post(format!("{}/{method}", self.base_url))
            .json(&body)
            .send()
            .await?;
        let status = resp.status();
        let raw = resp.text().await?;

        match serde_json::from_str::<ApiResponse<T>>(&raw) {
            Ok(ApiResponse {
                ok: true,
                result: Some(result),
                ..
            }) => Ok(result),
            Ok(api) if !api.ok => {
                debug!(method, code = ?api.error_code, "bot api call rejected");
                Err(DeliveryError::Api {
                    code: api.error_code,
                    description: api.description.unwrap_or_default(),
                })
            }
            Ok(_) => Err(DeliveryError::Transport(format!("{method}: empty result"))),
            Err(_) if !status.is_success() => Err(DeliveryError::Http {
                status: status.as_u16(),
                body: raw,
            }),
            Err(err) => Err(DeliveryError::Transport(format!("{method}: decode: {err}"))),
        }
    }

    /// Long-polls for new updates.
    ///
    /// `offset` should be `last_update_id + 1` to acknowledge earlier updates.
    pub async fn get_updates(&self, offset: i64) -> Result<Vec<Update>, DeliveryError> {
        let body = json!({
            "offset": offset,
            "timeout": self.poll_timeout,
            "allowed_updates": ["message"],
        });
        self.call("getUpdates", body).await
    }
}

#[async_trait]
impl Notifier for TelegramApi {
    async fn send(&self, chat: ChatId, text: &str) -> Result<MessageId, DeliveryError> {
        let body = json!({
            "chat_id": chat,
            "text": truncate(text, self.max_chars),
            "parse_mode": "HTML",
        });
        let sent: SentMessage = self.call("sendMessage", body).await?;
        Ok(sent.message_id)
    }

    async fn edit(&self, chat: ChatId, message: MessageId, text: &str) -> Result<(), DeliveryError> {
        let body = json!({
            "chat_id": chat,
            "message_id": message,
            "text": truncate(text, self.max_chars),
            "parse_mode": "HTML",
        });
        // `result` is the edited Message, or `true` for inline messages.
        self.call::<Value>("editMessageText", body).await.map(|_| ())
    }

    async fn delete(&self, chat: ChatId, message: MessageId) -> Result<(), DeliveryError> {
        let body = json!({
            "chat_id": chat,
            "message_id": message,
        });
        self.call::<bool>("deleteMessage", body).await.map(|_| ())
    }
}
