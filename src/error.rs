//! Error types used by the hostwatch runtime, its transport and its readers.
//!
//! - [`DeliveryError`]: a Notifier call (send/edit/delete) failed.
//! - [`ReportError`]: a reporter could not produce text this tick.
//! - [`ProbeError`]: a watcher could not read the current value of one key.
//! - [`StartError`]: a live report could not be started for a chat.
//! - [`ConfigError`]: the process configuration is unusable.
//! - [`RuntimeError`]: the runtime itself failed (shutdown grace exceeded).
//!
//! Every enum provides `as_label` (short stable snake_case) for logs.

use std::time::Duration;
use thiserror::Error;

/// Why a live message can no longer be edited.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TerminalReason {
    /// The target message no longer exists.
    MessageGone,
    /// The target message cannot be edited (e.g. it belongs to another control).
    NotEditable,
    /// The target message is too old to edit.
    TooOld,
}

impl TerminalReason {
    /// Returns a short stable label (snake_case) for use in logs.
    pub fn as_label(&self) -> &'static str {
        match self {
            TerminalReason::MessageGone => "message_gone",
            TerminalReason::NotEditable => "not_editable",
            TerminalReason::TooOld => "too_old",
        }
    }
}

/// How the live loop should treat a failed delivery.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureClass {
    /// The target already shows the same content; same as success.
    BenignNoOp,
    /// Further edits to this message are impossible.
    Terminal(TerminalReason),
    /// Skip this tick and try again on the next one.
    Transient,
}

/// # Errors produced by a Notifier.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum DeliveryError {
    /// The messaging backend rejected the call.
    #[error("api error (code {code:?}): {description}")]
    Api {
        /// Backend error code, when supplied.
        code: Option<i64>,
        /// Human-readable description returned by the backend.
        description: String,
    },

    /// The backend answered with a non-success status and an unreadable body.
    #[error("http status {status}: {body}")]
    Http {
        /// HTTP status code.
        status: u16,
        /// Raw response body.
        body: String,
    },

    /// The request never completed (connect, timeout, decode).
    #[error("transport error: {0}")]
    Transport(String),
}

const NOT_MODIFIED: &str = "message is not modified";
const TERMINAL_PATTERNS: [(&str, TerminalReason); 3] = [
    ("message to edit not found", TerminalReason::MessageGone),
    ("message can't be edited", TerminalReason::NotEditable),
    ("message is too old", TerminalReason::TooOld),
];

impl DeliveryError {
    /// Returns a short stable label (snake_case) for use in logs.
    pub fn as_label(&self) -> &'static str {
        match self {
            DeliveryError::Api { .. } => "delivery_api",
            DeliveryError::Http { .. } => "delivery_http",
            DeliveryError::Transport(_) => "delivery_transport",
        }
    }

    /// Classifies the failure for the live refresh loop.
    ///
    /// The Bot API only reports these conditions as free text under a generic
    /// 400 code, so the description is matched case-insensitively. Transport
    /// failures (timeouts included) are always transient.
    ///
    /// # Example
    /// ```
    /// use hostwatch::{DeliveryError, FailureClass, TerminalReason};
    ///
    /// let err = DeliveryError::Api {
    ///     code: Some(400),
    ///     description: "Bad Request: message to edit not found".into(),
    /// };
    /// assert_eq!(err.classify(), FailureClass::Terminal(TerminalReason::MessageGone));
    /// ```
    pub fn classify(&self) -> FailureClass {
        let text = match self {
            DeliveryError::Api { description, .. } => description.to_lowercase(),
            DeliveryError::Http { body, .. } => body.to_lowercase(),
            DeliveryError::Transport(_) => return FailureClass::Transient,
        };

        if text.contains(NOT_MODIFIED) {
            return FailureClass::BenignNoOp;
        }
        TERMINAL_PATTERNS
            .iter()
            .find(|(pattern, _)| text.contains(pattern))
            .map(|(_, reason)| FailureClass::Terminal(*reason))
            .unwrap_or(FailureClass::Transient)
    }
}

impl From<reqwest::Error> for DeliveryError {
    fn from(err: reqwest::Error) -> Self {
        DeliveryError::Transport(err.to_string())
    }
}

/// # Errors produced by reporters.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum ReportError {
    /// A data source could not be read or parsed.
    #[error(transparent)]
    Probe(#[from] ProbeError),

    /// The blocking worker that collected the report did not finish.
    #[error("report worker failed: {0}")]
    Worker(String),
}

impl ReportError {
    /// Returns a short stable label (snake_case) for use in logs.
    pub fn as_label(&self) -> &'static str {
        match self {
            ReportError::Probe(err) => err.as_label(),
            ReportError::Worker(_) => "report_worker",
        }
    }
}

/// # Errors produced while sampling one watched key.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum ProbeError {
    /// The underlying source could not be read.
    #[error("read failed: {0}")]
    Io(#[from] std::io::Error),

    /// The source was readable but the value was missing or malformed.
    #[error("no value: {0}")]
    Missing(String),
}

impl ProbeError {
    pub(crate) fn missing(what: impl Into<String>) -> Self {
        ProbeError::Missing(what.into())
    }

    /// Returns a short stable label (snake_case) for use in logs.
    pub fn as_label(&self) -> &'static str {
        match self {
            ProbeError::Io(_) => "probe_io",
            ProbeError::Missing(_) => "probe_missing",
        }
    }
}

/// # Errors returned by `TaskRegistry::start`.
///
/// No task is installed when either of these is returned.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum StartError {
    /// The initial report could not be produced.
    #[error("initial report failed: {0}")]
    Report(#[from] ReportError),

    /// The initial message could not be sent.
    #[error("initial send failed: {0}")]
    Send(#[from] DeliveryError),
}

impl StartError {
    /// Returns a short stable label (snake_case) for use in logs.
    pub fn as_label(&self) -> &'static str {
        match self {
            StartError::Report(_) => "start_report",
            StartError::Send(_) => "start_send",
        }
    }
}

/// # Errors in process configuration.
#[non_exhaustive]
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    /// The bot token is missing or blank.
    #[error("bot token is required")]
    MissingToken,

    /// No authorized users were configured.
    #[error("at least one allowed user is required")]
    NoUsers,
}

impl ConfigError {
    /// Returns a short stable label (snake_case) for use in logs.
    pub fn as_label(&self) -> &'static str {
        match self {
            ConfigError::MissingToken => "config_missing_token",
            ConfigError::NoUsers => "config_no_users",
        }
    }
}

/// # Errors produced by the hostwatch runtime.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum RuntimeError {
    /// Shutdown grace period was exceeded; some units were still running.
    #[error("shutdown timeout {grace:?} exceeded; {stuck} unit(s) still running")]
    GraceExceeded {
        /// The configured grace duration.
        grace: Duration,
        /// Number of units that did not stop in time.
        stuck: usize,
    },
}

impl RuntimeError {
    /// Returns a short stable label (snake_case) for use in logs.
    pub fn as_label(&self) -> &'static str {
        match self {
            RuntimeError::GraceExceeded { .. } => "runtime_grace_exceeded",
        }
    }
}
