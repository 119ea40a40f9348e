//! Flat error taxonomy shared by every command.
//!
//! Every error is terminal for the invocation: `main` renders it as a single
//! `{"error": {...}}` object on stderr and exits non-zero.

use std::fmt;

use serde_json::{Map, Value, json};
use thiserror::Error;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    Auth,
    Timeout,
    Network,
    RateLimit,
    Validation,
    Forbidden,
    NotFound,
    Api,
    ConfirmationRequired,
    Config,
    Cli,
}

impl ErrorKind {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Auth => "auth_error",
            Self::Timeout => "timeout",
            Self::Network => "network_error",
            Self::RateLimit => "rate_limit",
            Self::Validation => "validation_error",
            Self::Forbidden => "forbidden",
            Self::NotFound => "not_found",
            Self::Api => "api_error",
            Self::ConfirmationRequired => "confirmation_required",
            Self::Config => "config_error",
            Self::Cli => "cli_error",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error)]
#[error("{kind}: {message}")]
pub struct CliError {
    pub kind: ErrorKind,
    pub message: String,
    pub status_code: Option<u16>,
    pub detail: Option<Value>,
}

impl CliError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            status_code: None,
            detail: None,
        }
    }

    #[must_use]
    pub fn with_status(mut self, status_code: u16) -> Self {
        self.status_code = Some(status_code);
        self
    }

    #[must_use]
    pub fn with_detail(mut self, detail: impl Into<Value>) -> Self {
        let detail = detail.into();
        if !detail.is_null() {
            self.detail = Some(detail);
        }
        self
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Validation, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::NotFound, message)
    }

    pub fn config(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Config, message)
    }

    pub fn cli(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Cli, message)
    }

    /// Wrap the message with a context prefix, keeping kind and payload.
    #[must_use]
    pub fn context(mut self, prefix: &str) -> Self {
        self.message = format!("{prefix}: {}", self.message);
        self
    }

    /// Structured payload written to stderr.
    #[must_use]
    pub fn to_json(&self) -> Value {
        let mut error = Map::new();
        error.insert("type".into(), Value::from(self.kind.as_str()));
        error.insert("message".into(), Value::from(self.message.clone()));
        if let Some(status) = self.status_code {
            error.insert("status_code".into(), Value::from(status));
        }
        if let Some(detail) = &self.detail {
            error.insert("detail".into(), detail.clone());
        }
        json!({ "error": error })
    }
}
