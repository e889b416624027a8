//! Chat backend error types

use thiserror::Error;

/// Chat backend error with classification
#[derive(Debug, Error)]
#[error("{message}")]
pub struct BackendError {
    pub kind: BackendErrorKind,
    pub message: String,
}

impl BackendError {
    pub fn new(kind: BackendErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn network(message: impl Into<String>) -> Self {
        Self::new(BackendErrorKind::Network, message)
    }

    pub fn server(message: impl Into<String>) -> Self {
        Self::new(BackendErrorKind::Server, message)
    }

    pub fn client(message: impl Into<String>) -> Self {
        Self::new(BackendErrorKind::Client, message)
    }

    pub fn parse(message: impl Into<String>) -> Self {
        Self::new(BackendErrorKind::Parse, message)
    }

    /// Classify a non-success HTTP status
    pub fn from_status(status: u16, body: &str) -> Self {
        match status {
            500..=599 => Self::server(format!("Server error {status}: {body}")),
            _ => Self::client(format!("HTTP {status}: {body}")),
        }
    }
}

/// Where a chat request went wrong
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendErrorKind {
    /// Connection failures, timeouts, unreadable bodies
    Network,
    /// 5xx from the backend
    Server,
    /// Any other non-success status, including failed basic auth
    Client,
    /// Response body was not `{key, content}`
    Parse,
}

impl BackendErrorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Network => "network",
            Self::Server => "server",
            Self::Client => "client",
            Self::Parse => "parse",
        }
    }
}
