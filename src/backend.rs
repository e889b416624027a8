//! Chat backend boundary
//!
//! Free text typed by the viewer is sent to an external chat service whose
//! reply is fed back into the conversation as `answer(key, content)`.

mod error;
mod http;

#[cfg(test)]
pub mod testing;

pub use error::{BackendError, BackendErrorKind};
pub use http::{BackendConfig, HttpChatBackend};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Request body for `POST /chat`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatRequest {
    pub input: String,
}

impl ChatRequest {
    pub fn new(input: impl Into<String>) -> Self {
        Self {
            input: input.into(),
        }
    }
}

/// Response body of `POST /chat`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatReply {
    /// Answer key the content resolves
    pub key: String,
    pub content: String,
}

#[async_trait]
pub trait ChatBackend: Send + Sync {
    async fn chat(&self, request: &ChatRequest) -> Result<ChatReply, BackendError>;
}

/// Logging wrapper for chat backends
pub struct LoggingBackend {
    inner: Arc<dyn ChatBackend>,
}

impl LoggingBackend {
    pub fn new(inner: Arc<dyn ChatBackend>) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl ChatBackend for LoggingBackend {
    async fn chat(&self, request: &ChatRequest) -> Result<ChatReply, BackendError> {
        let start = std::time::Instant::now();
        let result = self.inner.chat(request).await;
        let duration = start.elapsed();

        match &result {
            Ok(reply) => {
                tracing::info!(
                    duration_ms = %duration.as_millis(),
                    key = %reply.key,
                    content_len = reply.content.len(),
                    "Chat request completed"
                );
            }
            Err(e) => {
                tracing::error!(
                    duration_ms = %duration.as_millis(),
                    kind = e.kind.as_str(),
                    error = %e.message,
                    "Chat request failed"
                );
            }
        }

        result
    }
}
