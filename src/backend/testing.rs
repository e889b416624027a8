//! Mock chat backend

use super::{BackendError, ChatBackend, ChatReply, ChatRequest};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

/// Chat backend that returns queued replies
#[derive(Default)]
pub struct MockChatBackend {
    replies: Mutex<VecDeque<Result<ChatReply, BackendError>>>,
    requests: Mutex<Vec<ChatRequest>>,
    latency: Duration,
}

#[allow(dead_code)]
impl MockChatBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replies arrive after `latency` (tokio time)
    pub fn with_latency(latency: Duration) -> Self {
        Self {
            latency,
            ..Self::default()
        }
    }

    pub fn queue_reply(&self, key: &str, content: &str) {
        self.replies.lock().unwrap().push_back(Ok(ChatReply {
            key: key.to_string(),
            content: content.to_string(),
        }));
    }

    pub fn queue_error(&self, error: BackendError) {
        self.replies.lock().unwrap().push_back(Err(error));
    }

    pub fn recorded_inputs(&self) -> Vec<String> {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .map(|r| r.input.clone())
            .collect()
    }
}

#[async_trait]
impl ChatBackend for MockChatBackend {
    async fn chat(&self, request: &ChatRequest) -> Result<ChatReply, BackendError> {
        self.requests.lock().unwrap().push(request.clone());
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(BackendError::network("No mock reply queued")))
    }
}
