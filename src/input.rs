//! Free text from the viewer
//!
//! Echoes what was typed, sends it to the chat backend and feeds the reply
//! back into the conversation.

use crate::backend::{BackendError, ChatBackend, ChatRequest};
use crate::bubble::{markup, BubbleQueue, BubbleRequest, BubbleRole};
use crate::conversation::{AnswerOutcome, ConversationNavigator, NavigationError};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::oneshot;

#[derive(Debug, Error)]
pub enum InputError {
    #[error("chat request failed: {0}")]
    Backend(#[from] BackendError),
    #[error(transparent)]
    Navigation(#[from] NavigationError),
}

pub struct InputChannel {
    navigator: Arc<ConversationNavigator>,
    queue: Arc<BubbleQueue>,
    backend: Arc<dyn ChatBackend>,
}

impl InputChannel {
    pub fn new(
        navigator: Arc<ConversationNavigator>,
        queue: Arc<BubbleQueue>,
        backend: Arc<dyn ChatBackend>,
    ) -> Self {
        Self {
            navigator,
            queue,
            backend,
        }
    }

    /// Submit one line of free text.
    ///
    /// Interrupts whatever is typing, hides a menu the viewer is typing past
    /// and echoes the text. The input is cleared as soon as the request is
    /// sent, whether or not it succeeds. The reply is answered only after the
    /// echo has posted so that it does not supersede it.
    pub async fn submit(&self, text: &str) -> Result<AnswerOutcome, InputError> {
        self.queue.interrupt();
        if let Some(menu) = self.queue.hide_stale_menu() {
            tracing::debug!(bubble = %menu, "Hid unanswered choices");
        }

        let (posted_tx, posted_rx) = oneshot::channel();
        self.queue.present(
            BubbleRequest::live(markup::mark_as_input(text), BubbleRole::Freeform).on_posted(
                move || {
                    let _ = posted_tx.send(());
                },
            ),
        );

        let request = ChatRequest::new(text);
        let reply = self.backend.chat(&request);
        self.queue.surface().clear_input();

        let (reply, posted) = tokio::join!(reply, posted_rx);
        if posted.is_err() {
            tracing::debug!("Echo was superseded before it posted");
        }

        let reply = reply.inspect_err(|e| {
            tracing::error!(kind = e.kind.as_str(), error = %e.message, "Backend request failed");
        })?;
        Ok(self.navigator.answer(&reply.key, Some(&reply.content))?)
    }
}
