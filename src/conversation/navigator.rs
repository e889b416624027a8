//! Resolves turns and hands them to the bubble queue

use super::handlers::HandlerRegistry;
use super::turn::{ConversationGraph, Turn, ICEBREAKER};
use crate::bubble::{markup, BubbleId, BubbleQueue, BubbleRequest, BubbleRole};
use crate::history::HistoryStore;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum NavigationError {
    #[error("turn statement is not a string: {found}")]
    MalformedTurn { found: String },
}

/// What `answer` did with its arguments
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnswerOutcome {
    /// Content was rendered as a statement
    Rendered,
    /// A registered handler was invoked
    Dispatched,
    /// No content and no handler by that name
    Unresolved,
}

pub struct ConversationNavigator {
    graph: Mutex<ConversationGraph>,
    standing_answer: Mutex<String>,
    queue: Arc<BubbleQueue>,
    history: Arc<HistoryStore>,
    handlers: HandlerRegistry,
}

impl ConversationNavigator {
    pub fn new(
        queue: Arc<BubbleQueue>,
        history: Arc<HistoryStore>,
        handlers: HandlerRegistry,
    ) -> Self {
        Self {
            graph: Mutex::new(ConversationGraph::new()),
            standing_answer: Mutex::new(ICEBREAKER.to_string()),
            queue,
            history,
            handlers,
        }
    }

    fn graph(&self) -> MutexGuard<'_, ConversationGraph> {
        self.graph.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Answer key to resume from after an interruption
    pub fn standing_answer(&self) -> String {
        self.standing_answer
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn set_standing_answer(&self, key: &str) {
        *self
            .standing_answer
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = key.to_string();
    }

    /// Merge `partial` into the graph and render the turn at `start`, or the
    /// icebreaker when no start key is given.
    ///
    /// A start key that names no turn renders nothing.
    pub fn talk(
        &self,
        partial: ConversationGraph,
        start: Option<&str>,
    ) -> Result<(), NavigationError> {
        let turn = {
            let mut graph = self.graph();
            graph.merge(partial);
            tracing::debug!(turns = graph.len(), "Conversation graph merged");
            match start {
                Some(key) => graph.get(key).cloned(),
                None => graph.icebreaker().cloned(),
            }
        };

        self.render(turn)?;
        if let Some(key) = start {
            self.set_standing_answer(key);
        }
        Ok(())
    }

    /// Render `turn`, or the icebreaker when `None`
    pub fn reply(&self, turn: Option<Turn>) -> Result<(), NavigationError> {
        let turn = match turn {
            Some(turn) => Some(turn),
            None => self.graph().icebreaker().cloned(),
        };
        self.render(turn)
    }

    fn render(&self, turn: Option<Turn>) -> Result<(), NavigationError> {
        let Some(turn) = turn else {
            return Ok(());
        };
        let Some(says) = turn.says() else {
            let found = turn.says.to_string();
            tracing::error!(found = %found, "Turn statement is not a string");
            return Err(NavigationError::MalformedTurn { found });
        };

        let choices = turn.displayed_choices();
        let queue = Arc::clone(&self.queue);
        self.queue.present(
            BubbleRequest::live(says, BubbleRole::Statement).on_posted(move || {
                queue.think();
                if choices.is_empty() {
                    queue.stop();
                } else {
                    let buttons = markup::choice_buttons(&choices, queue.options().animation_time);
                    queue.present(BubbleRequest::live(buttons, BubbleRole::Choices).with_choices(choices));
                }
            }),
        );
        Ok(())
    }

    /// With content, render it as a statement, make `key` the standing
    /// answer and remember the pick. Without content, invoke the handler
    /// named `key` if one is registered.
    pub fn answer(
        &self,
        key: &str,
        content: Option<&str>,
    ) -> Result<AnswerOutcome, NavigationError> {
        match content {
            Some(content) if !content.is_empty() => {
                self.render(Some(Turn::statement(content)))?;
                self.set_standing_answer(key);
                self.history
                    .record(&markup::pick_markup(content), BubbleRole::Pick);
                Ok(AnswerOutcome::Rendered)
            }
            // Empty content still reaches the handler as given
            _ if self.handlers.invoke(key, content) => {
                tracing::debug!(handler = %key, "Response handler invoked");
                Ok(AnswerOutcome::Dispatched)
            }
            _ => {
                tracing::debug!(handler = %key, "No response handler registered");
                Ok(AnswerOutcome::Unresolved)
            }
        }
    }

    /// Pick `index` from the choice set shown in bubble `id`.
    ///
    /// Returns `Ok(None)` when the bubble has no open choice at `index`.
    pub fn pick(
        &self,
        id: BubbleId,
        index: usize,
    ) -> Result<Option<AnswerOutcome>, NavigationError> {
        let Some(choice) = self.queue.pick(id, index) else {
            return Ok(None);
        };
        tracing::info!(bubble = %id, answer = %choice.answer, "Choice picked");
        self.answer(&choice.answer, Some(&choice.question)).map(Some)
    }
}
