//! Conversation graph and navigation
//!
//! Resolves which turn to show for `talk`, `reply` and `answer`, and keeps
//! the standing answer used to resume after an interruption.

mod handlers;
mod navigator;
mod turn;

#[cfg(test)]
mod proptests;

pub use handlers::HandlerRegistry;
pub use navigator::{AnswerOutcome, ConversationNavigator, NavigationError};
pub use turn::{Choice, ConversationGraph, Turn};
