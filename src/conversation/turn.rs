//! Turns and the conversation graph

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

/// Answer key of the turn a conversation starts from
pub const ICEBREAKER: &str = "ice";

/// A selectable follow-up
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Choice {
    /// Text shown on the button
    pub question: String,
    /// Answer key resolved when picked
    pub answer: String,
}

impl Choice {
    #[cfg(test)]
    pub fn new(question: impl Into<String>, answer: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            answer: answer.into(),
        }
    }
}

/// One conversational step.
///
/// `says` is kept as raw JSON because scripts come from untyped sources;
/// it is checked to be a string when the turn is rendered.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Turn {
    #[serde(default)]
    pub says: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reply: Option<Vec<Choice>>,
}

impl Turn {
    pub fn statement(says: impl Into<String>) -> Self {
        Self {
            says: Value::String(says.into()),
            reply: None,
        }
    }

    #[cfg(test)]
    pub fn with_choices(mut self, choices: Vec<Choice>) -> Self {
        self.reply = Some(choices);
        self
    }

    /// The statement text, if it is a string
    pub fn says(&self) -> Option<&str> {
        self.says.as_str()
    }

    /// Choices in display order: the last listed choice comes first
    pub fn displayed_choices(&self) -> Vec<Choice> {
        self.reply
            .iter()
            .flatten()
            .rev()
            .cloned()
            .collect()
    }
}

/// Answer key to turn, merged across `talk` calls
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConversationGraph {
    turns: HashMap<String, Turn>,
}

impl ConversationGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    #[cfg(test)]
    pub fn with_turn(mut self, key: impl Into<String>, turn: Turn) -> Self {
        self.turns.insert(key.into(), turn);
        self
    }

    /// Merge `other` in; its keys overwrite existing ones
    pub fn merge(&mut self, other: ConversationGraph) {
        self.turns.extend(other.turns);
    }

    pub fn get(&self, key: &str) -> Option<&Turn> {
        self.turns.get(key)
    }

    pub fn icebreaker(&self) -> Option<&Turn> {
        self.get(ICEBREAKER)
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }
}
