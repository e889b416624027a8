//! Role tags for bubbles and history entries

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// What kind of bubble this is.
///
/// Serialized as the class-list tag the host stylesheet keys on, so persisted
/// history stays readable by older front ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum BubbleRole {
    /// Plain statement from the machine
    #[default]
    Statement,
    /// A set of choice buttons
    Choices,
    /// Echo of text the viewer typed
    Freeform,
    /// A resolved pick, replayable as a statement
    Pick,
}

impl BubbleRole {
    pub fn tag(self) -> &'static str {
        match self {
            BubbleRole::Statement => "",
            BubbleRole::Choices => "reply",
            BubbleRole::Freeform => "reply reply-freeform",
            BubbleRole::Pick => "reply reply-pick",
        }
    }

    pub fn is_statement(self) -> bool {
        self == BubbleRole::Statement
    }

    /// Whether the viewer's own input produced this bubble
    pub fn is_memorable_reply(self) -> bool {
        matches!(self, BubbleRole::Freeform | BubbleRole::Pick)
    }

    /// Roles whose buttons get sized individually
    pub fn sizes_buttons(self) -> bool {
        matches!(self, BubbleRole::Choices | BubbleRole::Pick)
    }
}

impl fmt::Display for BubbleRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

#[derive(Debug, Error)]
#[error("unknown bubble role tag: {0:?}")]
pub struct UnknownRole(pub String);

impl TryFrom<String> for BubbleRole {
    type Error = UnknownRole;

    fn try_from(tag: String) -> Result<Self, Self::Error> {
        match tag.as_str() {
            "" => Ok(BubbleRole::Statement),
            "reply" => Ok(BubbleRole::Choices),
            "reply reply-freeform" => Ok(BubbleRole::Freeform),
            "reply reply-pick" => Ok(BubbleRole::Pick),
            _ => Err(UnknownRole(tag)),
        }
    }
}

impl From<BubbleRole> for String {
    fn from(role: BubbleRole) -> Self {
        role.tag().to_string()
    }
}
