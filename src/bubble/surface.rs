//! Host page boundary
//!
//! The queue never touches a document directly; everything visual goes
//! through a `Surface`.

use super::BubbleRole;
use crate::conversation::Choice;
use std::fmt;

/// Identifier of a bubble, unique for the session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BubbleId(pub u64);

impl fmt::Display for BubbleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "bubble-{}", self.0)
    }
}

/// A bubble as handed to the host for insertion
#[derive(Debug, Clone, PartialEq)]
pub struct BubbleView {
    pub id: BubbleId,
    /// Rendered, wrapped HTML fragment
    pub html: String,
    /// Payload the HTML was rendered from
    pub source: String,
    pub role: BubbleRole,
    /// Restored from history rather than presented live
    pub history: bool,
    /// Choices in display order (choice sets only)
    pub choices: Vec<Choice>,
}

/// Final width applied when a bubble is revealed
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BubbleWidth {
    Pixels(f64),
    Percent(u8),
    /// Let the stylesheet decide
    Auto,
}

/// Scroll position of the bubble wrap
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ScrollMetrics {
    pub scroll_height: f64,
    pub scroll_top: f64,
    pub container_height: f64,
}

/// Visual operations the host must provide
pub trait Surface: Send + Sync {
    /// Insert a not-yet-visible bubble just before the typing indicator
    fn insert_bubble(&self, bubble: &BubbleView);

    /// Replace a bubble's content (math typesetting pass)
    fn replace_content(&self, id: BubbleId, html: &str);

    fn set_typing(&self, visible: bool);

    /// Measured width of a bubble's content
    fn content_width(&self, id: BubbleId) -> f64;

    /// Measured widths of a bubble's buttons, in display order
    fn button_widths(&self, id: BubbleId) -> Vec<f64>;

    fn size_buttons(&self, id: BubbleId, widths: &[f64]);

    /// Reveal a bubble at its final width
    fn finalize(&self, id: BubbleId, width: BubbleWidth);

    /// Shrink non-picked buttons to nothing and disable further clicks
    fn collapse_choices(&self, id: BubbleId, picked: usize);

    fn hide_bubble(&self, id: BubbleId);

    fn scroll_metrics(&self) -> ScrollMetrics;

    fn set_scroll_top(&self, top: f64);

    /// Empty the free-form input control
    fn clear_input(&self);
}
