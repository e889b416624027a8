//! Markup emitted for bubbles
//!
//! Class names here are what the host stylesheet and the history filter key
//! on; changing them breaks previously persisted interactions.

use crate::conversation::Choice;
use std::fmt::Write;
use std::time::Duration;

/// Private prefix marking a payload as an echo of the viewer's input
pub const INPUT_SENTINEL: &str = "---input---";

/// Class substring identifying a choice button in a payload
pub const BUTTON_MARKER: &str = "bubble-button";

const IMAGE_MARKER: &str = "<img src=";

/// Strip the input sentinel, reporting whether it was present
pub fn strip_input_sentinel(payload: &str) -> (bool, &str) {
    match payload.strip_prefix(INPUT_SENTINEL) {
        Some(rest) => (true, rest),
        None => (false, payload),
    }
}

/// Prefix text so the queue treats it as an input echo
pub fn mark_as_input(text: &str) -> String {
    format!("{INPUT_SENTINEL}{text}")
}

/// Rewrite `\[..\]` to `$$..$$` and `\(..\)` to `$..$`.
///
/// The markdown pass would otherwise eat the backslashes as escapes.
pub fn normalize_math_delimiters(text: &str) -> String {
    text.replace("\\[", "$$")
        .replace("\\]", "$$")
        .replace("\\(", "$")
        .replace("\\)", "$")
}

pub fn contains_button(payload: &str) -> bool {
    payload.contains(BUTTON_MARKER)
}

pub fn is_image(payload: &str) -> bool {
    payload.contains(IMAGE_MARKER)
}

/// Echo of free text typed by the viewer
pub fn echo_markup(text: &str) -> String {
    format!("<span class=\"{BUTTON_MARKER} bubble-pick\">{text}</span>")
}

/// A resolved pick, as remembered in history
pub fn pick_markup(text: &str) -> String {
    format!("<span class=\"{BUTTON_MARKER} reply-pick\">{text}</span>")
}

/// Buttons for a choice set, in the order given (already display order).
///
/// Each button's entrance is staggered by half an animation.
pub fn choice_buttons(choices: &[Choice], animation_time: Duration) -> String {
    let step = animation_time.as_secs_f64() * 1000.0 / 2.0;
    let mut html = String::new();
    for (position, choice) in choices.iter().enumerate() {
        #[allow(clippy::cast_precision_loss)] // positions are tiny
        let delay = step * position as f64;
        let _ = write!(
            html,
            "<span class=\"{BUTTON_MARKER}\" style=\"animation-delay: {delay}ms\">{}</span>",
            choice.question
        );
    }
    html
}

/// Wrap rendered content in the viewer or machine message container
pub fn wrap_message(html: &str, from_viewer: bool) -> String {
    if from_viewer {
        format!("<div class=\"user-message\">{html}</div>")
    } else {
        format!("<div class=\"bot-message\">{html}</div>")
    }
}
