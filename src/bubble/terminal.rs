//! Terminal host for bubbles
//!
//! Prints each bubble as plain text once it is revealed. Viewer messages are
//! prefixed, choice sets are numbered so a bare number can pick one.

use super::surface::{BubbleId, BubbleView, BubbleWidth, ScrollMetrics, Surface};
use super::BubbleRole;
use crossterm::style::Stylize;
use regex::Regex;
use std::collections::HashMap;
use std::io::{self, Write};
use std::sync::{LazyLock, Mutex, MutexGuard, PoisonError};

/// Columns are measured as if each character were this many pixels wide
const CHAR_WIDTH: f64 = 8.0;

static TAG_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]*>").unwrap());

/// Visible text of an HTML fragment
fn plain_text(html: &str) -> String {
    let text = TAG_RE.replace_all(html, "");
    text.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&amp;", "&")
        .trim()
        .to_string()
}

#[allow(clippy::cast_precision_loss)] // terminal lines are short
fn measure(text: &str) -> f64 {
    text.chars().count() as f64 * CHAR_WIDTH
}

struct TerminalState {
    out: Box<dyn Write + Send>,
    bubbles: HashMap<BubbleId, BubbleView>,
}

pub struct TerminalSurface {
    state: Mutex<TerminalState>,
}

impl TerminalSurface {
    pub fn new() -> Self {
        Self::with_writer(io::stdout())
    }

    pub fn with_writer(out: impl Write + Send + 'static) -> Self {
        Self {
            state: Mutex::new(TerminalState {
                out: Box::new(out),
                bubbles: HashMap::new(),
            }),
        }
    }

    fn state(&self) -> MutexGuard<'_, TerminalState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn print(state: &mut TerminalState, lines: &[String]) {
        let result = lines
            .iter()
            .try_for_each(|line| writeln!(state.out, "{line}"))
            .and_then(|()| state.out.flush());
        if let Err(e) = result {
            tracing::warn!(error = %e, "Failed to write to terminal");
        }
    }

    fn lines_for(view: &BubbleView) -> Vec<String> {
        if view.role == BubbleRole::Choices {
            return view
                .choices
                .iter()
                .enumerate()
                .map(|(i, choice)| format!("  [{}] {}", i + 1, choice.question).yellow().to_string())
                .collect();
        }

        let text = plain_text(&view.html);
        let from_viewer = view.html.starts_with("<div class=\"user-message\">");
        let line = match (from_viewer, view.history) {
            (true, true) => format!("> {text}").dark_grey().to_string(),
            (true, false) => format!("> {text}").cyan().to_string(),
            (false, true) => text.dark_grey().to_string(),
            (false, false) => text,
        };
        vec![line]
    }
}

impl Default for TerminalSurface {
    fn default() -> Self {
        Self::new()
    }
}

impl Surface for TerminalSurface {
    fn insert_bubble(&self, bubble: &BubbleView) {
        self.state().bubbles.insert(bubble.id, bubble.clone());
    }

    fn replace_content(&self, id: BubbleId, html: &str) {
        if let Some(view) = self.state().bubbles.get_mut(&id) {
            view.html = html.to_string();
        }
    }

    fn set_typing(&self, visible: bool) {
        tracing::trace!(visible, "Typing indicator");
    }

    fn content_width(&self, id: BubbleId) -> f64 {
        self.state()
            .bubbles
            .get(&id)
            .map(|view| measure(&plain_text(&view.html)))
            .unwrap_or_default()
    }

    fn button_widths(&self, id: BubbleId) -> Vec<f64> {
        self.state()
            .bubbles
            .get(&id)
            .map(|view| view.choices.iter().map(|c| measure(&c.question)).collect())
            .unwrap_or_default()
    }

    fn size_buttons(&self, id: BubbleId, widths: &[f64]) {
        tracing::trace!(bubble = %id, buttons = widths.len(), "Buttons sized");
    }

    fn finalize(&self, id: BubbleId, width: BubbleWidth) {
        let mut state = self.state();
        let Some(view) = state.bubbles.get(&id) else {
            return;
        };
        tracing::trace!(bubble = %id, width = ?width, "Bubble revealed");
        let lines = Self::lines_for(view);
        Self::print(&mut state, &lines);
    }

    fn collapse_choices(&self, id: BubbleId, picked: usize) {
        let mut state = self.state();
        let Some(question) = state
            .bubbles
            .get(&id)
            .and_then(|view| view.choices.get(picked))
            .map(|choice| choice.question.clone())
        else {
            return;
        };
        Self::print(&mut state, &[format!("  * {question}").green().to_string()]);
    }

    fn hide_bubble(&self, id: BubbleId) {
        self.state().bubbles.remove(&id);
    }

    fn scroll_metrics(&self) -> ScrollMetrics {
        ScrollMetrics::default()
    }

    fn set_scroll_top(&self, _top: f64) {}

    fn clear_input(&self) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conversation::Choice;
    use std::sync::Arc;

    #[derive(Clone, Default)]
    struct SharedBuffer(Arc<Mutex<Vec<u8>>>);

    impl SharedBuffer {
        fn contents(&self) -> String {
            String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
        }
    }

    impl Write for SharedBuffer {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    fn view(id: u64, html: &str, role: BubbleRole, choices: Vec<Choice>) -> BubbleView {
        BubbleView {
            id: BubbleId(id),
            html: html.to_string(),
            source: String::new(),
            role,
            history: false,
            choices,
        }
    }

    #[test]
    fn test_plain_text_strips_tags() {
        assert_eq!(
            plain_text("<div class=\"bot-message\"><p>a &amp; <strong>b</strong></p>\n</div>"),
            "a & b"
        );
    }

    #[test]
    fn test_prints_only_when_revealed() {
        let buffer = SharedBuffer::default();
        let surface = TerminalSurface::with_writer(buffer.clone());
        surface.insert_bubble(&view(1, "<div class=\"bot-message\"><p>Hello</p></div>", BubbleRole::Statement, vec![]));
        assert_eq!(buffer.contents(), "");
        assert!((surface.content_width(BubbleId(1)) - 40.0).abs() < f64::EPSILON);

        surface.finalize(BubbleId(1), BubbleWidth::Pixels(42.0));
        assert_eq!(buffer.contents(), "Hello\n");
    }

    #[test]
    fn test_choices_are_numbered_and_collapse_to_pick() {
        let buffer = SharedBuffer::default();
        let surface = TerminalSurface::with_writer(buffer.clone());
        let choices = vec![Choice::new("Yes", "y"), Choice::new("No", "n")];
        surface.insert_bubble(&view(2, "", BubbleRole::Choices, choices));
        assert_eq!(surface.button_widths(BubbleId(2)), vec![24.0, 16.0]);

        surface.finalize(BubbleId(2), BubbleWidth::Auto);
        surface.collapse_choices(BubbleId(2), 1);
        let out = buffer.contents();
        assert!(out.contains("[1] Yes"));
        assert!(out.contains("[2] No"));
        assert!(out.contains("* No"));
    }

    #[test]
    fn test_hidden_bubble_is_forgotten() {
        let buffer = SharedBuffer::default();
        let surface = TerminalSurface::with_writer(buffer.clone());
        surface.insert_bubble(&view(3, "<div class=\"user-message\">hi</div>", BubbleRole::Freeform, vec![]));
        surface.hide_bubble(BubbleId(3));
        surface.finalize(BubbleId(3), BubbleWidth::Auto);
        assert_eq!(buffer.contents(), "");
        assert!(surface.content_width(BubbleId(3)).abs() < f64::EPSILON);
    }
}
