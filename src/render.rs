//! Rendering capabilities
//!
//! Markdown and math typesetting are external capabilities the queue calls
//! through these traits; `RenderGate` waits until they report ready.

mod gate;
mod markdown;
mod math;

pub use gate::RenderGate;
pub use markdown::MarkdownRenderer;
pub use math::{MathDelimiter, NoopTypesetter, MATH_DELIMITERS};

/// Turns raw bubble text into an HTML fragment
pub trait Renderer: Send + Sync {
    /// Whether the renderer has finished loading
    fn is_ready(&self) -> bool {
        true
    }

    fn render(&self, text: &str) -> String;
}

/// Second pass over rendered HTML that typesets math between delimiters
pub trait MathTypesetter: Send + Sync {
    fn is_ready(&self) -> bool {
        true
    }

    fn typeset(&self, html: &str, delimiters: &[MathDelimiter]) -> String;
}
