//! Markdown rendering for bubble content
//!
//! Fenced code goes through a `CodeHighlighter`; math spans are written back
//! out with their dollar delimiters so the typesetting pass can find them.

use super::Renderer;
use pulldown_cmark::{html, CodeBlockKind, CowStr, Event, Options, Parser, Tag, TagEnd};
use std::sync::Arc;

/// Hook for syntax highlighting fenced code blocks
pub trait CodeHighlighter: Send + Sync {
    /// Return highlighted HTML for `code`; `language` is empty when unknown
    fn highlight(&self, code: &str, language: &str) -> String;
}

/// Highlighter that only escapes
#[derive(Debug, Default, Clone, Copy)]
pub struct PlainHighlighter;

impl CodeHighlighter for PlainHighlighter {
    fn highlight(&self, code: &str, _language: &str) -> String {
        let mut out = String::new();
        html::push_html(&mut out, std::iter::once(Event::Text(CowStr::Borrowed(code))));
        out
    }
}

pub struct MarkdownRenderer {
    highlighter: Arc<dyn CodeHighlighter>,
    options: Options,
}

impl Default for MarkdownRenderer {
    fn default() -> Self {
        Self::new(Arc::new(PlainHighlighter))
    }
}

impl MarkdownRenderer {
    pub fn new(highlighter: Arc<dyn CodeHighlighter>) -> Self {
        Self {
            highlighter,
            options: Options::ENABLE_TABLES | Options::ENABLE_STRIKETHROUGH | Options::ENABLE_MATH,
        }
    }

    fn code_block(&self, language: &str, code: &str) -> String {
        let highlighted = self.highlighter.highlight(code, language);
        if language.is_empty() {
            format!("<pre><code class=\"hljs\">{highlighted}</code></pre>\n")
        } else {
            format!("<pre><code class=\"hljs language-{language}\">{highlighted}</code></pre>\n")
        }
    }
}

impl Renderer for MarkdownRenderer {
    fn render(&self, text: &str) -> String {
        let mut events: Vec<Event<'_>> = Vec::new();
        // (language, accumulated code) while inside a code block
        let mut code: Option<(String, String)> = None;

        for event in Parser::new_ext(text, self.options) {
            if let Some((language, body)) = code.as_mut() {
                match event {
                    Event::Text(chunk) => body.push_str(&chunk),
                    Event::End(TagEnd::CodeBlock) => {
                        let block = self.code_block(language, body);
                        events.push(Event::Html(CowStr::from(block)));
                        code = None;
                    }
                    _ => {}
                }
                continue;
            }

            match event {
                Event::Start(Tag::CodeBlock(kind)) => {
                    let language = match kind {
                        CodeBlockKind::Fenced(info) => {
                            info.split_whitespace().next().unwrap_or_default().to_string()
                        }
                        CodeBlockKind::Indented => String::new(),
                    };
                    code = Some((language, String::new()));
                }
                Event::InlineMath(math) => events.push(Event::Text(CowStr::from(format!("${math}$")))),
                Event::DisplayMath(math) => {
                    events.push(Event::Text(CowStr::from(format!("$${math}$$"))));
                }
                other => events.push(other),
            }
        }

        let mut out = String::new();
        html::push_html(&mut out, events.into_iter());
        out
    }
}
