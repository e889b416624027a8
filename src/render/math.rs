//! Math delimiter table

use super::MathTypesetter;

/// A pair of delimiters the typesetter scans for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MathDelimiter {
    pub left: &'static str,
    pub right: &'static str,
    pub display: bool,
}

/// Delimiters left intact by the markdown pass, in match priority order
pub const MATH_DELIMITERS: &[MathDelimiter] = &[
    MathDelimiter {
        left: "$$",
        right: "$$",
        display: true,
    },
    MathDelimiter {
        left: "$",
        right: "$",
        display: false,
    },
    MathDelimiter {
        left: "\\[",
        right: "\\]",
        display: true,
    },
    MathDelimiter {
        left: "\\(",
        right: "\\)",
        display: false,
    },
];

/// Typesetter for hosts without math support; leaves content untouched
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopTypesetter;

impl MathTypesetter for NoopTypesetter {
    fn typeset(&self, html: &str, _delimiters: &[MathDelimiter]) -> String {
        html.to_string()
    }
}
