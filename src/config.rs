//! Presentation options
//!
//! Defaults mirror the stylesheet timings; every option can be overridden
//! from the environment.

use std::time::Duration;

const DEFAULT_ANIMATION_MS: u64 = 200;
const DEFAULT_TYPE_SPEED_MS: u64 = 5;
const DEFAULT_WIDER_BY: f64 = 2.0;
const DEFAULT_SIDE_PADDING: f64 = 6.0;

/// Options controlling bubble timing, sizing and persistence
#[derive(Debug, Clone, PartialEq)]
pub struct BubbleOptions {
    /// How long a bubble's entrance animation takes (also set in CSS)
    pub animation_time: Duration,
    /// Delay per character, to simulate the machine "typing"
    pub type_speed: Duration,
    /// Extra width added to measured bubbles so they don't wrap
    pub wider_by: f64,
    /// Padding on both sides of a choice button
    pub side_padding: f64,
    /// Number of interactions remembered across restarts; 0 disables persistence
    pub recall_interactions: usize,
    /// Whether the free-form input control is installed
    pub input_enabled: bool,
}

impl Default for BubbleOptions {
    fn default() -> Self {
        Self {
            animation_time: Duration::from_millis(DEFAULT_ANIMATION_MS),
            type_speed: Duration::from_millis(DEFAULT_TYPE_SPEED_MS),
            wider_by: DEFAULT_WIDER_BY,
            side_padding: DEFAULT_SIDE_PADDING,
            recall_interactions: 0,
            input_enabled: false,
        }
    }
}

impl BubbleOptions {
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build options from an arbitrary variable lookup.
    ///
    /// Missing, unparsable and zero values fall back to the default.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let millis = |name: &str, default: Duration| {
            lookup(name)
                .and_then(|v| v.trim().parse::<u64>().ok())
                .filter(|ms| *ms > 0)
                .map_or(default, Duration::from_millis)
        };
        let pixels = |name: &str, default: f64| {
            lookup(name)
                .and_then(|v| v.trim().parse::<f64>().ok())
                .filter(|px| px.is_finite() && *px > 0.0)
                .unwrap_or(default)
        };

        Self {
            animation_time: millis("CHAT_BUBBLE_ANIMATION_MS", defaults.animation_time),
            type_speed: millis("CHAT_BUBBLE_TYPE_SPEED_MS", defaults.type_speed),
            wider_by: pixels("CHAT_BUBBLE_WIDER_BY", defaults.wider_by),
            side_padding: pixels("CHAT_BUBBLE_SIDE_PADDING", defaults.side_padding),
            recall_interactions: lookup("CHAT_BUBBLE_RECALL")
                .and_then(|v| v.trim().parse().ok())
                .unwrap_or(defaults.recall_interactions),
            input_enabled: lookup("CHAT_BUBBLE_INPUT")
                .is_some_and(|v| matches!(v.trim(), "1" | "true" | "yes" | "on")),
        }
    }
}
