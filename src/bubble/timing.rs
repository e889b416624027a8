//! Pure timing plan for a single bubble
//!
//! All offsets are relative to the moment the bubble was presented.

use super::BubbleRole;
use crate::config::BubbleOptions;
use std::time::Duration;

/// Number of discrete hops used to scroll the container to the bottom
pub const SCROLL_STEPS: u32 = 200;

/// Spacing between scroll hops
pub const SCROLL_STEP_INTERVAL: Duration = Duration::from_millis(5);

/// When each visual step of a bubble happens
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BubbleSchedule {
    /// Show the typing indicator (only for long statements)
    pub typing_on: Option<Duration>,
    /// Hide the typing indicator ahead of the bubble (live only)
    pub typing_off: Option<Duration>,
    /// Finalize the bubble
    pub deadline: Duration,
    /// Start scrolling, relative to the deadline
    pub scroll_after: Duration,
}

impl BubbleSchedule {
    /// Replays collapse every timer to zero
    pub fn immediate() -> Self {
        Self {
            typing_on: None,
            typing_off: None,
            deadline: Duration::ZERO,
            scroll_after: Duration::ZERO,
        }
    }

    /// Whether the length-based typing extension applied
    #[cfg(test)]
    pub fn is_typing_extended(&self) -> bool {
        self.typing_on.is_some()
    }
}

/// Compute the schedule for a payload of `chars` characters.
///
/// Role-tagged bubbles appear on a fixed `2 * animation_time` wait. Plain
/// statements whose simulated typing outlasts one animation get the typing
/// time added, floored at `6 * animation_time`. The bubble is finalized
/// `2 * animation_time` after the wait.
pub fn schedule(chars: usize, role: BubbleRole, live: bool, options: &BubbleOptions) -> BubbleSchedule {
    if !live {
        return BubbleSchedule::immediate();
    }

    let animation = options.animation_time;
    let typing = typing_time(chars, options.type_speed);

    let mut wait = animation * 2;
    let mut typing_on = None;
    if role.is_statement() && typing > animation {
        wait += typing;
        wait = wait.max(animation * 6);
        typing_on = Some(animation);
    }

    BubbleSchedule {
        typing_on,
        typing_off: Some(wait.saturating_sub(animation * 2)),
        deadline: wait + animation * 2,
        scroll_after: animation / 2,
    }
}

fn typing_time(chars: usize, per_char: Duration) -> Duration {
    let chars = u32::try_from(chars).unwrap_or(u32::MAX);
    per_char.saturating_mul(chars)
}
