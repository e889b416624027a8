//! Bubble presentation
//!
//! Owns bubble timing: entrance delay, typing indicator toggling, layout
//! finalization and scroll-into-view. Exactly one live bubble is in flight at
//! a time; presenting another cancels the pending one.

pub mod markup;
mod queue;
mod role;
mod surface;
mod terminal;
pub mod timing;

#[cfg(test)]
pub mod testing;

#[cfg(test)]
mod proptests;

pub use queue::{BubbleQueue, BubbleRequest};
pub use role::BubbleRole;
pub use surface::BubbleId;
pub use terminal::TerminalSurface;
