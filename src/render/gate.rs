//! Readiness gate for external render capabilities

use std::time::Duration;
use tokio::time::MissedTickBehavior;

/// How often an unavailable capability is polled
pub const POLL_INTERVAL: Duration = Duration::from_millis(20);

/// Waits for a capability to load, then runs a continuation once.
///
/// There is no retry limit: the capability is assumed to load eventually.
/// Nothing happens before readiness, so dropping the future is harmless.
#[derive(Debug, Clone, Copy)]
pub struct RenderGate {
    interval: Duration,
}

impl Default for RenderGate {
    fn default() -> Self {
        Self::new(POLL_INTERVAL)
    }
}

impl RenderGate {
    pub fn new(interval: Duration) -> Self {
        Self { interval }
    }

    /// Resolve once `probe` reports ready.
    ///
    /// The first probe happens immediately; an already loaded capability
    /// resolves without waiting.
    pub async fn ready(&self, capability: &str, probe: impl Fn() -> bool) {
        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            if probe() {
                return;
            }
            tracing::debug!(capability, "Render capability not yet loaded, retrying");
        }
    }

    /// Run `continuation` exactly once, on the tick that saw `probe` succeed
    pub async fn when_ready<T>(
        &self,
        capability: &str,
        probe: impl Fn() -> bool,
        continuation: impl FnOnce() -> T,
    ) -> T {
        self.ready(capability, probe).await;
        continuation()
    }
}
