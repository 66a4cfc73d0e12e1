//! Process-wide spacing of outbound calls.

use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::trace;

/// Enforces a minimum interval between successive dispatches.
///
/// One gate is shared by every route, because upstream meters the API key
/// globally. The lock is held while waiting, so callers pass one at a time
/// and any two dispatches are at least `min_interval` apart. Which waiting
/// caller goes next is up to the mutex.
#[derive(Debug)]
pub struct RateGate {
    min_interval: Duration,
    last_dispatch: Mutex<Option<Instant>>,
}

impl RateGate {
    /// Creates a gate that has never dispatched.
    pub fn new(min_interval: Duration) -> Self {
        Self {
            min_interval,
            last_dispatch: Mutex::new(None),
        }
    }

    /// Waits until `min_interval` has passed since the previous dispatch,
    /// records the new dispatch time and returns it.
    pub async fn acquire(&self) -> Instant {
        let mut last = self.last_dispatch.lock().await;

        if let Some(prev) = *last {
            let ready_at = prev + self.min_interval;
            if ready_at > Instant::now() {
                let wait = ready_at.saturating_duration_since(Instant::now());
                trace!(wait_ms = wait.as_millis() as u64, "Rate gate wait");
                tokio::time::sleep_until(ready_at).await;
            }
        }

        let now = Instant::now();
        *last = Some(now);
        now
    }
}
