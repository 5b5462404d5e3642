//! Two-phase stall detection.

use std::pin::Pin;
use std::time::Duration;

use strum::Display;
use tokio::time::{self, Instant, Sleep};

/// Stand-in deadline for gaps too large to add to the current instant.
const FAR_FUTURE: Duration = Duration::from_secs(86400 * 365 * 30);

/// Which deadline is armed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "snake_case")]
pub enum WatchPhase {
    /// Waiting for the first fragment.
    Initial,
    /// Waiting for the next fragment after at least one arrived.
    Gap,
}

/// Deadline raced against the fragment source.
///
/// Starts with the long initial deadline; the first fragment switches it to
/// the short inter-fragment deadline, and every later fragment pushes that
/// deadline forward.
#[derive(Debug)]
pub struct Watchdog {
    sleep: Pin<Box<Sleep>>,
    phase: WatchPhase,
    gap: Duration,
}

impl Watchdog {
    pub fn new(initial: Duration, gap: Duration) -> Self {
        Self {
            sleep: Box::pin(time::sleep(initial)),
            phase: WatchPhase::Initial,
            gap,
        }
    }

    pub fn phase(&self) -> WatchPhase {
        self.phase
    }

    /// A fragment arrived: arm (or re-arm) the inter-fragment deadline.
    pub fn on_fragment(&mut self) {
        if self.phase == WatchPhase::Initial {
            tracing::debug!(gap = ?self.gap, "first fragment, switching to gap deadline");
            self.phase = WatchPhase::Gap;
        }
        let now = Instant::now();
        let deadline = now.checked_add(self.gap).unwrap_or_else(|| now + FAR_FUTURE);
        self.sleep.as_mut().reset(deadline);
    }

    /// Resolves when the armed deadline passes, yielding the phase that
    /// expired.
    pub async fn expired(&mut self) -> WatchPhase {
        self.sleep.as_mut().await;
        self.phase
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(actual: Duration, expected: Duration) {
        assert!(
            actual >= expected && actual < expected + Duration::from_millis(10),
            "expected ~{expected:?}, got {actual:?}"
        );
    }

    #[tokio::test(start_paused = true)]
    async fn initial_deadline_fires_first() {
        let mut watchdog = Watchdog::new(Duration::from_secs(60), Duration::from_secs(5));
        let start = Instant::now();
        assert_eq!(watchdog.expired().await, WatchPhase::Initial);
        assert_close(start.elapsed(), Duration::from_secs(60));
    }

    #[tokio::test(start_paused = true)]
    async fn fragment_switches_to_gap_deadline() {
        let mut watchdog = Watchdog::new(Duration::from_secs(60), Duration::from_secs(5));
        time::advance(Duration::from_secs(10)).await;
        watchdog.on_fragment();
        let start = Instant::now();
        assert_eq!(watchdog.expired().await, WatchPhase::Gap);
        assert_close(start.elapsed(), Duration::from_secs(5));
    }

    #[tokio::test(start_paused = true)]
    async fn each_fragment_pushes_the_deadline() {
        let mut watchdog = Watchdog::new(Duration::from_secs(60), Duration::from_secs(5));
        watchdog.on_fragment();
        time::advance(Duration::from_secs(4)).await;
        watchdog.on_fragment();
        let start = Instant::now();
        watchdog.expired().await;
        assert_close(start.elapsed(), Duration::from_secs(5));
    }

    #[tokio::test(start_paused = true)]
    async fn unbounded_gap_saturates_instead_of_overflowing() {
        let mut watchdog = Watchdog::new(Duration::from_secs(1), Duration::MAX);
        watchdog.on_fragment();
        assert_eq!(watchdog.phase(), WatchPhase::Gap);
        let waited = time::timeout(Duration::from_secs(86400), watchdog.expired()).await;
        assert!(waited.is_err());
    }
}
