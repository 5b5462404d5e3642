//! Re-running sessions that ended without usable output.

use std::future::Future;
use std::time::Duration;

use crate::types::Reconciled;

/// How often, and how patiently, to re-run a session whose
/// [`Reconciled::is_retryable`] is true.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Attempts in total, the first one included.
    pub max_attempts: u32,
    /// Pause before the second attempt.
    pub initial_backoff: Duration,
    /// Upper bound for any pause.
    pub max_backoff: Duration,
    /// Growth factor applied to the pause after each retry.
    pub multiplier: f64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_backoff: Duration::from_millis(500),
            max_backoff: Duration::from_secs(30),
            multiplier: 2.0,
        }
    }
}

impl RetryPolicy {
    /// Drive `session` until it yields a result worth keeping.
    ///
    /// `session` gets the zero-based attempt number and has to open a new
    /// fragment source on every call. A `max_attempts` of zero still makes
    /// one attempt.
    pub async fn execute<F, Fut>(&self, mut session: F) -> Reconciled
    where
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = Reconciled>,
    {
        let attempts = self.max_attempts.max(1);
        let mut delay = self.initial_backoff;
        let mut attempt = 0;

        loop {
            let result = session(attempt).await;
            attempt += 1;
            if attempt >= attempts || !result.is_retryable() {
                return result;
            }

            let pause = jittered(delay);
            tracing::warn!(
                attempt,
                max_attempts = attempts,
                outcome = %result.outcome,
                pause = ?pause,
                "session produced no usable output, retrying"
            );
            tokio::time::sleep(pause).await;
            delay = Duration::try_from_secs_f64(delay.as_secs_f64() * self.multiplier)
                .map_or(self.max_backoff, |next| next.min(self.max_backoff));
        }
    }
}

/// Spread `base` over 75% to 125% of its length.
fn jittered(base: Duration) -> Duration {
    use std::collections::hash_map::RandomState;
    use std::hash::{BuildHasher, Hasher};

    let sample = RandomState::new().build_hasher().finish() % 1_000;
    let factor = 0.75 + sample as f64 / 2_000.0;
    Duration::try_from_secs_f64(base.as_secs_f64() * factor).unwrap_or(base)
}
