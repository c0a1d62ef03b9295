//! Bounded retry with capped exponential backoff and jitter.

use std::future::Future;
use std::time::Duration;

use rand::Rng;

/// Maximum jitter added to each backoff delay.
const JITTER_MAX_MS: u64 = 1000;

/// Tunable parameters for the retry executor.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Retries after the first attempt; total attempts = `max_retries + 1`.
    pub max_retries: u32,
    /// Delay before the first retry.
    pub base_delay: Duration,
    /// Upper bound on any single computed delay (before jitter).
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(10),
        }
    }
}

impl RetryPolicy {
    /// Backoff delay for the given zero-based attempt, without jitter:
    /// `min(base_delay * 2^attempt, max_delay)`.
    pub fn backoff_delay(&self, attempt: u32) -> Duration {
        let factor = 2u64.saturating_pow(attempt);
        let delay_ms = (self.base_delay.as_millis() as u64).saturating_mul(factor);
        Duration::from_millis(delay_ms).min(self.max_delay)
    }
}

/// Run `op`, retrying on failure while attempts remain and `should_retry`
/// approves the error.
///
/// Between attempts the executor sleeps `backoff_delay(attempt)` plus
/// 0..1000 ms of jitter. The last error is propagated unchanged, so callers
/// see the operation's own failure, never a retry-specific wrapper.
pub async fn with_retry<T, E, F, Fut, P>(
    policy: &RetryPolicy,
    mut op: F,
    mut should_retry: P,
) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    P: FnMut(&E) -> bool,
    E: std::fmt::Display,
{
    let mut attempt = 0u32;
    loop {
        match op().await {
            Ok(value) => return Ok(value),
            Err(err) => {
                if attempt >= policy.max_retries || !should_retry(&err) {
                    return Err(err);
                }

                let delay = policy.backoff_delay(attempt) + jitter();
                tracing::warn!(
                    attempt = attempt + 1,
                    max_attempts = policy.max_retries + 1,
                    delay_ms = delay.as_millis() as u64,
                    error = %err,
                    "Call failed, retrying",
                );
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
        }
    }
}

fn jitter() -> Duration {
    Duration::from_millis(rand::rng().random_range(0..JITTER_MAX_MS))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
