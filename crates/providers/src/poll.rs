//! Bounded polling for asynchronous provider completion.
//!
//! Remote backends queue work and expose a status endpoint; the engine polls
//! at a fixed interval with a fixed maximum attempt count. Exceeding the
//! bound is a terminal [`EngineError::Timeout`], never an unbounded wait.

use std::future::Future;
use std::time::Duration;

use reelgen_core::error::EngineError;
use reelgen_core::provider::ProviderId;

/// Poll `check` every `interval` until it yields a value or `max_attempts`
/// is exhausted.
///
/// `check` returns `Ok(None)` while the backend is still working, `Ok(Some)`
/// when the result is ready, and `Err` to abort polling immediately with the
/// backend's own error.
pub async fn poll_until_complete<T, F, Fut>(
    provider: ProviderId,
    interval: Duration,
    max_attempts: u32,
    mut check: F,
) -> Result<T, EngineError>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<Option<T>, EngineError>>,
{
    for attempt in 1..=max_attempts {
        if let Some(value) = check(attempt).await? {
            return Ok(value);
        }

        tracing::debug!(
            provider = %provider,
            attempt,
            max_attempts,
            "Result not ready, polling again",
        );
        if attempt < max_attempts {
            tokio::time::sleep(interval).await;
        }
    }

    Err(EngineError::Timeout {
        provider,
        attempts: max_attempts,
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
