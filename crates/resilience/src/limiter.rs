//! Per-provider sliding-minute admission control.
//!
//! [`RateLimiter::admit`] never rejects a caller. When a provider's
//! per-minute cap is reached, the caller is suspended until the next minute
//! boundary and then re-checked, so excess admissions manifest purely as
//! latency.

use std::collections::HashMap;
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::Instant;

use reelgen_core::provider::ProviderId;

/// Buckets older than this many minutes are pruned on each admission.
const WINDOW_RETENTION_MINUTES: u64 = 5;

/// Default per-minute request caps.
fn default_cap(provider: ProviderId) -> u32 {
    match provider {
        ProviderId::Runway => 30,
        ProviderId::GeminiVeo => 60,
        ProviderId::Slideshow => 120,
    }
}

/// Sliding-minute rate limiter keyed by provider.
///
/// Minute indices are measured from the limiter's own epoch, so tests running
/// under a paused tokio clock see fully deterministic windows.
pub struct RateLimiter {
    epoch: Instant,
    caps: HashMap<ProviderId, u32>,
    windows: Mutex<HashMap<(ProviderId, u64), u32>>,
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new()
    }
}

impl RateLimiter {
    /// Limiter with the default per-provider caps.
    pub fn new() -> Self {
        let caps = ProviderId::ALL
            .into_iter()
            .map(|p| (p, default_cap(p)))
            .collect();
        Self {
            epoch: Instant::now(),
            caps,
            windows: Mutex::new(HashMap::new()),
        }
    }

    /// Override one provider's cap. Intended for configuration and tests.
    pub fn with_cap(mut self, provider: ProviderId, cap: u32) -> Self {
        self.caps.insert(provider, cap);
        self
    }

    /// Admit one request for `provider`.
    ///
    /// Returns immediately while the current minute's count is below the cap;
    /// otherwise sleeps to the next minute boundary and re-checks. There is no
    /// internal timeout; callers needing one must layer it on top.
    pub async fn admit(&self, provider: ProviderId) {
        loop {
            let now = Instant::now();
            let minute = self.minute_index(now);
            {
                let mut windows = self.windows.lock().await;
                prune_old_windows(&mut windows, minute);

                let count = windows.entry((provider, minute)).or_insert(0);
                let cap = self.caps.get(&provider).copied().unwrap_or(u32::MAX);
                if *count < cap {
                    *count += 1;
                    return;
                }
            }

            let boundary = self.epoch + Duration::from_secs((minute + 1) * 60);
            tracing::warn!(
                provider = %provider,
                wait_ms = boundary.saturating_duration_since(now).as_millis() as u64,
                "Rate limit reached, waiting for next window",
            );
            tokio::time::sleep_until(boundary).await;
        }
    }

    /// Current-minute admission count for `provider`. Used by tests and
    /// metrics readers; never blocks admission.
    pub async fn current_count(&self, provider: ProviderId) -> u32 {
        let minute = self.minute_index(Instant::now());
        self.windows
            .lock()
            .await
            .get(&(provider, minute))
            .copied()
            .unwrap_or(0)
    }

    fn minute_index(&self, now: Instant) -> u64 {
        now.saturating_duration_since(self.epoch).as_secs() / 60
    }
}

/// Drop buckets older than the retention horizon.
fn prune_old_windows(windows: &mut HashMap<(ProviderId, u64), u32>, current_minute: u64) {
    windows.retain(|&(_, minute), _| minute + WINDOW_RETENTION_MINUTES >= current_minute);
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn admits_up_to_cap_without_waiting() {
        let limiter = RateLimiter::new().with_cap(ProviderId::Runway, 3);
        let start = Instant::now();
        for _ in 0..3 {
            limiter.admit(ProviderId::Runway).await;
        }
        assert_eq!(Instant::now(), start);
        assert_eq!(limiter.current_count(ProviderId::Runway).await, 3);
    }

    #[tokio::test(start_paused = true)]
    async fn excess_admission_waits_for_next_minute() {
        let limiter = RateLimiter::new().with_cap(ProviderId::Runway, 1);
        let start = Instant::now();

        limiter.admit(ProviderId::Runway).await;
        // Cap reached: the next admit must be delayed to the minute boundary,
        // never rejected.
        limiter.admit(ProviderId::Runway).await;

        let elapsed = Instant::now() - start;
        assert!(elapsed >= Duration::from_secs(60));
        assert_eq!(limiter.current_count(ProviderId::Runway).await, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn providers_have_independent_windows() {
        let limiter = RateLimiter::new()
            .with_cap(ProviderId::Runway, 1)
            .with_cap(ProviderId::Slideshow, 5);
        let start = Instant::now();

        limiter.admit(ProviderId::Runway).await;
        limiter.admit(ProviderId::Slideshow).await;
        limiter.admit(ProviderId::Slideshow).await;

        // The slideshow admissions must not be delayed by the runway cap.
        assert_eq!(Instant::now(), start);
    }

    #[tokio::test(start_paused = true)]
    async fn old_windows_are_pruned() {
        let limiter = RateLimiter::new().with_cap(ProviderId::Runway, 2);
        limiter.admit(ProviderId::Runway).await;

        tokio::time::advance(Duration::from_secs(6 * 60 + 1)).await;
        limiter.admit(ProviderId::Runway).await;

        let windows = limiter.windows.lock().await;
        assert_eq!(windows.len(), 1, "stale minute bucket should be evicted");
    }
}
