//! Per-provider circuit breakers.
//!
//! A breaker gates every call to its provider. Legal transitions:
//! closed -> open (failure count reaches the threshold), open -> half-open
//! (reset timeout elapsed, checked lazily on the next call), half-open ->
//! closed (enough consecutive probe successes), half-open -> open (any probe
//! failure). While open and inside the reset window, calls fail fast and the
//! wrapped operation never runs.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tokio::sync::Mutex;
use tokio::time::Instant;

use reelgen_core::provider::ProviderId;

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Tunable breaker parameters.
#[derive(Debug, Clone)]
pub struct BreakerConfig {
    /// Failures needed to trip the breaker from closed to open.
    pub failure_threshold: u32,
    /// How long an open breaker refuses calls before allowing a probe.
    pub reset_timeout: Duration,
    /// Consecutive half-open successes needed to close the breaker again.
    pub required_half_open_successes: u32,
}

impl Default for BreakerConfig {
    fn default() -> Self {
        Self {
            failure_threshold: 5,
            reset_timeout: Duration::from_secs(60),
            required_half_open_successes: 3,
        }
    }
}

// ---------------------------------------------------------------------------
// State
// ---------------------------------------------------------------------------

/// Gate position of a breaker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CircuitState {
    Closed,
    Open,
    HalfOpen,
}

impl CircuitState {
    pub fn as_str(&self) -> &'static str {
        match self {
            CircuitState::Closed => "closed",
            CircuitState::Open => "open",
            CircuitState::HalfOpen => "half_open",
        }
    }
}

/// Mutable per-provider breaker bookkeeping. Owned exclusively by the
/// breaker; exposed read-only through [`CircuitBreaker::snapshot`].
#[derive(Debug)]
struct BreakerState {
    state: CircuitState,
    failure_count: u32,
    last_failure_at: Option<Instant>,
    half_open_successes: u32,
}

/// Read-only view of a breaker's state.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct BreakerSnapshot {
    pub state: CircuitState,
    pub failure_count: u32,
    pub half_open_successes: u32,
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Outcome of a breaker-guarded call that did not succeed.
///
/// `Inner` carries the operation's own error unchanged so callers can
/// classify the original failure.
#[derive(Debug, thiserror::Error)]
pub enum BreakerError<E>
where
    E: std::error::Error,
{
    #[error("Circuit breaker is open for {provider}. Service temporarily unavailable.")]
    Open { provider: ProviderId },

    #[error(transparent)]
    Inner(E),
}

// ---------------------------------------------------------------------------
// CircuitBreaker
// ---------------------------------------------------------------------------

/// Failure-isolating gate for one provider.
pub struct CircuitBreaker {
    provider: ProviderId,
    config: BreakerConfig,
    state: Mutex<BreakerState>,
}

impl CircuitBreaker {
    pub fn new(provider: ProviderId, config: BreakerConfig) -> Self {
        Self {
            provider,
            config,
            state: Mutex::new(BreakerState {
                state: CircuitState::Closed,
                failure_count: 0,
                last_failure_at: None,
                half_open_successes: 0,
            }),
        }
    }

    /// Run `op` through the breaker gate.
    ///
    /// Fails fast with [`BreakerError::Open`] while the breaker is open and
    /// inside its reset window; otherwise runs `op` and records the outcome.
    pub async fn execute<T, E, F, Fut>(&self, op: F) -> Result<T, BreakerError<E>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: std::error::Error,
    {
        self.check_gate().await?;

        match op().await {
            Ok(value) => {
                self.record_success().await;
                Ok(value)
            }
            Err(err) => {
                self.record_failure().await;
                Err(BreakerError::Inner(err))
            }
        }
    }

    /// Read-only state view for health reporting and tests.
    pub async fn snapshot(&self) -> BreakerSnapshot {
        let state = self.state.lock().await;
        BreakerSnapshot {
            state: state.state,
            failure_count: state.failure_count,
            half_open_successes: state.half_open_successes,
        }
    }

    /// Fail fast while open, or transition open -> half-open when the reset
    /// timeout has elapsed.
    async fn check_gate<E>(&self) -> Result<(), BreakerError<E>>
    where
        E: std::error::Error,
    {
        let mut state = self.state.lock().await;
        if state.state != CircuitState::Open {
            return Ok(());
        }

        let elapsed = state
            .last_failure_at
            .map(|at| at.elapsed())
            .unwrap_or(Duration::MAX);
        if elapsed < self.config.reset_timeout {
            return Err(BreakerError::Open {
                provider: self.provider,
            });
        }

        state.state = CircuitState::HalfOpen;
        state.half_open_successes = 0;
        tracing::info!(
            provider = %self.provider,
            "Circuit breaker entering half-open state",
        );
        Ok(())
    }

    async fn record_success(&self) {
        let mut state = self.state.lock().await;
        if state.state == CircuitState::HalfOpen {
            state.half_open_successes += 1;
            if state.half_open_successes >= self.config.required_half_open_successes {
                state.state = CircuitState::Closed;
                state.failure_count = 0;
                state.last_failure_at = None;
                state.half_open_successes = 0;
                tracing::info!(
                    provider = %self.provider,
                    "Circuit breaker reset to closed state",
                );
            }
        }
    }

    async fn record_failure(&self) {
        let mut state = self.state.lock().await;
        state.failure_count += 1;
        state.last_failure_at = Some(Instant::now());

        if state.state == CircuitState::HalfOpen
            || state.failure_count >= self.config.failure_threshold
        {
            state.state = CircuitState::Open;
            tracing::warn!(
                provider = %self.provider,
                failure_count = state.failure_count,
                "Circuit breaker opened",
            );
        }
    }
}

// ---------------------------------------------------------------------------
// BreakerSet
// ---------------------------------------------------------------------------

/// One breaker per provider, dispatched exhaustively.
pub struct BreakerSet {
    runway: Arc<CircuitBreaker>,
    gemini_veo: Arc<CircuitBreaker>,
    slideshow: Arc<CircuitBreaker>,
}

impl BreakerSet {
    pub fn new(config: BreakerConfig) -> Self {
        Self {
            runway: Arc::new(CircuitBreaker::new(ProviderId::Runway, config.clone())),
            gemini_veo: Arc::new(CircuitBreaker::new(ProviderId::GeminiVeo, config.clone())),
            slideshow: Arc::new(CircuitBreaker::new(ProviderId::Slideshow, config)),
        }
    }

    pub fn for_provider(&self, provider: ProviderId) -> &Arc<CircuitBreaker> {
        match provider {
            ProviderId::Runway => &self.runway,
            ProviderId::GeminiVeo => &self.gemini_veo,
            ProviderId::Slideshow => &self.slideshow,
        }
    }
}

impl Default for BreakerSet {
    fn default() -> Self {
        Self::new(BreakerConfig::default())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
