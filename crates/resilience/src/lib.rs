//! Failure-isolation primitives for external provider calls.
//!
//! Every media render is wrapped as `limiter.admit` then
//! `breaker.execute(retry(call))`: admission throttles entry rate first, the
//! breaker refuses calls to a known-bad provider, and the retry executor
//! absorbs transient faults inside a single breaker-guarded attempt. The cost
//! tracker accumulates per-provider daily spend after successful calls.

pub mod breaker;
pub mod cost;
pub mod limiter;
pub mod retry;

pub use breaker::{
    BreakerConfig, BreakerError, BreakerSet, BreakerSnapshot, CircuitBreaker, CircuitState,
};
pub use cost::{CostRecord, CostTracker, UsageSummary};
pub use limiter::RateLimiter;
pub use retry::{with_retry, RetryPolicy};
