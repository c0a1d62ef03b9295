//! Engine-wide error taxonomy.
//!
//! Every failure a pipeline stage can produce maps onto exactly one variant,
//! so the orchestrator can classify an error once and decide between retry,
//! failover, and terminal job failure without string matching.

use serde::{Deserialize, Serialize};

use crate::provider::ProviderId;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EngineError {
    /// The submitted configuration was rejected before any job was created.
    #[error("Validation failed: {0}")]
    Validation(String),

    /// No enabled provider passed its health check.
    #[error("No providers available: {0}")]
    ProviderUnavailable(String),

    /// The circuit breaker for `provider` is open; the call was never made.
    #[error("Circuit breaker is open for {provider}. Service temporarily unavailable.")]
    BreakerOpen { provider: ProviderId },

    /// A server-side or throttling-class provider error. Retryable.
    #[error("Transient provider error ({provider}): {message}")]
    Transient {
        provider: ProviderId,
        message: String,
    },

    /// A non-retryable provider error, e.g. rejected credentials.
    #[error("Permanent provider error ({provider}): {message}")]
    Permanent {
        provider: ProviderId,
        message: String,
    },

    /// A bounded polling loop exceeded its maximum attempt count.
    #[error("Timed out waiting on {provider} after {attempts} polling attempts")]
    Timeout { provider: ProviderId, attempts: u32 },

    /// A provider name that does not map onto the closed [`ProviderId`] set.
    #[error("Unknown provider: {0}")]
    UnknownProvider(String),
}

impl EngineError {
    /// Stable machine-readable kind, stored alongside failed jobs.
    pub fn kind(&self) -> &'static str {
        match self {
            EngineError::Validation(_) => "validation_error",
            EngineError::ProviderUnavailable(_) => "provider_unavailable",
            EngineError::BreakerOpen { .. } => "breaker_open",
            EngineError::Transient { .. } => "transient_provider_error",
            EngineError::Permanent { .. } => "permanent_provider_error",
            EngineError::Timeout { .. } => "timeout",
            EngineError::UnknownProvider(_) => "unknown_provider",
        }
    }

    /// Whether the retry executor should attempt the operation again.
    ///
    /// Only server-side/throttling-class failures are worth retrying inside a
    /// single breaker-guarded attempt; everything else propagates immediately.
    pub fn is_retryable(&self) -> bool {
        matches!(self, EngineError::Transient { .. })
    }
}

/// Structured error record preserved on a failed job for polling callers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobError {
    pub kind: String,
    pub message: String,
}

impl From<&EngineError> for JobError {
    fn from(err: &EngineError) -> Self {
        Self {
            kind: err.kind().to_string(),
            message: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transient_is_retryable() {
        let err = EngineError::Transient {
            provider: ProviderId::Runway,
            message: "503 service unavailable".into(),
        };
        assert!(err.is_retryable());
    }

    #[test]
    fn permanent_and_breaker_open_are_not_retryable() {
        let permanent = EngineError::Permanent {
            provider: ProviderId::Runway,
            message: "invalid API key".into(),
        };
        let open = EngineError::BreakerOpen {
            provider: ProviderId::GeminiVeo,
        };
        assert!(!permanent.is_retryable());
        assert!(!open.is_retryable());
    }

    #[test]
    fn job_error_preserves_kind_and_message() {
        let err = EngineError::ProviderUnavailable("all health checks failed".into());
        let record = JobError::from(&err);
        assert_eq!(record.kind, "provider_unavailable");
        assert!(record.message.contains("all health checks failed"));
    }
}
