//! Service traits for the pipeline's external collaborators.

use async_trait::async_trait;

use reelgen_core::config::JobConfig;
use reelgen_core::error::EngineError;
use reelgen_core::media::{MediaArtifact, Script, SlideshowImages, VoiceTrack};
use reelgen_core::provider::ProviderId;
use reelgen_core::routing::StyleAdaptations;

// ---------------------------------------------------------------------------
// Script
// ---------------------------------------------------------------------------

/// Produces a narrated scene script from the request's subject and style.
///
/// Failure here is recoverable only via job failure; there is no degraded
/// script path.
#[async_trait]
pub trait ScriptService: Send + Sync {
    async fn generate(
        &self,
        subject: &str,
        prompt: Option<&str>,
        style: &str,
    ) -> Result<Script, EngineError>;
}

// ---------------------------------------------------------------------------
// Voice
// ---------------------------------------------------------------------------

/// Synthesis options carried opaquely to the voice backend.
#[derive(Debug, Clone)]
pub struct VoiceOptions {
    pub format: String,
    pub speed: f64,
}

impl Default for VoiceOptions {
    fn default() -> Self {
        Self {
            format: "mp3".to_string(),
            speed: 1.0,
        }
    }
}

/// Synthesizes a narration track.
///
/// The orchestrator degrades synthesis failure to a placeholder track; a
/// voice outage never fails a job.
#[async_trait]
pub trait VoiceService: Send + Sync {
    async fn synthesize(
        &self,
        text: &str,
        voice_id: &str,
        options: &VoiceOptions,
    ) -> Result<VoiceTrack, EngineError>;
}

// ---------------------------------------------------------------------------
// Imagery
// ---------------------------------------------------------------------------

/// Generates per-scene imagery for slideshow renders.
///
/// Failure degrades to placeholder (stock) imagery.
#[async_trait]
pub trait ImageService: Send + Sync {
    async fn generate_for_slideshow(
        &self,
        script: &Script,
        style: &str,
    ) -> Result<SlideshowImages, EngineError>;
}

// ---------------------------------------------------------------------------
// Media render
// ---------------------------------------------------------------------------

/// Everything a backend needs to render one job's artifact.
pub struct RenderRequest<'a> {
    pub script: &'a Script,
    pub voice: Option<&'a VoiceTrack>,
    pub images: Option<&'a SlideshowImages>,
    pub config: &'a JobConfig,
    pub adaptations: Option<&'a StyleAdaptations>,
}

/// One implementation per backend identity.
///
/// This is the call the engine wraps in limiter -> breaker -> retry.
/// Implementations that poll a remote queue must bound the wait with
/// [`crate::poll::poll_until_complete`].
#[async_trait]
pub trait MediaProvider: Send + Sync {
    /// The backend identity this renderer serves.
    fn id(&self) -> ProviderId;

    async fn render(&self, request: RenderRequest<'_>) -> Result<MediaArtifact, EngineError>;
}

// ---------------------------------------------------------------------------
// Health
// ---------------------------------------------------------------------------

/// Result of probing one provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HealthStatus {
    pub healthy: bool,
    pub response_time_ms: u64,
}

impl HealthStatus {
    pub fn healthy(response_time_ms: u64) -> Self {
        Self {
            healthy: true,
            response_time_ms,
        }
    }

    pub fn unhealthy() -> Self {
        Self {
            healthy: false,
            response_time_ms: 0,
        }
    }
}

/// Live health probe consulted by the dynamic router.
#[async_trait]
pub trait HealthCheckService: Send + Sync {
    async fn check(&self, provider: ProviderId) -> HealthStatus;
}
