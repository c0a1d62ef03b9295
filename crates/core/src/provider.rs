//! The closed set of media generation backends.
//!
//! Providers are a fixed enumeration rather than free-form strings so that
//! renderer dispatch, fallback chains, and per-provider state maps are all
//! exhaustiveness-checked by the compiler.

use serde::{Deserialize, Serialize};

use crate::error::EngineError;

// ---------------------------------------------------------------------------
// ProviderId
// ---------------------------------------------------------------------------

/// An interchangeable backend capable of producing a media artifact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderId {
    /// High-fidelity cinematic renderer (remote, slow, most expensive).
    Runway,
    /// Creative-fast renderer (remote, quick turnaround, 720p tier).
    GeminiVeo,
    /// Local slideshow assembler. Always available, cheapest.
    Slideshow,
}

impl ProviderId {
    /// All providers, in default preference order.
    pub const ALL: [ProviderId; 3] = [
        ProviderId::Runway,
        ProviderId::GeminiVeo,
        ProviderId::Slideshow,
    ];

    /// Wire/storage representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderId::Runway => "runway",
            ProviderId::GeminiVeo => "gemini_veo",
            ProviderId::Slideshow => "slideshow",
        }
    }

    /// Whether this provider renders locally (no remote API involved).
    pub fn is_local(&self) -> bool {
        matches!(self, ProviderId::Slideshow)
    }

    /// The render mode is derived solely from provider identity.
    pub fn render_mode(&self) -> RenderMode {
        match self {
            ProviderId::Slideshow => RenderMode::Slideshow,
            ProviderId::Runway | ProviderId::GeminiVeo => RenderMode::AiGenerated,
        }
    }

    /// Human-readable turnaround estimate shown to submitters.
    pub fn estimated_time(&self) -> &'static str {
        match self {
            ProviderId::Runway => "3-8 minutes",
            ProviderId::GeminiVeo => "1-4 minutes",
            ProviderId::Slideshow => "30-60 seconds",
        }
    }

    /// Static capability sheet for this provider.
    pub fn capabilities(&self) -> ProviderCapabilities {
        match self {
            ProviderId::Runway => ProviderCapabilities {
                max_duration_secs: 300,
                quality: "high",
                resolutions: &["1920x1080", "1080x1920", "1080x1080"],
                features: &["cinematic_quality", "camera_movements", "photorealism"],
            },
            ProviderId::GeminiVeo => ProviderCapabilities {
                max_duration_secs: 120,
                quality: "creative",
                resolutions: &["1280x720", "720x1280", "720x720"],
                features: &["animation", "creative_effects", "fast_generation"],
            },
            ProviderId::Slideshow => ProviderCapabilities {
                max_duration_secs: 600,
                quality: "standard",
                resolutions: &["1920x1080", "1080x1920", "1080x1080"],
                features: &["cost_effective", "educational", "voice_sync", "image_generation"],
            },
        }
    }
}

impl std::fmt::Display for ProviderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ProviderId {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "runway" => Ok(ProviderId::Runway),
            "gemini_veo" => Ok(ProviderId::GeminiVeo),
            "slideshow" => Ok(ProviderId::Slideshow),
            other => Err(EngineError::UnknownProvider(other.to_string())),
        }
    }
}

// ---------------------------------------------------------------------------
// RenderMode
// ---------------------------------------------------------------------------

/// How the artifact is produced: remote AI generation or local slideshow
/// assembly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RenderMode {
    AiGenerated,
    Slideshow,
}

impl RenderMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            RenderMode::AiGenerated => "ai_generated",
            RenderMode::Slideshow => "slideshow",
        }
    }
}

// ---------------------------------------------------------------------------
// ProviderCapabilities
// ---------------------------------------------------------------------------

/// Static capability sheet: what a provider can produce and how well.
#[derive(Debug, Clone, Serialize)]
pub struct ProviderCapabilities {
    pub max_duration_secs: u32,
    pub quality: &'static str,
    pub resolutions: &'static [&'static str],
    pub features: &'static [&'static str],
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn round_trips_through_str() {
        for provider in ProviderId::ALL {
            let parsed: ProviderId = provider.as_str().parse().unwrap();
            assert_eq!(parsed, provider);
        }
    }

    #[test]
    fn unknown_name_is_rejected() {
        let err = "pika".parse::<ProviderId>().unwrap_err();
        assert_matches!(err, EngineError::UnknownProvider(name) if name == "pika");
    }

    #[test]
    fn mode_follows_identity() {
        assert_eq!(ProviderId::Slideshow.render_mode(), RenderMode::Slideshow);
        assert_eq!(ProviderId::Runway.render_mode(), RenderMode::AiGenerated);
        assert_eq!(ProviderId::GeminiVeo.render_mode(), RenderMode::AiGenerated);
    }

    #[test]
    fn only_slideshow_is_local() {
        assert!(ProviderId::Slideshow.is_local());
        assert!(!ProviderId::Runway.is_local());
        assert!(!ProviderId::GeminiVeo.is_local());
    }
}
