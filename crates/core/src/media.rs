//! Media pipeline intermediate and final artifact types.
//!
//! Scripts, narration tracks, slideshow imagery, and the rendered artifact
//! descriptor, plus the pure helpers shared by every provider implementation:
//! narration length estimation and aspect-ratio-to-resolution selection.

use serde::{Deserialize, Serialize};

use crate::config::AspectRatio;
use crate::provider::ProviderId;

/// Average narration speaking rate used for duration estimates.
pub const SPEAKING_RATE_WPM: u32 = 150;

// ---------------------------------------------------------------------------
// Script
// ---------------------------------------------------------------------------

/// One narrated scene of a generated script.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scene {
    pub id: u32,
    pub text: String,
    pub duration_secs: f64,
    /// Prompt handed to the imagery stage for this scene.
    pub image_prompt: String,
}

/// A generated script: the blueprint every later stage consumes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Script {
    pub title: String,
    pub scenes: Vec<Scene>,
    pub total_duration_secs: f64,
}

impl Script {
    /// Full narration text, scene texts joined in order.
    pub fn narration_text(&self) -> String {
        self.scenes
            .iter()
            .map(|s| s.text.as_str())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

// ---------------------------------------------------------------------------
// Voice
// ---------------------------------------------------------------------------

/// A synthesized (or placeholder) narration track.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VoiceTrack {
    pub audio_ref: String,
    pub duration_secs: u32,
    pub format: String,
    pub voice_id: String,
    /// True when synthesis failed and the track is a silent placeholder.
    #[serde(default)]
    pub placeholder: bool,
}

/// Estimate narration duration in whole seconds from word count.
///
/// Always at least one second, at [`SPEAKING_RATE_WPM`] words per minute.
pub fn estimate_narration_secs(text: &str) -> u32 {
    let words = text.split_whitespace().count() as u32;
    let secs = (f64::from(words) / f64::from(SPEAKING_RATE_WPM) * 60.0).ceil() as u32;
    secs.max(1)
}

// ---------------------------------------------------------------------------
// Slideshow imagery
// ---------------------------------------------------------------------------

/// Imagery generated for one scene of a slideshow render.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneImage {
    pub scene_id: u32,
    pub image_ref: String,
    pub prompt: String,
    pub duration_secs: f64,
}

/// The image set backing a slideshow render.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SlideshowImages {
    pub images: Vec<SceneImage>,
    /// Which imagery source produced the set ("stock_images" when degraded).
    pub source: String,
    pub quality: String,
    /// True when image generation failed and stock placeholders were used.
    #[serde(default)]
    pub placeholder: bool,
}

// ---------------------------------------------------------------------------
// Rendered artifact
// ---------------------------------------------------------------------------

/// Descriptor of the final rendered media.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediaArtifact {
    pub media_ref: String,
    pub thumbnail_ref: String,
    pub duration_secs: f64,
    pub resolution: String,
    pub format: String,
    pub quality: String,
    pub provider: ProviderId,
}

/// The full result stored on a completed job: the artifact plus per-stage
/// sub-results.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationResult {
    pub artifact: MediaArtifact,
    pub script: Script,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub voice: Option<VoiceTrack>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub images: Option<SlideshowImages>,
}

/// Pick the output resolution for a provider and aspect ratio.
///
/// The creative-fast provider renders a 720p tier; the others 1080p.
pub fn resolution_for(provider: ProviderId, aspect: AspectRatio) -> &'static str {
    match provider {
        ProviderId::Runway | ProviderId::Slideshow => match aspect {
            AspectRatio::Portrait => "1080x1920",
            AspectRatio::Square => "1080x1080",
            AspectRatio::Landscape => "1920x1080",
        },
        ProviderId::GeminiVeo => match aspect {
            AspectRatio::Portrait => "720x1280",
            AspectRatio::Square => "720x720",
            AspectRatio::Landscape => "1280x720",
        },
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn narration_estimate_uses_speaking_rate() {
        // 150 words at 150 wpm is exactly one minute.
        let text = vec!["word"; 150].join(" ");
        assert_eq!(estimate_narration_secs(&text), 60);
    }

    #[test]
    fn narration_estimate_is_at_least_one_second() {
        assert_eq!(estimate_narration_secs(""), 1);
        assert_eq!(estimate_narration_secs("hi"), 1);
    }

    #[test]
    fn narration_text_joins_scenes_in_order() {
        let script = Script {
            title: "t".into(),
            scenes: vec![
                Scene {
                    id: 1,
                    text: "First.".into(),
                    duration_secs: 5.0,
                    image_prompt: String::new(),
                },
                Scene {
                    id: 2,
                    text: "Second.".into(),
                    duration_secs: 5.0,
                    image_prompt: String::new(),
                },
            ],
            total_duration_secs: 10.0,
        };
        assert_eq!(script.narration_text(), "First. Second.");
    }

    #[test]
    fn resolution_matches_provider_tier() {
        assert_eq!(
            resolution_for(ProviderId::Runway, AspectRatio::Portrait),
            "1080x1920"
        );
        assert_eq!(
            resolution_for(ProviderId::GeminiVeo, AspectRatio::Landscape),
            "1280x720"
        );
        assert_eq!(
            resolution_for(ProviderId::Slideshow, AspectRatio::Square),
            "1080x1080"
        );
    }
}
