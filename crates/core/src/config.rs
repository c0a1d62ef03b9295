//! Job configuration and pre-submission validation.
//!
//! A [`JobConfig`] is the immutable request a caller submits. Validation runs
//! synchronously at submission time; a config that fails validation never
//! produces a job.

use serde::{Deserialize, Serialize};

use crate::error::EngineError;

/// Longest duration any provider can produce (the local slideshow cap).
pub const MAX_DURATION_SECS: u32 = 600;

// ---------------------------------------------------------------------------
// AspectRatio
// ---------------------------------------------------------------------------

/// Output aspect ratio. Providers map this onto their supported resolutions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum AspectRatio {
    #[default]
    #[serde(rename = "16:9")]
    Landscape,
    #[serde(rename = "9:16")]
    Portrait,
    #[serde(rename = "1:1")]
    Square,
}

impl AspectRatio {
    pub fn as_str(&self) -> &'static str {
        match self {
            AspectRatio::Landscape => "16:9",
            AspectRatio::Portrait => "9:16",
            AspectRatio::Square => "1:1",
        }
    }
}

// ---------------------------------------------------------------------------
// JobConfig
// ---------------------------------------------------------------------------

/// Immutable generation request.
///
/// Either `topic` or `prompt` must be present; `style` drives routing and is
/// always required. Catalog lookups (voice and topic lists) belong to the
/// excluded configuration layer, so those fields are carried opaquely.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobConfig {
    #[serde(default)]
    pub topic: Option<String>,
    #[serde(default)]
    pub prompt: Option<String>,
    pub style: String,
    #[serde(default)]
    pub voice: Option<String>,
    #[serde(default)]
    pub duration_secs: Option<u32>,
    #[serde(default)]
    pub aspect_ratio: AspectRatio,
    #[serde(default)]
    pub include_voiceover: bool,
    #[serde(default)]
    pub content_type: Option<String>,
}

impl JobConfig {
    /// Validate the config before a job is created.
    ///
    /// Rules:
    /// - Either `topic` or `prompt` must be non-empty.
    /// - `style` must be non-empty.
    /// - `duration_secs`, when present, must be in `1..=MAX_DURATION_SECS`.
    pub fn validate(&self) -> Result<(), EngineError> {
        let has_topic = self.topic.as_deref().is_some_and(|t| !t.trim().is_empty());
        let has_prompt = self
            .prompt
            .as_deref()
            .is_some_and(|p| !p.trim().is_empty());
        if !has_topic && !has_prompt {
            return Err(EngineError::Validation(
                "Either topic or prompt is required".to_string(),
            ));
        }

        if self.style.trim().is_empty() {
            return Err(EngineError::Validation("Style is required".to_string()));
        }

        if let Some(duration) = self.duration_secs {
            if duration == 0 || duration > MAX_DURATION_SECS {
                return Err(EngineError::Validation(format!(
                    "Duration must be between 1 and {MAX_DURATION_SECS} seconds"
                )));
            }
        }

        Ok(())
    }

    /// The free-text subject of the request: topic if present, else prompt.
    pub fn subject(&self) -> &str {
        self.topic
            .as_deref()
            .filter(|t| !t.trim().is_empty())
            .or(self.prompt.as_deref())
            .unwrap_or_default()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
