//! Routing decisions and style adaptation hints.

use serde::{Deserialize, Serialize};

use crate::provider::{ProviderId, RenderMode};

// ---------------------------------------------------------------------------
// RoutingDecision
// ---------------------------------------------------------------------------

/// The chosen provider, mode, and justification for a job.
///
/// One decision is active at a time per job. Failover produces a new decision
/// (with `is_failover: true`) without changing job identity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoutingDecision {
    pub provider: ProviderId,
    pub mode: RenderMode,
    pub reason: String,
    /// Providers that passed their health check when this decision was made.
    /// Empty for static (table-only) decisions.
    #[serde(default)]
    pub available_providers: Vec<ProviderId>,
    /// Whether live health signals informed this decision.
    #[serde(default)]
    pub adaptive: bool,
    #[serde(default)]
    pub is_failover: bool,
    /// Hints for running a style on a non-ideal backend after failover.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub adaptations: Option<StyleAdaptations>,
}

impl RoutingDecision {
    /// A decision produced by the static routing tables.
    pub fn static_route(provider: ProviderId, reason: impl Into<String>) -> Self {
        Self {
            provider,
            mode: provider.render_mode(),
            reason: reason.into(),
            available_providers: Vec::new(),
            adaptive: false,
            is_failover: false,
            adaptations: None,
        }
    }

    /// A decision produced by health-aware dynamic routing.
    pub fn adaptive_route(
        provider: ProviderId,
        reason: impl Into<String>,
        available_providers: Vec<ProviderId>,
    ) -> Self {
        Self {
            provider,
            mode: provider.render_mode(),
            reason: reason.into(),
            available_providers,
            adaptive: true,
            is_failover: false,
            adaptations: None,
        }
    }
}

// ---------------------------------------------------------------------------
// StyleAdaptations
// ---------------------------------------------------------------------------

/// Provider-specific prompt/asset adjustments applied when a style runs on a
/// backend that is not its first choice.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StyleAdaptations {
    /// Appended to the generation prompt to steer the fallback provider.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prompt_enhancement: Option<String>,
    /// Overrides the imagery style for slideshow assembly.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_style: Option<String>,
    /// Free-form caveat surfaced alongside the result.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

impl StyleAdaptations {
    pub fn is_empty(&self) -> bool {
        self.prompt_enhancement.is_none() && self.image_style.is_none() && self.note.is_none()
    }
}
