//! Failover planning after a provider exhausts its guarded attempts.
//!
//! A job gets exactly one failover. The plan walks the failed provider's
//! declared fallback chain against the providers still available, attaches
//! style adaptations for the new backend, and falls back to any remaining
//! provider as a last resort.

use reelgen_core::config::JobConfig;
use reelgen_core::error::EngineError;
use reelgen_core::provider::ProviderId;
use reelgen_core::routing::{RoutingDecision, StyleAdaptations};

use crate::catalog::fallback_chain;

/// Pick a failover target for `failed`, given the providers still available.
///
/// `available` should exclude the failed provider; it is filtered out again
/// here as a guard.
pub fn plan_failover(
    failed: ProviderId,
    available: &[ProviderId],
    config: &JobConfig,
) -> Result<RoutingDecision, EngineError> {
    let remaining: Vec<ProviderId> = available
        .iter()
        .copied()
        .filter(|p| *p != failed)
        .collect();

    if let Some(target) = fallback_chain(failed)
        .iter()
        .copied()
        .find(|p| remaining.contains(p))
    {
        tracing::warn!(
            from = %failed,
            to = %target,
            "Failing over along declared fallback chain",
        );
        return Ok(failover_decision(
            target,
            format!("Failover from {failed} to {target}"),
            remaining,
            config,
        ));
    }

    // Nothing on the declared chain survived; take anything still up.
    if let Some(target) = remaining.first().copied() {
        tracing::warn!(
            from = %failed,
            to = %target,
            "Emergency failover outside declared chain",
        );
        return Ok(failover_decision(
            target,
            format!("Emergency failover to {target}"),
            remaining,
            config,
        ));
    }

    tracing::error!(from = %failed, "No providers remain for failover");
    Err(EngineError::ProviderUnavailable(format!(
        "no providers remain after {failed} failed"
    )))
}

fn failover_decision(
    target: ProviderId,
    reason: String,
    available: Vec<ProviderId>,
    config: &JobConfig,
) -> RoutingDecision {
    let mut decision = RoutingDecision::adaptive_route(target, reason, available);
    decision.is_failover = true;
    let adaptations = style_adaptations(&config.style, target);
    if !adaptations.is_empty() {
        decision.adaptations = Some(adaptations);
    }
    decision
}

/// Adjustments for running a style on a backend that is not its first choice.
pub fn style_adaptations(style: &str, target: ProviderId) -> StyleAdaptations {
    match (style, target) {
        ("cinematic", ProviderId::GeminiVeo) => StyleAdaptations {
            prompt_enhancement: Some(
                "cinematic lighting, dramatic composition, film grain".to_string(),
            ),
            image_style: None,
            note: Some("Cinematic look approximated with creative effects".to_string()),
        },
        ("cinematic", ProviderId::Slideshow) => StyleAdaptations {
            prompt_enhancement: None,
            image_style: Some("cinematic_stills".to_string()),
            note: Some("Rendered as a slideshow of cinematic stills".to_string()),
        },
        ("photorealistic", ProviderId::GeminiVeo) => StyleAdaptations {
            prompt_enhancement: Some("photorealistic, high detail, natural lighting".to_string()),
            image_style: None,
            note: None,
        },
        ("photorealistic", ProviderId::Slideshow) => StyleAdaptations {
            prompt_enhancement: None,
            image_style: Some("photographic".to_string()),
            note: Some("Rendered as a photographic slideshow".to_string()),
        },
        ("animation", ProviderId::Runway) => StyleAdaptations {
            prompt_enhancement: Some("animated style, stylized motion".to_string()),
            image_style: None,
            note: Some("Animation approximated with stylized live motion".to_string()),
        },
        ("animation", ProviderId::Slideshow) => StyleAdaptations {
            prompt_enhancement: None,
            image_style: Some("illustrated".to_string()),
            note: Some("Rendered as an illustrated slideshow".to_string()),
        },
        _ => StyleAdaptations::default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use reelgen_core::config::AspectRatio;
    use reelgen_core::provider::RenderMode;

    fn config(style: &str) -> JobConfig {
        JobConfig {
            topic: Some("subject".into()),
            prompt: None,
            style: style.into(),
            voice: None,
            duration_secs: Some(60),
            aspect_ratio: AspectRatio::Landscape,
            include_voiceover: false,
            content_type: None,
        }
    }

    #[test]
    fn walks_declared_chain_in_order() {
        let decision = plan_failover(
            ProviderId::Runway,
            &[ProviderId::GeminiVeo, ProviderId::Slideshow],
            &config("cinematic"),
        )
        .unwrap();
        assert_eq!(decision.provider, ProviderId::GeminiVeo);
        assert!(decision.is_failover);
        assert_eq!(decision.reason, "Failover from runway to gemini_veo");
    }

    #[test]
    fn skips_unavailable_chain_entries() {
        let decision = plan_failover(
            ProviderId::Runway,
            &[ProviderId::Slideshow],
            &config("cinematic"),
        )
        .unwrap();
        assert_eq!(decision.provider, ProviderId::Slideshow);
        assert_eq!(decision.mode, RenderMode::Slideshow);
    }

    #[test]
    fn attaches_style_adaptations_for_the_new_backend() {
        let decision = plan_failover(
            ProviderId::Runway,
            &[ProviderId::Slideshow],
            &config("cinematic"),
        )
        .unwrap();
        let adaptations = decision.adaptations.unwrap();
        assert_eq!(adaptations.image_style.as_deref(), Some("cinematic_stills"));
    }

    #[test]
    fn no_adaptations_for_neutral_styles() {
        let decision = plan_failover(
            ProviderId::Runway,
            &[ProviderId::GeminiVeo],
            &config("documentary"),
        )
        .unwrap();
        assert!(decision.adaptations.is_none());
    }

    #[test]
    fn local_assembler_has_no_chain_but_can_emergency_failover() {
        let decision = plan_failover(
            ProviderId::Slideshow,
            &[ProviderId::GeminiVeo],
            &config("cinematic"),
        )
        .unwrap();
        assert_eq!(decision.provider, ProviderId::GeminiVeo);
        assert_eq!(decision.reason, "Emergency failover to gemini_veo");
    }

    #[test]
    fn fails_when_nothing_remains() {
        let err = plan_failover(ProviderId::Slideshow, &[], &config("cinematic")).unwrap_err();
        assert_matches!(err, EngineError::ProviderUnavailable(_));

        // The failed provider itself never counts as remaining.
        let err =
            plan_failover(ProviderId::Runway, &[ProviderId::Runway], &config("cinematic"))
                .unwrap_err();
        assert_matches!(err, EngineError::ProviderUnavailable(_));
    }
}
