//! Health-aware dynamic routing.
//!
//! The dynamic router probes every enabled provider, then walks a preference
//! order derived from style, content type, and duration. Only providers that
//! are both enabled and currently healthy are considered; when none remain
//! the route fails with [`EngineError::ProviderUnavailable`].

use std::sync::Arc;

use reelgen_core::config::JobConfig;
use reelgen_core::error::EngineError;
use reelgen_core::provider::ProviderId;
use reelgen_core::routing::RoutingDecision;
use reelgen_providers::traits::HealthCheckService;

use crate::catalog::ProviderCatalog;

/// Duration at or below which short-clip providers are preferred.
const SHORT_CLIP_SECS: u32 = 30;
/// Duration above which only the local assembler is cost-effective.
const LONG_FORM_SECS: u32 = 300;

pub struct DynamicRouter {
    catalog: ProviderCatalog,
    health: Arc<dyn HealthCheckService>,
}

impl DynamicRouter {
    pub fn new(catalog: ProviderCatalog, health: Arc<dyn HealthCheckService>) -> Self {
        Self { catalog, health }
    }

    /// Providers that are enabled and currently pass their health probe,
    /// in canonical order.
    pub async fn available_providers(&self) -> Vec<ProviderId> {
        let mut available = Vec::new();
        for provider in self.catalog.enabled_providers() {
            let status = self.health.check(provider).await;
            if status.healthy {
                available.push(provider);
            } else {
                tracing::warn!(provider = %provider, "Provider failed health check");
            }
        }
        available
    }

    /// Pick the best available provider for this config.
    pub async fn route(&self, config: &JobConfig) -> Result<RoutingDecision, EngineError> {
        let available = self.available_providers().await;
        if available.is_empty() {
            tracing::error!("No providers passed health checks");
            return Err(EngineError::ProviderUnavailable(
                "no enabled provider passed its health check".to_string(),
            ));
        }

        let preferences = preference_order(config);
        let selected = preferences
            .iter()
            .copied()
            .find(|p| available.contains(p))
            // Preference lists always cover the full provider set unless the
            // style pins a single provider; fall back to whatever is up.
            .unwrap_or(available[0]);

        let reason = selection_reason(selected, config);
        tracing::info!(
            provider = %selected,
            available = available.len(),
            reason = %reason,
            "Dynamic routing selected provider",
        );
        Ok(RoutingDecision::adaptive_route(selected, reason, available))
    }
}

/// Preference order for a config: style preferences, overridden by content
/// type, then adjusted for duration extremes.
fn preference_order(config: &JobConfig) -> Vec<ProviderId> {
    use ProviderId::*;

    let mut order: Vec<ProviderId> = match config.style.as_str() {
        "cinematic" | "photorealistic" => vec![Runway, GeminiVeo, Slideshow],
        "documentary" => vec![Runway, Slideshow, GeminiVeo],
        "animation" | "artistic" | "abstract" => vec![GeminiVeo, Runway, Slideshow],
        s if s.starts_with("slideshow") => vec![Slideshow],
        _ => vec![Runway, GeminiVeo, Slideshow],
    };

    if let Some(content_type) = config.content_type.as_deref() {
        let by_content: Option<Vec<ProviderId>> = match content_type {
            "educational" => Some(vec![Slideshow, GeminiVeo, Runway]),
            "corporate" => Some(vec![Runway, Slideshow, GeminiVeo]),
            "entertainment" | "creative" => Some(vec![GeminiVeo, Runway, Slideshow]),
            _ => None,
        };
        if let Some(by_content) = by_content {
            order = by_content;
        }
    }

    match config.duration_secs {
        Some(d) if d <= SHORT_CLIP_SECS => promote(&mut order, GeminiVeo),
        Some(d) if d > LONG_FORM_SECS => promote(&mut order, Slideshow),
        _ => {}
    }

    order
}

/// Move `provider` to the front of the preference order, inserting it if the
/// style pinned a shorter list.
fn promote(order: &mut Vec<ProviderId>, provider: ProviderId) {
    order.retain(|p| *p != provider);
    order.insert(0, provider);
}

fn selection_reason(selected: ProviderId, config: &JobConfig) -> String {
    match config.duration_secs {
        Some(d) if d <= SHORT_CLIP_SECS && selected == ProviderId::GeminiVeo => {
            return format!("Short duration ({d}s) suits fast generation");
        }
        Some(d) if d > LONG_FORM_SECS && selected == ProviderId::Slideshow => {
            return format!("Long duration ({d}s) is cost-effective as a slideshow");
        }
        _ => {}
    }
    match selected {
        ProviderId::Runway => format!("Best quality match for {} style", config.style),
        ProviderId::GeminiVeo => format!("Creative strengths match {} style", config.style),
        ProviderId::Slideshow => format!("Reliable local rendering for {} style", config.style),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use reelgen_core::config::AspectRatio;
    use reelgen_providers::sim::SimHealthService;

    fn config(style: &str, duration: Option<u32>) -> JobConfig {
        JobConfig {
            topic: Some("subject".into()),
            prompt: None,
            style: style.into(),
            voice: None,
            duration_secs: duration,
            aspect_ratio: AspectRatio::Landscape,
            include_voiceover: false,
            content_type: None,
        }
    }

    fn router(health: SimHealthService) -> DynamicRouter {
        DynamicRouter::new(ProviderCatalog::all_enabled(), Arc::new(health))
    }

    #[tokio::test]
    async fn cinematic_prefers_runway_when_healthy() {
        let router = router(SimHealthService::all_healthy());
        let decision = router.route(&config("cinematic", None)).await.unwrap();
        assert_eq!(decision.provider, ProviderId::Runway);
        assert!(decision.adaptive);
        assert_eq!(decision.available_providers, ProviderId::ALL.to_vec());
    }

    #[tokio::test]
    async fn unhealthy_preferred_provider_is_skipped() {
        let health = SimHealthService::all_healthy();
        health.set_healthy(ProviderId::Runway, false);
        let router = router(health);
        let decision = router.route(&config("cinematic", None)).await.unwrap();
        assert_eq!(decision.provider, ProviderId::GeminiVeo);
    }

    #[tokio::test]
    async fn no_healthy_providers_is_an_error() {
        let router = router(SimHealthService::all_unhealthy());
        let err = router.route(&config("cinematic", None)).await.unwrap_err();
        assert_matches!(err, EngineError::ProviderUnavailable(_));
    }

    #[tokio::test]
    async fn short_duration_promotes_fast_provider() {
        let router = router(SimHealthService::all_healthy());
        let decision = router.route(&config("cinematic", Some(20))).await.unwrap();
        assert_eq!(decision.provider, ProviderId::GeminiVeo);
    }

    #[tokio::test]
    async fn mid_length_cinematic_stays_on_preferred_quality() {
        // 200s is past the short-clip cutoff but within cost-effective range
        // for remote rendering.
        let health = SimHealthService::all_healthy();
        health.set_healthy(ProviderId::Runway, false);
        let router = router(health);
        let decision = router.route(&config("cinematic", Some(200))).await.unwrap();
        assert_eq!(decision.provider, ProviderId::GeminiVeo);
    }

    #[tokio::test]
    async fn very_long_duration_promotes_local_assembler() {
        let router = router(SimHealthService::all_healthy());
        let decision = router.route(&config("cinematic", Some(400))).await.unwrap();
        assert_eq!(decision.provider, ProviderId::Slideshow);
    }

    #[tokio::test]
    async fn slideshow_style_pins_local_provider() {
        let router = router(SimHealthService::all_healthy());
        let decision = router
            .route(&config("slideshow_modern", None))
            .await
            .unwrap();
        assert_eq!(decision.provider, ProviderId::Slideshow);
    }

    #[tokio::test]
    async fn content_type_overrides_style_preference() {
        let router = router(SimHealthService::all_healthy());
        let mut cfg = config("cinematic", None);
        cfg.content_type = Some("educational".into());
        let decision = router.route(&cfg).await.unwrap();
        assert_eq!(decision.provider, ProviderId::Slideshow);
    }

    #[tokio::test]
    async fn disabled_provider_is_never_considered() {
        let catalog = ProviderCatalog::all_enabled().with_enabled(ProviderId::Runway, false);
        let router = DynamicRouter::new(catalog, Arc::new(SimHealthService::all_healthy()));
        let decision = router.route(&config("cinematic", None)).await.unwrap();
        assert_eq!(decision.provider, ProviderId::GeminiVeo);
        assert!(!decision.available_providers.contains(&ProviderId::Runway));
    }
}
