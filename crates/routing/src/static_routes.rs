//! Static, table-driven provider routing.
//!
//! Checked in order: direct style table, content-type table, duration
//! buckets (smallest satisfying `max_seconds` wins), keyword heuristics over
//! the free-text topic, then a fixed default. Tables are deserializable so a
//! deployment can override the built-ins from configuration.

use std::collections::HashMap;

use serde::Deserialize;

use reelgen_core::config::JobConfig;
use reelgen_core::provider::ProviderId;
use reelgen_core::routing::RoutingDecision;

// ---------------------------------------------------------------------------
// Tables
// ---------------------------------------------------------------------------

/// A direct style -> provider mapping.
#[derive(Debug, Clone, Deserialize)]
pub struct StyleRoute {
    pub provider: ProviderId,
    pub reason: String,
}

/// A content-type preference.
#[derive(Debug, Clone, Deserialize)]
pub struct ContentTypeRoute {
    pub prefer: ProviderId,
    pub reason: String,
}

/// One duration bucket. Buckets are kept in declared order; selection picks
/// the smallest `max_seconds` that still covers the requested duration.
#[derive(Debug, Clone, Deserialize)]
pub struct DurationBucket {
    pub max_seconds: u32,
    pub prefer: ProviderId,
    pub reason: String,
}

/// The full static routing configuration.
///
/// Sections omitted from a configuration document deserialize as empty, not
/// as the built-in tables; [`StaticRoutes::default`] is the only source of
/// the built-ins.
#[derive(Debug, Clone, Deserialize)]
pub struct StaticRoutes {
    #[serde(default)]
    pub style_routing: HashMap<String, StyleRoute>,
    #[serde(default)]
    pub content_type_routing: HashMap<String, ContentTypeRoute>,
    #[serde(default)]
    pub duration_routing: Vec<DurationBucket>,
}

impl StaticRoutes {
    /// Parse routing tables from a JSON configuration document.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

impl Default for StaticRoutes {
    fn default() -> Self {
        let mut style_routing = HashMap::new();
        for style in ["slideshow_modern", "slideshow_classic"] {
            style_routing.insert(
                style.to_string(),
                StyleRoute {
                    provider: ProviderId::Slideshow,
                    reason: "Slideshow styles always render locally".to_string(),
                },
            );
        }

        let mut content_type_routing = HashMap::new();
        content_type_routing.insert(
            "educational".to_string(),
            ContentTypeRoute {
                prefer: ProviderId::Slideshow,
                reason: "Educational content works well as a slideshow".to_string(),
            },
        );
        content_type_routing.insert(
            "corporate".to_string(),
            ContentTypeRoute {
                prefer: ProviderId::Runway,
                reason: "Corporate content needs Runway's professional quality".to_string(),
            },
        );
        content_type_routing.insert(
            "entertainment".to_string(),
            ContentTypeRoute {
                prefer: ProviderId::GeminiVeo,
                reason: "Entertainment content suits Gemini Veo's creative output".to_string(),
            },
        );
        content_type_routing.insert(
            "creative".to_string(),
            ContentTypeRoute {
                prefer: ProviderId::GeminiVeo,
                reason: "Creative content suits Gemini Veo's artistic capabilities".to_string(),
            },
        );

        let duration_routing = vec![
            DurationBucket {
                max_seconds: 30,
                prefer: ProviderId::GeminiVeo,
                reason: "Short clips render fastest on Gemini Veo".to_string(),
            },
            DurationBucket {
                max_seconds: 120,
                prefer: ProviderId::Runway,
                reason: "Standard durations get Runway's cinematic quality".to_string(),
            },
            DurationBucket {
                max_seconds: 600,
                prefer: ProviderId::Slideshow,
                reason: "Long durations are cost-effective as slideshows".to_string(),
            },
        ];

        Self {
            style_routing,
            content_type_routing,
            duration_routing,
        }
    }
}

// ---------------------------------------------------------------------------
// Router
// ---------------------------------------------------------------------------

/// Table-driven router with no health awareness.
#[derive(Debug, Clone, Default)]
pub struct StaticRouter {
    routes: StaticRoutes,
}

impl StaticRouter {
    pub fn new(routes: StaticRoutes) -> Self {
        Self { routes }
    }

    /// Route a config through the static tables.
    pub fn route(&self, config: &JobConfig) -> RoutingDecision {
        // 1. Direct style mapping.
        if let Some(route) = self.routes.style_routing.get(&config.style) {
            tracing::info!(
                style = %config.style,
                provider = %route.provider,
                "Routing style via style table",
            );
            return RoutingDecision::static_route(route.provider, route.reason.clone());
        }

        // 2. Content-type preference.
        if let Some(route) = config
            .content_type
            .as_deref()
            .and_then(|ct| self.routes.content_type_routing.get(ct))
        {
            return RoutingDecision::static_route(route.prefer, route.reason.clone());
        }

        // 3. Duration buckets: smallest max_seconds that covers the request,
        //    declared order breaking ties.
        if let Some(duration) = config.duration_secs {
            if let Some(bucket) = self.smallest_covering_bucket(duration) {
                tracing::info!(
                    duration_secs = duration,
                    provider = %bucket.prefer,
                    "Routing via duration bucket",
                );
                return RoutingDecision::static_route(bucket.prefer, bucket.reason.clone());
            }
        }

        // 4. Keyword heuristics over the free-text subject.
        if let Some(decision) = route_by_keywords(config.subject()) {
            return decision;
        }

        // 5. Fixed default.
        tracing::info!(style = %config.style, "No specific routing found, using default");
        RoutingDecision::static_route(
            ProviderId::Runway,
            "Default provider for general AI video generation",
        )
    }

    fn smallest_covering_bucket(&self, duration: u32) -> Option<&DurationBucket> {
        self.routes
            .duration_routing
            .iter()
            .filter(|bucket| bucket.max_seconds >= duration)
            .min_by_key(|bucket| bucket.max_seconds)
    }
}

/// Keyword heuristics over free-text topics.
fn route_by_keywords(subject: &str) -> Option<RoutingDecision> {
    let lower = subject.to_lowercase();
    let contains_any = |words: &[&str]| words.iter().any(|w| lower.contains(w));

    if contains_any(&["education", "learn", "science", "history"]) {
        return Some(RoutingDecision::static_route(
            ProviderId::Slideshow,
            "Educational content works well with slideshow format",
        ));
    }
    if contains_any(&["creative", "art", "fantasy", "abstract"]) {
        return Some(RoutingDecision::static_route(
            ProviderId::GeminiVeo,
            "Creative content suited for Gemini Veo's artistic capabilities",
        ));
    }
    if contains_any(&["documentary", "realistic", "corporate", "professional"]) {
        return Some(RoutingDecision::static_route(
            ProviderId::Runway,
            "Realistic content suited for Runway's cinematic quality",
        ));
    }
    None
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use reelgen_core::config::AspectRatio;
    use reelgen_core::provider::RenderMode;

    fn config(style: &str) -> JobConfig {
        JobConfig {
            topic: Some("general subject".into()),
            prompt: None,
            style: style.into(),
            voice: None,
            duration_secs: None,
            aspect_ratio: AspectRatio::Landscape,
            include_voiceover: false,
            content_type: None,
        }
    }

    #[test]
    fn slideshow_style_always_routes_local() {
        let router = StaticRouter::default();
        for duration in [None, Some(10), Some(500)] {
            let mut cfg = config("slideshow_modern");
            cfg.duration_secs = duration;
            cfg.content_type = Some("corporate".into());
            let decision = router.route(&cfg);
            assert_eq!(decision.provider, ProviderId::Slideshow);
            assert_eq!(decision.mode, RenderMode::Slideshow);
        }
    }

    #[test]
    fn content_type_wins_over_duration() {
        let router = StaticRouter::default();
        let mut cfg = config("unknown_style");
        cfg.content_type = Some("educational".into());
        cfg.duration_secs = Some(20);
        assert_eq!(router.route(&cfg).provider, ProviderId::Slideshow);
    }

    #[test]
    fn duration_picks_smallest_covering_bucket() {
        let router = StaticRouter::default();
        let mut cfg = config("unknown_style");

        cfg.duration_secs = Some(20);
        assert_eq!(router.route(&cfg).provider, ProviderId::GeminiVeo);

        cfg.duration_secs = Some(90);
        assert_eq!(router.route(&cfg).provider, ProviderId::Runway);

        cfg.duration_secs = Some(300);
        assert_eq!(router.route(&cfg).provider, ProviderId::Slideshow);
    }

    #[test]
    fn smallest_bucket_wins_even_when_declared_later() {
        let routes = StaticRoutes {
            style_routing: HashMap::new(),
            content_type_routing: HashMap::new(),
            duration_routing: vec![
                DurationBucket {
                    max_seconds: 600,
                    prefer: ProviderId::Slideshow,
                    reason: "long".into(),
                },
                DurationBucket {
                    max_seconds: 60,
                    prefer: ProviderId::GeminiVeo,
                    reason: "short".into(),
                },
            ],
        };
        let router = StaticRouter::new(routes);
        let mut cfg = config("unknown_style");
        cfg.duration_secs = Some(45);
        assert_eq!(router.route(&cfg).provider, ProviderId::GeminiVeo);
    }

    #[test]
    fn keyword_heuristics_cover_the_three_families() {
        let router = StaticRouter::default();

        let mut cfg = config("unknown_style");
        cfg.topic = Some("the history of rome".into());
        assert_eq!(router.route(&cfg).provider, ProviderId::Slideshow);

        cfg.topic = Some("abstract art journeys".into());
        assert_eq!(router.route(&cfg).provider, ProviderId::GeminiVeo);

        cfg.topic = Some("corporate training intro".into());
        assert_eq!(router.route(&cfg).provider, ProviderId::Runway);
    }

    #[test]
    fn falls_back_to_default_provider() {
        let router = StaticRouter::default();
        let decision = router.route(&config("unknown_style"));
        assert_eq!(decision.provider, ProviderId::Runway);
        assert!(!decision.adaptive);
    }

    #[test]
    fn tables_parse_from_json() {
        let json = r#"{
            "style_routing": {
                "noir": { "provider": "runway", "reason": "test" }
            },
            "duration_routing": [
                { "max_seconds": 15, "prefer": "gemini_veo", "reason": "quick" }
            ]
        }"#;
        let routes = StaticRoutes::from_json(json).unwrap();
        assert_eq!(routes.style_routing["noir"].provider, ProviderId::Runway);
        assert_eq!(routes.duration_routing.len(), 1);
        // Omitted sections default to empty.
        assert!(routes.content_type_routing.is_empty());
    }
}
