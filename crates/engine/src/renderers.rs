//! One renderer per backend identity, dispatched exhaustively.

use std::sync::Arc;

use reelgen_core::provider::ProviderId;
use reelgen_providers::sim::SimMediaProvider;
use reelgen_providers::MediaProvider;

/// The full renderer table. Every [`ProviderId`] has exactly one entry, so
/// dispatch can never miss.
#[derive(Clone)]
pub struct RendererSet {
    runway: Arc<dyn MediaProvider>,
    gemini_veo: Arc<dyn MediaProvider>,
    slideshow: Arc<dyn MediaProvider>,
}

impl RendererSet {
    pub fn new(
        runway: Arc<dyn MediaProvider>,
        gemini_veo: Arc<dyn MediaProvider>,
        slideshow: Arc<dyn MediaProvider>,
    ) -> Self {
        Self {
            runway,
            gemini_veo,
            slideshow,
        }
    }

    /// A set backed entirely by deterministic in-process renderers.
    pub fn simulated() -> Self {
        Self::new(
            Arc::new(SimMediaProvider::new(ProviderId::Runway)),
            Arc::new(SimMediaProvider::new(ProviderId::GeminiVeo)),
            Arc::new(SimMediaProvider::new(ProviderId::Slideshow)),
        )
    }

    pub fn for_provider(&self, provider: ProviderId) -> &Arc<dyn MediaProvider> {
        match provider {
            ProviderId::Runway => &self.runway,
            ProviderId::GeminiVeo => &self.gemini_veo,
            ProviderId::Slideshow => &self.slideshow,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_provider_dispatches_to_its_own_renderer() {
        let set = RendererSet::simulated();
        for provider in ProviderId::ALL {
            assert_eq!(set.for_provider(provider).id(), provider);
        }
    }
}
