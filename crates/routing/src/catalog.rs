//! Provider catalog: which backends are enabled and how they fall back.

use std::collections::HashMap;

use reelgen_core::provider::ProviderId;

/// Declared fallback chain for a provider, walked in order on failover.
///
/// The local slideshow assembler has no fallback; it is the floor every
/// remote chain ends on.
pub fn fallback_chain(provider: ProviderId) -> &'static [ProviderId] {
    match provider {
        ProviderId::Runway => &[ProviderId::GeminiVeo, ProviderId::Slideshow],
        ProviderId::GeminiVeo => &[ProviderId::Runway, ProviderId::Slideshow],
        ProviderId::Slideshow => &[],
    }
}

/// Enabled/disabled switches over the closed provider set.
///
/// Deployment configuration may disable a provider outright (e.g. no API key
/// present); the dynamic router then never health-checks it.
#[derive(Debug, Clone)]
pub struct ProviderCatalog {
    enabled: HashMap<ProviderId, bool>,
}

impl Default for ProviderCatalog {
    fn default() -> Self {
        Self::all_enabled()
    }
}

impl ProviderCatalog {
    pub fn all_enabled() -> Self {
        Self {
            enabled: ProviderId::ALL.into_iter().map(|p| (p, true)).collect(),
        }
    }

    pub fn with_enabled(mut self, provider: ProviderId, enabled: bool) -> Self {
        self.enabled.insert(provider, enabled);
        self
    }

    pub fn is_enabled(&self, provider: ProviderId) -> bool {
        self.enabled.get(&provider).copied().unwrap_or(false)
    }

    /// Enabled providers in canonical order.
    pub fn enabled_providers(&self) -> Vec<ProviderId> {
        ProviderId::ALL
            .into_iter()
            .filter(|p| self.is_enabled(*p))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_enabled_by_default() {
        let catalog = ProviderCatalog::default();
        assert_eq!(catalog.enabled_providers(), ProviderId::ALL.to_vec());
    }

    #[test]
    fn disabling_removes_from_enumeration() {
        let catalog = ProviderCatalog::all_enabled().with_enabled(ProviderId::Runway, false);
        assert!(!catalog.is_enabled(ProviderId::Runway));
        assert_eq!(
            catalog.enabled_providers(),
            vec![ProviderId::GeminiVeo, ProviderId::Slideshow]
        );
    }

    #[test]
    fn every_remote_chain_ends_on_slideshow() {
        for provider in [ProviderId::Runway, ProviderId::GeminiVeo] {
            assert_eq!(
                fallback_chain(provider).last(),
                Some(&ProviderId::Slideshow)
            );
        }
        assert!(fallback_chain(ProviderId::Slideshow).is_empty());
    }
}
