//! Adapter registry.
//!
//! One adapter instance per platform, built once and shared. Dispatch is an
//! exhaustive match on [`Platform`], so adding a variant without wiring an
//! adapter fails to compile.

use std::sync::Arc;
use std::time::Duration;

use reqwest::Client;

use crate::adapter::{
    google::GoogleAdsAdapter, linkedin::LinkedInAdsAdapter, meta::MetaAdsAdapter,
    pinterest::PinterestAdsAdapter, PlatformAdapter,
};
use crate::models::Platform;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

pub struct AdapterRegistry {
    meta: Arc<MetaAdsAdapter>,
    google: Arc<GoogleAdsAdapter>,
    linkedin: Arc<LinkedInAdsAdapter>,
    pinterest: Arc<PinterestAdsAdapter>,
}

impl AdapterRegistry {
    pub fn new() -> Self {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .unwrap_or_default();
        Self::with_client(client)
    }

    /// Build the registry around a caller-supplied HTTP client.
    pub fn with_client(client: Client) -> Self {
        Self {
            meta: Arc::new(MetaAdsAdapter::new(client.clone())),
            google: Arc::new(GoogleAdsAdapter::new(client.clone())),
            linkedin: Arc::new(LinkedInAdsAdapter::new(client.clone())),
            pinterest: Arc::new(PinterestAdsAdapter::new(client)),
        }
    }

    pub fn get(&self, platform: Platform) -> Arc<dyn PlatformAdapter> {
        match platform {
            Platform::Meta => self.meta.clone(),
            Platform::Google => self.google.clone(),
            Platform::LinkedIn => self.linkedin.clone(),
            Platform::Pinterest => self.pinterest.clone(),
        }
    }

    pub fn all(&self) -> Vec<Arc<dyn PlatformAdapter>> {
        Platform::ALL.iter().map(|p| self.get(*p)).collect()
    }
}

impl Default for AdapterRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_dispatches_every_platform() {
        let registry = AdapterRegistry::new();
        for platform in Platform::ALL {
            assert_eq!(registry.get(platform).platform(), platform);
        }
    }

    #[test]
    fn test_all_returns_one_adapter_per_platform() {
        let registry = AdapterRegistry::new();
        assert_eq!(registry.all().len(), Platform::ALL.len());
    }
}
