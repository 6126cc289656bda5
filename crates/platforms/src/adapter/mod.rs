//! Platform adapter trait definition.
//!
//! Implement [`PlatformAdapter`] to add support for a new ad platform.
//! Adapters are stateless: credentials are passed per call, so one adapter
//! instance serves every connection on its platform.

pub mod google;
pub mod linkedin;
pub mod meta;
pub mod pinterest;

use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::errors::PlatformError;
use crate::models::{
    MetricsGranularity, Platform, PlatformCredentials, UnifiedCampaign, UnifiedMetrics,
};

/// Vendor request budget advertised by an adapter.
///
/// Informational: callers may pace themselves with it, but enforcement is
/// the vendor's (HTTP 429 maps to [`PlatformError::RateLimited`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimit {
    pub requests_per_hour: u32,
    pub min_delay: Duration,
}

impl Default for RateLimit {
    fn default() -> Self {
        Self {
            requests_per_hour: 3600,
            min_delay: Duration::ZERO,
        }
    }
}

/// Contract every ad platform adapter implements.
///
/// Field names, unit conventions (cents, micros) and pagination idioms are
/// normalized inside the adapter; everything past this trait speaks the
/// unified schema only.
#[async_trait]
pub trait PlatformAdapter: Send + Sync {
    /// The platform this adapter serves.
    fn platform(&self) -> Platform;

    /// Credential keys this platform requires.
    fn required_credentials(&self) -> &'static [&'static str];

    /// Vendor request budget.
    fn rate_limit(&self) -> RateLimit {
        RateLimit::default()
    }

    /// Shape check only: all required keys present and non-empty.
    /// Never performs a network call.
    fn validate_credentials(&self, credentials: &PlatformCredentials) -> bool {
        credentials
            .missing_keys(self.required_credentials())
            .is_empty()
    }

    /// Confirm the token works with one lightweight vendor call.
    ///
    /// A rejected token returns `Ok(false)` so callers can branch on a
    /// boolean; `Err` is reserved for transport/parse failures.
    async fn authenticate(
        &self,
        credentials: &PlatformCredentials,
    ) -> Result<bool, PlatformError>;

    /// List campaigns, newest page first per the vendor's default ordering.
    async fn get_campaigns(
        &self,
        credentials: &PlatformCredentials,
        limit: u32,
        offset: u32,
    ) -> Result<Vec<UnifiedCampaign>, PlatformError>;

    /// Fetch time-bucketed metrics for one campaign.
    ///
    /// `campaign_id` is the unified id; adapters strip their own prefix.
    async fn get_metrics(
        &self,
        credentials: &PlatformCredentials,
        campaign_id: &str,
        start: NaiveDate,
        end: NaiveDate,
        granularity: MetricsGranularity,
    ) -> Result<Vec<UnifiedMetrics>, PlatformError>;
}

/// Strip the `<platform>_` prefix from a unified campaign id, if present.
pub(crate) fn native_campaign_id<'a>(platform: Platform, campaign_id: &'a str) -> &'a str {
    campaign_id
        .strip_prefix(platform.as_str())
        .and_then(|rest| rest.strip_prefix('_'))
        .unwrap_or(campaign_id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_native_campaign_id_strips_prefix() {
        assert_eq!(native_campaign_id(Platform::Meta, "meta_ads_123"), "123");
        assert_eq!(native_campaign_id(Platform::Google, "456"), "456");
        // A foreign prefix is left alone.
        assert_eq!(
            native_campaign_id(Platform::Google, "meta_ads_123"),
            "meta_ads_123"
        );
    }
}
