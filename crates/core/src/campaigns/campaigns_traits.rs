use async_trait::async_trait;

use adsync_platforms::{Platform, UnifiedMetrics};

use crate::errors::Result;

use super::campaigns_model::{Campaign, CampaignUpsert};

/// Trait for campaign repository operations.
#[async_trait]
pub trait CampaignRepositoryTrait: Send + Sync {
    fn get_campaign(&self, campaign_id: &str) -> Result<Campaign>;
    fn get_campaigns_for_user(&self, user_id: &str) -> Result<Vec<Campaign>>;
    fn get_campaigns_for_user_platform(
        &self,
        user_id: &str,
        platform: Platform,
    ) -> Result<Vec<Campaign>>;

    /// Insert or update on the `(platform, platform_campaign_id)` key.
    /// Re-syncing the same vendor campaign must never create a second row.
    async fn upsert_campaign(&self, upsert: CampaignUpsert) -> Result<Campaign>;

    /// Overwrite the latest metrics snapshot for a campaign.
    async fn update_metrics_snapshot(
        &self,
        campaign_id: &str,
        metrics: &UnifiedMetrics,
    ) -> Result<()>;

    /// Row count for one vendor campaign, used to assert upsert semantics.
    fn count_for_platform_campaign(
        &self,
        platform: Platform,
        platform_campaign_id: &str,
    ) -> Result<i64>;
}
