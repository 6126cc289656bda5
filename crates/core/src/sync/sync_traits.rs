use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;

use adsync_platforms::{
    AdapterRegistry, MetricsGranularity, Platform, PlatformAdapter, UnifiedMetrics,
};

use crate::connections::{NewPlatformConnection, SaveConnectionOutcome};
use crate::errors::Result;

use super::sync_model::{CampaignSyncSummary, UserSyncReport};

/// Source of platform adapters, abstracted for testability.
pub trait AdapterProviderTrait: Send + Sync {
    fn adapter(&self, platform: Platform) -> Arc<dyn PlatformAdapter>;
}

impl AdapterProviderTrait for AdapterRegistry {
    fn adapter(&self, platform: Platform) -> Arc<dyn PlatformAdapter> {
        self.get(platform)
    }
}

/// Trait for sync service operations.
#[async_trait]
pub trait SyncServiceTrait: Send + Sync {
    /// Pull one platform's campaigns for a user and upsert them, collecting
    /// per-item errors instead of aborting.
    async fn sync_platform_campaigns(
        &self,
        user_id: &str,
        platform: Platform,
    ) -> Result<CampaignSyncSummary>;

    /// Fetch a campaign's metrics series and store the latest snapshot.
    async fn sync_campaign_metrics(
        &self,
        user_id: &str,
        campaign_id: &str,
        start: NaiveDate,
        end: NaiveDate,
        granularity: MetricsGranularity,
    ) -> Result<Vec<UnifiedMetrics>>;

    /// Sync every active connection for a user, one platform at a time.
    async fn sync_user_platforms(&self, user_id: &str) -> Result<UserSyncReport>;

    /// Validate, authenticate, store and immediately sync a new connection.
    async fn save_platform_connection(
        &self,
        new_connection: NewPlatformConnection,
    ) -> Result<SaveConnectionOutcome>;

    /// Soft-disable a connection; the row and its credentials stay.
    async fn revoke_connection(&self, user_id: &str, platform: Platform) -> Result<()>;
}
