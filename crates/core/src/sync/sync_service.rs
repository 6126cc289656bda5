use std::sync::Arc;

use async_trait::async_trait;
use chrono::{Duration, NaiveDate, Utc};
use futures::future::join_all;
use log::{debug, warn};

use adsync_platforms::{MetricsGranularity, Platform, PlatformError, UnifiedMetrics};

use crate::campaigns::{Campaign, CampaignRepositoryTrait, CampaignUpsert};
use crate::connections::{
    ConnectionRepositoryTrait, NewPlatformConnection, SaveConnectionOutcome, SyncStatus,
};
use crate::errors::{Error, Result, ValidationError};

use super::sync_model::{CampaignSyncSummary, UserSyncReport};
use super::sync_traits::{AdapterProviderTrait, SyncServiceTrait};

/// Page size for campaign listing. One page per sync; a follow-up sync picks
/// up anything past it.
const CAMPAIGN_PAGE_SIZE: u32 = 100;

/// How far back the post-sync metrics snapshot looks.
const METRICS_LOOKBACK_DAYS: i64 = 7;

pub struct SyncService {
    adapters: Arc<dyn AdapterProviderTrait>,
    campaign_repository: Arc<dyn CampaignRepositoryTrait>,
    connection_repository: Arc<dyn ConnectionRepositoryTrait>,
}

impl SyncService {
    pub fn new(
        adapters: Arc<dyn AdapterProviderTrait>,
        campaign_repository: Arc<dyn CampaignRepositoryTrait>,
        connection_repository: Arc<dyn ConnectionRepositoryTrait>,
    ) -> Self {
        SyncService {
            adapters,
            campaign_repository,
            connection_repository,
        }
    }

    /// Fetch the last week of daily metrics for each freshly synced campaign
    /// and keep only the newest row as the stored snapshot.
    async fn refresh_snapshots(
        &self,
        user_id: &str,
        platform: Platform,
        campaigns: &[Campaign],
        errors: &mut Vec<String>,
    ) {
        let connection = match self.connection_repository.get_connection(user_id, platform) {
            Ok(c) => c,
            Err(e) => {
                errors.push(format!("Failed to reload connection: {}", e));
                return;
            }
        };
        let adapter = self.adapters.adapter(platform);
        let end = Utc::now().date_naive();
        let start = end - Duration::days(METRICS_LOOKBACK_DAYS);

        let fetches = campaigns.iter().map(|campaign| {
            let adapter = adapter.clone();
            let credentials = connection.credentials.clone();
            async move {
                let result = adapter
                    .get_metrics(
                        &credentials,
                        &campaign.id,
                        start,
                        end,
                        MetricsGranularity::Daily,
                    )
                    .await;
                (campaign, result)
            }
        });

        for (campaign, result) in join_all(fetches).await {
            match result {
                Ok(series) => {
                    if let Some(latest) = series.iter().max_by_key(|m| m.date) {
                        if let Err(e) = self
                            .campaign_repository
                            .update_metrics_snapshot(&campaign.id, latest)
                            .await
                        {
                            errors.push(format!(
                                "Failed to store metrics for campaign {}: {}",
                                campaign.name, e
                            ));
                        }
                    }
                }
                Err(e) => {
                    errors.push(format!(
                        "Failed to fetch metrics for campaign {}: {}",
                        campaign.name, e
                    ));
                }
            }
        }
    }

    async fn record_sync_failure(&self, connection_id: &str, message: &str) {
        if let Err(e) = self
            .connection_repository
            .set_sync_result(
                connection_id,
                SyncStatus::Error,
                Some(message.to_string()),
                None,
            )
            .await
        {
            warn!("Failed to record sync failure: {}", e);
        }
    }
}

#[async_trait]
impl SyncServiceTrait for SyncService {
    async fn sync_platform_campaigns(
        &self,
        user_id: &str,
        platform: Platform,
    ) -> Result<CampaignSyncSummary> {
        let connection = self.connection_repository.get_connection(user_id, platform)?;
        if !connection.is_active {
            return Err(Error::NotFound(format!(
                "No active {} connection",
                platform.display_name()
            )));
        }

        let adapter = self.adapters.adapter(platform);

        // A rejected token flags the connection but never deactivates it.
        match adapter.authenticate(&connection.credentials).await {
            Ok(true) => {}
            Ok(false) => {
                let message = format!("{} authentication failed", platform.display_name());
                self.record_sync_failure(&connection.id, &message).await;
                return Ok(CampaignSyncSummary::failed(message));
            }
            Err(e) => {
                let message = format!("{} authentication error: {}", platform.display_name(), e);
                self.record_sync_failure(&connection.id, &message).await;
                return Ok(CampaignSyncSummary::failed(message));
            }
        }

        let fetched = match adapter
            .get_campaigns(&connection.credentials, CAMPAIGN_PAGE_SIZE, 0)
            .await
        {
            Ok(campaigns) => campaigns,
            Err(e) => {
                let message = format!("Failed to fetch campaigns: {}", e);
                self.record_sync_failure(&connection.id, &message).await;
                return Ok(CampaignSyncSummary::failed(message));
            }
        };

        debug!(
            "Syncing {} campaigns from {} for user {}",
            fetched.len(),
            platform.display_name(),
            user_id
        );

        // Per-item error collection: one bad campaign never aborts the batch,
        // and there is no retry.
        let mut synced: Vec<Campaign> = Vec::new();
        let mut errors: Vec<String> = Vec::new();
        for campaign in fetched {
            let name = campaign.name.clone();
            let upsert = CampaignUpsert {
                user_id: user_id.to_string(),
                campaign,
            };
            match self.campaign_repository.upsert_campaign(upsert).await {
                Ok(stored) => synced.push(stored),
                Err(e) => errors.push(format!("Failed to sync campaign {}: {}", name, e)),
            }
        }

        self.refresh_snapshots(user_id, platform, &synced, &mut errors)
            .await;

        let success = errors.is_empty();
        let status = if success {
            SyncStatus::Success
        } else {
            SyncStatus::Error
        };
        self.connection_repository
            .set_sync_result(
                &connection.id,
                status,
                errors.first().cloned(),
                Some(Utc::now()),
            )
            .await?;

        Ok(CampaignSyncSummary {
            success,
            synced: synced.len() as u32,
            errors,
        })
    }

    async fn sync_campaign_metrics(
        &self,
        user_id: &str,
        campaign_id: &str,
        start: NaiveDate,
        end: NaiveDate,
        granularity: MetricsGranularity,
    ) -> Result<Vec<UnifiedMetrics>> {
        let campaign = self.campaign_repository.get_campaign(campaign_id)?;
        if campaign.user_id != user_id {
            return Err(Error::NotFound(format!("Campaign {} not found", campaign_id)));
        }

        let connection = self
            .connection_repository
            .get_connection(user_id, campaign.platform)?;
        let adapter = self.adapters.adapter(campaign.platform);

        let series = adapter
            .get_metrics(&connection.credentials, campaign_id, start, end, granularity)
            .await?;

        // Latest snapshot only; the full series goes back to the caller.
        if let Some(latest) = series.iter().max_by_key(|m| m.date) {
            self.campaign_repository
                .update_metrics_snapshot(campaign_id, latest)
                .await?;
        }

        Ok(series)
    }

    async fn sync_user_platforms(&self, user_id: &str) -> Result<UserSyncReport> {
        let connections = self.connection_repository.get_active_connections(user_id)?;

        // Sequential on purpose: one platform's vendor throttling should not
        // be amplified by parallel fan-out.
        let mut report = UserSyncReport::new();
        for connection in connections {
            let summary = match self
                .sync_platform_campaigns(user_id, connection.platform)
                .await
            {
                Ok(summary) => summary,
                Err(e) => CampaignSyncSummary::failed(e.to_string()),
            };
            report.insert(connection.platform, summary);
        }
        Ok(report)
    }

    async fn save_platform_connection(
        &self,
        new_connection: NewPlatformConnection,
    ) -> Result<SaveConnectionOutcome> {
        let adapter = self.adapters.adapter(new_connection.platform);

        // Shape check first: no network call happens for malformed input.
        let missing = new_connection
            .credentials
            .missing_keys(adapter.required_credentials());
        if !missing.is_empty() {
            return Err(Error::Validation(ValidationError::InvalidCredentials(
                missing.join(", "),
            )));
        }

        if !adapter.authenticate(&new_connection.credentials).await? {
            return Err(Error::Platform(PlatformError::AuthenticationFailed {
                platform: new_connection.platform,
            }));
        }

        let user_id = new_connection.user_id.clone();
        let platform = new_connection.platform;
        self.connection_repository
            .upsert_connection(new_connection)
            .await?;

        // One immediate sync so the dashboard is populated right away.
        let sync = self.sync_platform_campaigns(&user_id, platform).await?;
        let connection = self.connection_repository.get_connection(&user_id, platform)?;

        Ok(SaveConnectionOutcome { connection, sync })
    }

    async fn revoke_connection(&self, user_id: &str, platform: Platform) -> Result<()> {
        // Confirm the row exists so revoking a never-connected platform 404s.
        self.connection_repository.get_connection(user_id, platform)?;
        self.connection_repository
            .deactivate_connection(user_id, platform)
            .await
    }
}
