use std::collections::HashMap;

use serde::Serialize;

use adsync_platforms::Platform;

/// Result of syncing one platform's campaigns for a user.
///
/// Best effort: `success` is true only when every item landed, but a partial
/// failure still syncs everything it can and reports the rest in `errors`.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CampaignSyncSummary {
    pub success: bool,
    pub synced: u32,
    pub errors: Vec<String>,
}

impl CampaignSyncSummary {
    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            success: false,
            synced: 0,
            errors: vec![error.into()],
        }
    }
}

/// Per-platform summaries from a full user sync.
pub type UserSyncReport = HashMap<Platform, CampaignSyncSummary>;
