use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use adsync_platforms::{Platform, PlatformCredentials};

/// Outcome of the most recent sync attempt for a connection.
///
/// An `Error` status never deactivates a connection; only an explicit
/// revoke does. Users re-enter credentials on their own schedule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SyncStatus {
    Pending,
    Success,
    Error,
}

impl SyncStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SyncStatus::Pending => "pending",
            SyncStatus::Success => "success",
            SyncStatus::Error => "error",
        }
    }

    pub fn from_storage(s: &str) -> Self {
        match s {
            "success" => SyncStatus::Success,
            "error" => SyncStatus::Error,
            _ => SyncStatus::Pending,
        }
    }
}

/// A user's link to one ad platform.
///
/// One row per `(user_id, platform)`: re-connecting replaces credentials in
/// place. Revoking flips `is_active` off but keeps the row, so a later
/// re-connect restores history.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlatformConnection {
    pub id: String,
    pub user_id: String,
    pub platform: Platform,
    #[serde(skip_serializing)]
    pub credentials: PlatformCredentials,
    pub account_name: Option<String>,
    pub is_active: bool,
    pub sync_status: SyncStatus,
    pub error_message: Option<String>,
    pub last_synced_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Payload for creating or replacing a connection.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewPlatformConnection {
    pub user_id: String,
    pub platform: Platform,
    pub credentials: PlatformCredentials,
    pub account_name: Option<String>,
}

/// Result of saving a connection: the stored row plus the sync that
/// immediately followed it.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveConnectionOutcome {
    pub connection: PlatformConnection,
    pub sync: crate::sync::CampaignSyncSummary,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sync_status_storage_round_trip() {
        for status in [SyncStatus::Pending, SyncStatus::Success, SyncStatus::Error] {
            assert_eq!(SyncStatus::from_storage(status.as_str()), status);
        }
        assert_eq!(SyncStatus::from_storage("garbage"), SyncStatus::Pending);
    }

    #[test]
    fn test_credentials_never_serialized() {
        let connection = PlatformConnection {
            id: "conn-1".to_string(),
            user_id: "user-1".to_string(),
            platform: Platform::Meta,
            credentials: PlatformCredentials::new().with("access_token", "secret"),
            account_name: None,
            is_active: true,
            sync_status: SyncStatus::Pending,
            error_message: None,
            last_synced_at: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        let json = serde_json::to_string(&connection).unwrap();
        assert!(!json.contains("secret"));
        assert!(!json.contains("credentials"));
    }
}
