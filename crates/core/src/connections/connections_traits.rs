use async_trait::async_trait;
use chrono::{DateTime, Utc};

use adsync_platforms::Platform;

use crate::errors::Result;

use super::connections_model::{NewPlatformConnection, PlatformConnection, SyncStatus};

/// Trait for connection repository operations.
#[async_trait]
pub trait ConnectionRepositoryTrait: Send + Sync {
    fn get_connection(&self, user_id: &str, platform: Platform) -> Result<PlatformConnection>;

    /// Active connections only.
    fn get_active_connections(&self, user_id: &str) -> Result<Vec<PlatformConnection>>;

    /// All connections, revoked ones included.
    fn get_all_connections(&self, user_id: &str) -> Result<Vec<PlatformConnection>>;

    /// Distinct ids of users holding at least one active connection.
    fn list_user_ids(&self) -> Result<Vec<String>>;

    /// Insert or update on the `(user_id, platform)` key, re-activating a
    /// previously revoked row if one exists.
    async fn upsert_connection(
        &self,
        new_connection: NewPlatformConnection,
    ) -> Result<PlatformConnection>;

    /// Record the outcome of a sync attempt without touching `is_active`.
    async fn set_sync_result(
        &self,
        connection_id: &str,
        status: SyncStatus,
        error_message: Option<String>,
        synced_at: Option<DateTime<Utc>>,
    ) -> Result<()>;

    /// Soft-disable: flip `is_active` off, keep the row and its credentials.
    async fn deactivate_connection(&self, user_id: &str, platform: Platform) -> Result<()>;
}
