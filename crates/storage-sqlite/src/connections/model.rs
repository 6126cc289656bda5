//! Database models for platform connections.

use diesel::prelude::*;

use adsync_core::connections::{PlatformConnection, SyncStatus};
use adsync_core::errors::{DatabaseError, Error};
use adsync_platforms::{Platform, PlatformCredentials};

use crate::utils::{parse_datetime, parse_datetime_opt};

/// Database model for platform connections.
///
/// Credentials are stored as a JSON object keyed by credential name.
#[derive(Queryable, Identifiable, Insertable, AsChangeset, Selectable, Debug, Clone)]
#[diesel(table_name = crate::schema::platform_connections)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct PlatformConnectionDB {
    pub id: String,
    pub user_id: String,
    pub platform: String,
    pub credentials: String,
    pub account_name: Option<String>,
    pub is_active: bool,
    pub sync_status: String,
    pub error_message: Option<String>,
    pub last_synced_at: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl PlatformConnectionDB {
    pub fn into_domain(self) -> adsync_core::Result<PlatformConnection> {
        let platform: Platform = self
            .platform
            .parse()
            .map_err(|e: String| Error::Database(DatabaseError::Internal(e)))?;
        let credentials: PlatformCredentials =
            serde_json::from_str(&self.credentials).map_err(|e| {
                Error::Database(DatabaseError::Internal(format!(
                    "Malformed stored credentials: {}",
                    e
                )))
            })?;

        Ok(PlatformConnection {
            id: self.id,
            user_id: self.user_id,
            platform,
            credentials,
            account_name: self.account_name,
            is_active: self.is_active,
            sync_status: SyncStatus::from_storage(&self.sync_status),
            error_message: self.error_message,
            last_synced_at: parse_datetime_opt(self.last_synced_at.as_deref()),
            created_at: parse_datetime(&self.created_at),
            updated_at: parse_datetime(&self.updated_at),
        })
    }
}
