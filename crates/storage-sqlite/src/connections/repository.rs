use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use adsync_core::connections::{
    ConnectionRepositoryTrait, NewPlatformConnection, PlatformConnection, SyncStatus,
};
use adsync_core::errors::{DatabaseError, Error, Result};
use adsync_platforms::Platform;

use super::model::PlatformConnectionDB;
use crate::db::{get_connection, DbPool};
use crate::errors::{IntoCore, StorageError};
use crate::schema::platform_connections;
use crate::utils::format_datetime;

pub struct ConnectionRepository {
    pool: Arc<DbPool>,
}

impl ConnectionRepository {
    pub fn new(pool: Arc<DbPool>) -> Self {
        ConnectionRepository { pool }
    }
}

#[async_trait]
impl ConnectionRepositoryTrait for ConnectionRepository {
    fn get_connection(&self, user_id: &str, platform: Platform) -> Result<PlatformConnection> {
        let mut conn = get_connection(&self.pool)?;
        platform_connections::table
            .filter(platform_connections::user_id.eq(user_id))
            .filter(platform_connections::platform.eq(platform.as_str()))
            .first::<PlatformConnectionDB>(&mut conn)
            .into_core()?
            .into_domain()
    }

    fn get_active_connections(&self, user_id: &str) -> Result<Vec<PlatformConnection>> {
        let mut conn = get_connection(&self.pool)?;
        platform_connections::table
            .filter(platform_connections::user_id.eq(user_id))
            .filter(platform_connections::is_active.eq(true))
            .order(platform_connections::platform.asc())
            .load::<PlatformConnectionDB>(&mut conn)
            .into_core()?
            .into_iter()
            .map(PlatformConnectionDB::into_domain)
            .collect()
    }

    fn get_all_connections(&self, user_id: &str) -> Result<Vec<PlatformConnection>> {
        let mut conn = get_connection(&self.pool)?;
        platform_connections::table
            .filter(platform_connections::user_id.eq(user_id))
            .order(platform_connections::platform.asc())
            .load::<PlatformConnectionDB>(&mut conn)
            .into_core()?
            .into_iter()
            .map(PlatformConnectionDB::into_domain)
            .collect()
    }

    fn list_user_ids(&self) -> Result<Vec<String>> {
        let mut conn = get_connection(&self.pool)?;
        platform_connections::table
            .filter(platform_connections::is_active.eq(true))
            .select(platform_connections::user_id)
            .distinct()
            .order(platform_connections::user_id.asc())
            .load::<String>(&mut conn)
            .into_core()
    }

    async fn upsert_connection(
        &self,
        new_connection: NewPlatformConnection,
    ) -> Result<PlatformConnection> {
        let credentials_json = serde_json::to_string(&new_connection.credentials)
            .map_err(|e| Error::from(StorageError::SerializationError(e.to_string())))?;
        let now = format_datetime(Utc::now());
        let row = PlatformConnectionDB {
            id: Uuid::new_v4().to_string(),
            user_id: new_connection.user_id,
            platform: new_connection.platform.as_str().to_string(),
            credentials: credentials_json,
            account_name: new_connection.account_name,
            is_active: true,
            sync_status: SyncStatus::Pending.as_str().to_string(),
            error_message: None,
            last_synced_at: None,
            created_at: now.clone(),
            updated_at: now,
        };

        let mut conn = get_connection(&self.pool)?;
        conn.immediate_transaction(|conn| {
            // Re-connecting replaces credentials and re-activates a revoked
            // row; the original id and created_at survive.
            diesel::insert_into(platform_connections::table)
                .values(&row)
                .on_conflict((
                    platform_connections::user_id,
                    platform_connections::platform,
                ))
                .do_update()
                .set((
                    platform_connections::credentials.eq(&row.credentials),
                    platform_connections::account_name.eq(&row.account_name),
                    platform_connections::is_active.eq(true),
                    platform_connections::sync_status.eq(&row.sync_status),
                    platform_connections::error_message.eq(None::<String>),
                    platform_connections::updated_at.eq(&row.updated_at),
                ))
                .returning(PlatformConnectionDB::as_returning())
                .get_result::<PlatformConnectionDB>(conn)
        })
        .into_core()?
        .into_domain()
    }

    async fn set_sync_result(
        &self,
        connection_id: &str,
        status: SyncStatus,
        error_message: Option<String>,
        synced_at: Option<DateTime<Utc>>,
    ) -> Result<()> {
        let mut conn = get_connection(&self.pool)?;
        let affected = conn
            .immediate_transaction(|conn| {
                let query = diesel::update(
                    platform_connections::table.filter(platform_connections::id.eq(connection_id)),
                );
                match synced_at {
                    Some(ts) => query
                        .set((
                            platform_connections::sync_status.eq(status.as_str()),
                            platform_connections::error_message.eq(&error_message),
                            platform_connections::last_synced_at.eq(Some(format_datetime(ts))),
                            platform_connections::updated_at.eq(format_datetime(Utc::now())),
                        ))
                        .execute(conn),
                    None => query
                        .set((
                            platform_connections::sync_status.eq(status.as_str()),
                            platform_connections::error_message.eq(&error_message),
                            platform_connections::updated_at.eq(format_datetime(Utc::now())),
                        ))
                        .execute(conn),
                }
            })
            .into_core()?;

        if affected == 0 {
            return Err(Error::Database(DatabaseError::NotFound(format!(
                "Connection {} not found",
                connection_id
            ))));
        }
        Ok(())
    }

    async fn deactivate_connection(&self, user_id: &str, platform: Platform) -> Result<()> {
        let mut conn = get_connection(&self.pool)?;
        let affected = conn
            .immediate_transaction(|conn| {
                diesel::update(
                    platform_connections::table
                        .filter(platform_connections::user_id.eq(user_id))
                        .filter(platform_connections::platform.eq(platform.as_str())),
                )
                .set((
                    platform_connections::is_active.eq(false),
                    platform_connections::updated_at.eq(format_datetime(Utc::now())),
                ))
                .execute(conn)
            })
            .into_core()?;

        if affected == 0 {
            return Err(Error::Database(DatabaseError::NotFound(format!(
                "No {} connection for user {}",
                platform, user_id
            ))));
        }
        Ok(())
    }
}
