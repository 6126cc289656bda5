//! Database models for AI usage records.

use diesel::prelude::*;

use adsync_core::limits::UsageRecord;

use crate::utils::{format_datetime, parse_datetime, parse_decimal};

/// Database model for one AI usage record. Append-only.
#[derive(Queryable, Identifiable, Insertable, Selectable, Debug, Clone)]
#[diesel(table_name = crate::schema::ai_usage)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct UsageRecordDB {
    pub id: String,
    pub user_id: String,
    pub feature: String,
    pub cost: String,
    pub created_at: String,
}

impl From<UsageRecord> for UsageRecordDB {
    fn from(record: UsageRecord) -> Self {
        Self {
            id: record.id,
            user_id: record.user_id,
            feature: record.feature,
            cost: record.cost.to_string(),
            created_at: format_datetime(record.created_at),
        }
    }
}

impl From<UsageRecordDB> for UsageRecord {
    fn from(db: UsageRecordDB) -> Self {
        Self {
            id: db.id,
            user_id: db.user_id,
            feature: db.feature,
            cost: parse_decimal(&db.cost),
            created_at: parse_datetime(&db.created_at),
        }
    }
}
