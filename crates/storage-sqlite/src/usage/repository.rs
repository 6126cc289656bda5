use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use rust_decimal::Decimal;

use adsync_core::errors::Result;
use adsync_core::limits::{UsageRecord, UsageRepositoryTrait};

use super::model::UsageRecordDB;
use crate::db::{get_connection, DbPool};
use crate::errors::IntoCore;
use crate::schema::ai_usage;
use crate::utils::{format_datetime, parse_decimal};

pub struct UsageRepository {
    pool: Arc<DbPool>,
}

impl UsageRepository {
    pub fn new(pool: Arc<DbPool>) -> Self {
        UsageRepository { pool }
    }

    // RFC 3339 timestamps in UTC sort lexicographically, so the window
    // filters compare strings directly.
    fn sum_costs(rows: Vec<String>) -> Decimal {
        rows.iter().map(|c| parse_decimal(c)).sum()
    }
}

#[async_trait]
impl UsageRepositoryTrait for UsageRepository {
    async fn append(&self, record: UsageRecord) -> Result<()> {
        let row = UsageRecordDB::from(record);
        let mut conn = get_connection(&self.pool)?;
        conn.immediate_transaction(|conn| {
            diesel::insert_into(ai_usage::table).values(&row).execute(conn)
        })
        .into_core()?;
        Ok(())
    }

    fn count_since(&self, user_id: &str, since: DateTime<Utc>) -> Result<i64> {
        let mut conn = get_connection(&self.pool)?;
        ai_usage::table
            .filter(ai_usage::user_id.eq(user_id))
            .filter(ai_usage::created_at.ge(format_datetime(since)))
            .count()
            .get_result(&mut conn)
            .into_core()
    }

    fn cost_since(&self, user_id: &str, since: DateTime<Utc>) -> Result<Decimal> {
        let mut conn = get_connection(&self.pool)?;
        let costs: Vec<String> = ai_usage::table
            .filter(ai_usage::user_id.eq(user_id))
            .filter(ai_usage::created_at.ge(format_datetime(since)))
            .select(ai_usage::cost)
            .load(&mut conn)
            .into_core()?;
        Ok(Self::sum_costs(costs))
    }

    fn global_cost_since(&self, since: DateTime<Utc>) -> Result<Decimal> {
        let mut conn = get_connection(&self.pool)?;
        let costs: Vec<String> = ai_usage::table
            .filter(ai_usage::created_at.ge(format_datetime(since)))
            .select(ai_usage::cost)
            .load(&mut conn)
            .into_core()?;
        Ok(Self::sum_costs(costs))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use rust_decimal_macros::dec;
    use uuid::Uuid;

    use crate::db::{create_pool, run_migrations};

    fn make_repo() -> (UsageRepository, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("test.db");
        let pool = create_pool(path.to_str().unwrap()).unwrap();
        run_migrations(&pool).unwrap();
        (UsageRepository::new(pool), dir)
    }

    fn make_record(user_id: &str, cost: Decimal, age: Duration) -> UsageRecord {
        UsageRecord {
            id: Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            feature: "optimize".to_string(),
            cost,
            created_at: Utc::now() - age,
        }
    }

    #[tokio::test]
    async fn test_window_counting() {
        let (repo, _dir) = make_repo();
        repo.append(make_record("user-1", dec!(0.10), Duration::minutes(30)))
            .await
            .unwrap();
        repo.append(make_record("user-1", dec!(0.20), Duration::hours(5)))
            .await
            .unwrap();
        repo.append(make_record("user-2", dec!(0.50), Duration::minutes(5)))
            .await
            .unwrap();

        let hour_ago = Utc::now() - Duration::hours(1);
        let day_ago = Utc::now() - Duration::hours(24);

        assert_eq!(repo.count_since("user-1", hour_ago).unwrap(), 1);
        assert_eq!(repo.count_since("user-1", day_ago).unwrap(), 2);
        assert_eq!(repo.cost_since("user-1", day_ago).unwrap(), dec!(0.30));
        // Global spans all users.
        assert_eq!(repo.global_cost_since(day_ago).unwrap(), dec!(0.80));
    }

    #[tokio::test]
    async fn test_old_records_excluded() {
        let (repo, _dir) = make_repo();
        repo.append(make_record("user-1", dec!(1), Duration::days(40)))
            .await
            .unwrap();

        let month_ago = Utc::now() - Duration::days(30);
        assert_eq!(repo.count_since("user-1", month_ago).unwrap(), 0);
        assert_eq!(repo.cost_since("user-1", month_ago).unwrap(), dec!(0));
    }
}
