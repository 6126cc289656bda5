use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use diesel::prelude::*;

use adsync_core::campaigns::{Campaign, CampaignRepositoryTrait, CampaignUpsert};
use adsync_core::errors::{DatabaseError, Error, Result};
use adsync_platforms::{Platform, UnifiedMetrics};

use super::model::CampaignDB;
use crate::db::{get_connection, DbPool};
use crate::errors::IntoCore;
use crate::schema::campaigns;
use crate::utils::{format_date, format_datetime};

pub struct CampaignRepository {
    pool: Arc<DbPool>,
}

impl CampaignRepository {
    pub fn new(pool: Arc<DbPool>) -> Self {
        CampaignRepository { pool }
    }
}

#[async_trait]
impl CampaignRepositoryTrait for CampaignRepository {
    fn get_campaign(&self, campaign_id: &str) -> Result<Campaign> {
        let mut conn = get_connection(&self.pool)?;
        campaigns::table
            .filter(campaigns::id.eq(campaign_id))
            .first::<CampaignDB>(&mut conn)
            .into_core()?
            .into_domain()
    }

    fn get_campaigns_for_user(&self, user_id: &str) -> Result<Vec<Campaign>> {
        let mut conn = get_connection(&self.pool)?;
        campaigns::table
            .filter(campaigns::user_id.eq(user_id))
            .order(campaigns::updated_at.desc())
            .load::<CampaignDB>(&mut conn)
            .into_core()?
            .into_iter()
            .map(CampaignDB::into_domain)
            .collect()
    }

    fn get_campaigns_for_user_platform(
        &self,
        user_id: &str,
        platform: Platform,
    ) -> Result<Vec<Campaign>> {
        let mut conn = get_connection(&self.pool)?;
        campaigns::table
            .filter(campaigns::user_id.eq(user_id))
            .filter(campaigns::platform.eq(platform.as_str()))
            .order(campaigns::updated_at.desc())
            .load::<CampaignDB>(&mut conn)
            .into_core()?
            .into_iter()
            .map(CampaignDB::into_domain)
            .collect()
    }

    async fn upsert_campaign(&self, upsert: CampaignUpsert) -> Result<Campaign> {
        let row = CampaignDB::from_upsert(&upsert);
        let mut conn = get_connection(&self.pool)?;
        conn.immediate_transaction(|conn| {
            // Conflict on the vendor identity updates in place and leaves
            // the stored metrics snapshot untouched.
            diesel::insert_into(campaigns::table)
                .values(&row)
                .on_conflict((campaigns::platform, campaigns::platform_campaign_id))
                .do_update()
                .set((
                    campaigns::user_id.eq(&row.user_id),
                    campaigns::name.eq(&row.name),
                    campaigns::status.eq(&row.status),
                    campaigns::objective.eq(&row.objective),
                    campaigns::budget_amount.eq(&row.budget_amount),
                    campaigns::budget_currency.eq(&row.budget_currency),
                    campaigns::budget_kind.eq(&row.budget_kind),
                    campaigns::targeting.eq(&row.targeting),
                    campaigns::start_date.eq(&row.start_date),
                    campaigns::end_date.eq(&row.end_date),
                    campaigns::updated_at.eq(&row.updated_at),
                ))
                .returning(CampaignDB::as_returning())
                .get_result::<CampaignDB>(conn)
        })
        .into_core()?
        .into_domain()
    }

    async fn update_metrics_snapshot(
        &self,
        campaign_id: &str,
        metrics: &UnifiedMetrics,
    ) -> Result<()> {
        let mut conn = get_connection(&self.pool)?;
        let affected = conn
            .immediate_transaction(|conn| {
                diesel::update(campaigns::table.filter(campaigns::id.eq(campaign_id)))
                    .set((
                        campaigns::metrics_date.eq(format_date(metrics.date)),
                        campaigns::impressions.eq(metrics.impressions as i64),
                        campaigns::clicks.eq(metrics.clicks as i64),
                        campaigns::conversions.eq(metrics.conversions),
                        campaigns::spend.eq(metrics.spend.to_string()),
                        campaigns::revenue.eq(metrics.revenue.to_string()),
                        campaigns::metrics_currency.eq(Some(metrics.currency.clone())),
                        campaigns::updated_at.eq(format_datetime(Utc::now())),
                    ))
                    .execute(conn)
            })
            .into_core()?;

        if affected == 0 {
            return Err(Error::Database(DatabaseError::NotFound(format!(
                "Campaign {} not found",
                campaign_id
            ))));
        }
        Ok(())
    }

    fn count_for_platform_campaign(
        &self,
        platform: Platform,
        platform_campaign_id: &str,
    ) -> Result<i64> {
        let mut conn = get_connection(&self.pool)?;
        campaigns::table
            .filter(campaigns::platform.eq(platform.as_str()))
            .filter(campaigns::platform_campaign_id.eq(platform_campaign_id))
            .count()
            .get_result(&mut conn)
            .into_core()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    use adsync_platforms::{
        Budget, CampaignObjective, CampaignStatus, UnifiedCampaign,
    };

    use crate::db::{create_pool, run_migrations};

    fn make_repo() -> (CampaignRepository, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("test.db");
        let pool = create_pool(path.to_str().unwrap()).unwrap();
        run_migrations(&pool).unwrap();
        (CampaignRepository::new(pool), dir)
    }

    fn make_upsert(native_id: &str, name: &str) -> CampaignUpsert {
        CampaignUpsert {
            user_id: "user-1".to_string(),
            campaign: UnifiedCampaign {
                id: UnifiedCampaign::unified_id(Platform::Meta, native_id),
                platform: Platform::Meta,
                platform_campaign_id: native_id.to_string(),
                name: name.to_string(),
                status: CampaignStatus::Active,
                objective: CampaignObjective::Sales,
                budget: Budget::daily(dec!(25.50), "USD"),
                targeting: serde_json::json!({"countries": ["US"]}),
                start_date: NaiveDate::from_ymd_opt(2025, 5, 1),
                end_date: None,
                created_at: Utc::now(),
                updated_at: Utc::now(),
            },
        }
    }

    #[tokio::test]
    async fn test_upsert_then_read_round_trip() {
        let (repo, _dir) = make_repo();
        repo.upsert_campaign(make_upsert("1", "Launch")).await.unwrap();

        let campaign = repo.get_campaign("meta_ads_1").unwrap();
        assert_eq!(campaign.name, "Launch");
        assert_eq!(campaign.platform, Platform::Meta);
        assert_eq!(campaign.budget.amount, dec!(25.50));
        assert_eq!(campaign.status, CampaignStatus::Active);
        assert_eq!(campaign.start_date, NaiveDate::from_ymd_opt(2025, 5, 1));
        assert_eq!(campaign.targeting["countries"][0], "US");
        assert!(campaign.metrics.is_none());
    }

    #[tokio::test]
    async fn test_upsert_updates_in_place() {
        let (repo, _dir) = make_repo();
        repo.upsert_campaign(make_upsert("1", "Before")).await.unwrap();
        repo.upsert_campaign(make_upsert("1", "After")).await.unwrap();

        assert_eq!(
            repo.count_for_platform_campaign(Platform::Meta, "1").unwrap(),
            1
        );
        assert_eq!(repo.get_campaign("meta_ads_1").unwrap().name, "After");
    }

    #[tokio::test]
    async fn test_upsert_preserves_metrics_snapshot() {
        let (repo, _dir) = make_repo();
        repo.upsert_campaign(make_upsert("1", "A")).await.unwrap();
        repo.update_metrics_snapshot(
            "meta_ads_1",
            &UnifiedMetrics {
                campaign_id: "meta_ads_1".to_string(),
                platform: Platform::Meta,
                date: NaiveDate::from_ymd_opt(2025, 6, 1).unwrap(),
                impressions: 500,
                clicks: 20,
                conversions: 2.0,
                spend: dec!(10),
                revenue: dec!(40),
                currency: "USD".to_string(),
            },
        )
        .await
        .unwrap();

        // Re-sync must not wipe the snapshot.
        repo.upsert_campaign(make_upsert("1", "A renamed")).await.unwrap();
        let snapshot = repo.get_campaign("meta_ads_1").unwrap().metrics.unwrap();
        assert_eq!(snapshot.impressions, 500);
        assert_eq!(snapshot.spend, dec!(10));
    }

    #[tokio::test]
    async fn test_update_metrics_for_missing_campaign_is_not_found() {
        let (repo, _dir) = make_repo();
        let result = repo
            .update_metrics_snapshot(
                "meta_ads_404",
                &UnifiedMetrics {
                    campaign_id: "meta_ads_404".to_string(),
                    platform: Platform::Meta,
                    date: NaiveDate::from_ymd_opt(2025, 6, 1).unwrap(),
                    impressions: 0,
                    clicks: 0,
                    conversions: 0.0,
                    spend: dec!(0),
                    revenue: dec!(0),
                    currency: "USD".to_string(),
                },
            )
            .await;
        assert!(matches!(
            result,
            Err(Error::Database(DatabaseError::NotFound(_)))
        ));
    }

    #[tokio::test]
    async fn test_user_platform_filter() {
        let (repo, _dir) = make_repo();
        repo.upsert_campaign(make_upsert("1", "A")).await.unwrap();
        repo.upsert_campaign(make_upsert("2", "B")).await.unwrap();

        let meta = repo
            .get_campaigns_for_user_platform("user-1", Platform::Meta)
            .unwrap();
        assert_eq!(meta.len(), 2);

        let google = repo
            .get_campaigns_for_user_platform("user-1", Platform::Google)
            .unwrap();
        assert!(google.is_empty());
    }
}
