use std::sync::Arc;

use async_trait::async_trait;
use chrono::{Duration, Utc};
use log::debug;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use uuid::Uuid;

use crate::errors::Result;

use super::limits_model::{
    RateLimitDecision, RemainingCost, RemainingRequests, SubscriptionTier, UsageRecord, UsageStats,
};
use super::limits_traits::{UsageLimitServiceTrait, UsageRepositoryTrait};

/// Spend ceilings across all users combined, a safety net under the
/// per-tier caps.
const GLOBAL_DAILY_COST_LIMIT: Decimal = dec!(1000);
const GLOBAL_MONTHLY_COST_LIMIT: Decimal = dec!(25000);

/// Advisory AI rate limiter.
///
/// `check_rate_limit` reads usage and decides; `record_usage` appends after
/// the request ran. Nothing is reserved between the two, so concurrent
/// requests can each pass the same check. The overshoot is bounded by one
/// request per racer and the cost caps keep it immaterial.
pub struct UsageLimitService {
    usage_repository: Arc<dyn UsageRepositoryTrait>,
}

impl UsageLimitService {
    pub fn new(usage_repository: Arc<dyn UsageRepositoryTrait>) -> Self {
        UsageLimitService { usage_repository }
    }

    fn denied(
        reason: &str,
        remaining: RemainingRequests,
        cost_remaining: RemainingCost,
    ) -> RateLimitDecision {
        RateLimitDecision {
            allowed: false,
            reason: Some(reason.to_string()),
            remaining,
            cost_remaining,
            reset_time: Utc::now() + Duration::hours(1),
        }
    }
}

/// Headroom left after this request, floored at zero.
fn remaining_after(limit: i64, used: i64) -> i64 {
    (limit - used - 1).max(0)
}

fn cost_headroom(limit: Decimal, used: Decimal) -> Decimal {
    (limit - used).max(Decimal::ZERO)
}

#[async_trait]
impl UsageLimitServiceTrait for UsageLimitService {
    fn check_rate_limit(
        &self,
        user_id: &str,
        tier: &str,
        estimated_cost: Decimal,
    ) -> Result<RateLimitDecision> {
        let no_requests = RemainingRequests {
            hourly: 0,
            daily: 0,
            monthly: 0,
        };
        let no_cost = RemainingCost {
            daily: Decimal::ZERO,
            monthly: Decimal::ZERO,
        };

        let tier: SubscriptionTier = match tier.parse() {
            Ok(tier) => tier,
            Err(_) => {
                return Ok(Self::denied(
                    "Invalid subscription tier",
                    no_requests,
                    no_cost,
                ))
            }
        };
        let limits = tier.limits();

        let now = Utc::now();
        let hour_ago = now - Duration::hours(1);
        let day_ago = now - Duration::hours(24);
        let month_ago = now - Duration::days(30);

        let hourly_used = self.usage_repository.count_since(user_id, hour_ago)?;
        let daily_used = self.usage_repository.count_since(user_id, day_ago)?;
        let monthly_used = self.usage_repository.count_since(user_id, month_ago)?;
        let daily_cost = self.usage_repository.cost_since(user_id, day_ago)?;
        let monthly_cost = self.usage_repository.cost_since(user_id, month_ago)?;

        let remaining = RemainingRequests {
            hourly: remaining_after(limits.hourly_requests, hourly_used),
            daily: remaining_after(limits.daily_requests, daily_used),
            monthly: remaining_after(limits.monthly_requests, monthly_used),
        };
        let cost_remaining = RemainingCost {
            daily: cost_headroom(limits.daily_cost, daily_cost),
            monthly: cost_headroom(limits.monthly_cost, monthly_cost),
        };

        // Checks run cheapest-window first; the first exceeded limit wins.
        if hourly_used >= limits.hourly_requests {
            return Ok(Self::denied(
                "Hourly request limit exceeded",
                remaining,
                cost_remaining,
            ));
        }
        if daily_used >= limits.daily_requests {
            return Ok(Self::denied(
                "Daily request limit exceeded",
                remaining,
                cost_remaining,
            ));
        }
        if monthly_used >= limits.monthly_requests {
            return Ok(Self::denied(
                "Monthly request limit exceeded",
                remaining,
                cost_remaining,
            ));
        }
        // The request's projected spend counts against every cost ceiling.
        if daily_cost + estimated_cost >= limits.daily_cost {
            return Ok(Self::denied(
                "Daily cost limit exceeded",
                remaining,
                cost_remaining,
            ));
        }
        if monthly_cost + estimated_cost >= limits.monthly_cost {
            return Ok(Self::denied(
                "Monthly cost limit exceeded",
                remaining,
                cost_remaining,
            ));
        }

        let global_daily = self.usage_repository.global_cost_since(day_ago)?;
        if global_daily + estimated_cost >= GLOBAL_DAILY_COST_LIMIT {
            return Ok(Self::denied(
                "Global daily cost limit exceeded",
                remaining,
                cost_remaining,
            ));
        }
        let global_monthly = self.usage_repository.global_cost_since(month_ago)?;
        if global_monthly + estimated_cost >= GLOBAL_MONTHLY_COST_LIMIT {
            return Ok(Self::denied(
                "Global monthly cost limit exceeded",
                remaining,
                cost_remaining,
            ));
        }

        Ok(RateLimitDecision {
            allowed: true,
            reason: None,
            remaining,
            cost_remaining,
            reset_time: now + Duration::hours(1),
        })
    }

    async fn record_usage(&self, user_id: &str, feature: &str, cost: Decimal) -> Result<()> {
        debug!("Recording AI usage for {}: {} (${})", user_id, feature, cost);
        self.usage_repository
            .append(UsageRecord {
                id: Uuid::new_v4().to_string(),
                user_id: user_id.to_string(),
                feature: feature.to_string(),
                cost,
                created_at: Utc::now(),
            })
            .await
    }

    fn usage_stats(&self, user_id: &str) -> Result<UsageStats> {
        let now = Utc::now();
        let hour_ago = now - Duration::hours(1);
        let day_ago = now - Duration::hours(24);
        let month_ago = now - Duration::days(30);

        Ok(UsageStats {
            hourly_requests: self.usage_repository.count_since(user_id, hour_ago)?,
            daily_requests: self.usage_repository.count_since(user_id, day_ago)?,
            monthly_requests: self.usage_repository.count_since(user_id, month_ago)?,
            daily_cost: self.usage_repository.cost_since(user_id, day_ago)?,
            monthly_cost: self.usage_repository.cost_since(user_id, month_ago)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::DateTime;
    use std::sync::RwLock;

    struct MockUsageRepository {
        records: RwLock<Vec<UsageRecord>>,
    }

    impl MockUsageRepository {
        fn new() -> Self {
            Self {
                records: RwLock::new(Vec::new()),
            }
        }

        fn seed(&self, user_id: &str, count: usize, cost_each: Decimal, age: Duration) {
            let created_at = Utc::now() - age;
            let mut records = self.records.write().unwrap();
            for _ in 0..count {
                records.push(UsageRecord {
                    id: Uuid::new_v4().to_string(),
                    user_id: user_id.to_string(),
                    feature: "optimize".to_string(),
                    cost: cost_each,
                    created_at,
                });
            }
        }
    }

    #[async_trait]
    impl UsageRepositoryTrait for MockUsageRepository {
        async fn append(&self, record: UsageRecord) -> Result<()> {
            self.records.write().unwrap().push(record);
            Ok(())
        }

        fn count_since(&self, user_id: &str, since: DateTime<Utc>) -> Result<i64> {
            Ok(self
                .records
                .read()
                .unwrap()
                .iter()
                .filter(|r| r.user_id == user_id && r.created_at >= since)
                .count() as i64)
        }

        fn cost_since(&self, user_id: &str, since: DateTime<Utc>) -> Result<Decimal> {
            Ok(self
                .records
                .read()
                .unwrap()
                .iter()
                .filter(|r| r.user_id == user_id && r.created_at >= since)
                .map(|r| r.cost)
                .sum())
        }

        fn global_cost_since(&self, since: DateTime<Utc>) -> Result<Decimal> {
            Ok(self
                .records
                .read()
                .unwrap()
                .iter()
                .filter(|r| r.created_at >= since)
                .map(|r| r.cost)
                .sum())
        }
    }

    fn make_service() -> (UsageLimitService, Arc<MockUsageRepository>) {
        let repo = Arc::new(MockUsageRepository::new());
        (UsageLimitService::new(repo.clone()), repo)
    }

    #[test]
    fn test_fresh_user_is_allowed_with_full_headroom() {
        let (service, _) = make_service();
        let decision = service.check_rate_limit("user-1", "trial", dec!(0)).unwrap();

        assert!(decision.allowed);
        assert!(decision.reason.is_none());
        // The request being checked is already counted against headroom.
        assert_eq!(decision.remaining.hourly, 4);
        assert_eq!(decision.remaining.daily, 19);
        assert_eq!(decision.remaining.monthly, 99);
        assert_eq!(decision.cost_remaining.daily, dec!(1));
    }

    #[test]
    fn test_invalid_tier_is_denied() {
        let (service, _) = make_service();
        let decision = service
            .check_rate_limit("user-1", "platinum", dec!(0))
            .unwrap();

        assert!(!decision.allowed);
        assert_eq!(decision.reason.as_deref(), Some("Invalid subscription tier"));
        assert_eq!(decision.remaining.hourly, 0);
    }

    #[test]
    fn test_hourly_limit_denies_before_daily() {
        let (service, repo) = make_service();
        // 5 requests in the last hour exhausts trial's hourly allowance.
        repo.seed("user-1", 5, dec!(0.01), Duration::minutes(10));

        let decision = service.check_rate_limit("user-1", "trial", dec!(0)).unwrap();
        assert!(!decision.allowed);
        assert_eq!(
            decision.reason.as_deref(),
            Some("Hourly request limit exceeded")
        );
        assert_eq!(decision.remaining.hourly, 0);
    }

    #[test]
    fn test_daily_limit_applies_when_hourly_clear() {
        let (service, repo) = make_service();
        // 20 requests earlier today, none in the last hour.
        repo.seed("user-1", 20, dec!(0.01), Duration::hours(3));

        let decision = service.check_rate_limit("user-1", "trial", dec!(0)).unwrap();
        assert!(!decision.allowed);
        assert_eq!(
            decision.reason.as_deref(),
            Some("Daily request limit exceeded")
        );
    }

    #[test]
    fn test_monthly_limit_applies_when_shorter_windows_clear() {
        let (service, repo) = make_service();
        repo.seed("user-1", 100, dec!(0.01), Duration::days(5));

        let decision = service.check_rate_limit("user-1", "trial", dec!(0)).unwrap();
        assert!(!decision.allowed);
        assert_eq!(
            decision.reason.as_deref(),
            Some("Monthly request limit exceeded")
        );
    }

    #[test]
    fn test_daily_cost_limit() {
        let (service, repo) = make_service();
        // 4 requests at $0.25 hits trial's $1 daily cost cap.
        repo.seed("user-1", 4, dec!(0.25), Duration::hours(2));

        let decision = service.check_rate_limit("user-1", "trial", dec!(0)).unwrap();
        assert!(!decision.allowed);
        assert_eq!(decision.reason.as_deref(), Some("Daily cost limit exceeded"));
        assert_eq!(decision.cost_remaining.daily, dec!(0));
    }

    #[test]
    fn test_estimated_cost_gates_daily_ceiling() {
        let (service, _) = make_service();
        // No usage yet, but the request itself is projected above trial's
        // $1 daily cost cap.
        let decision = service.check_rate_limit("user-1", "trial", dec!(5)).unwrap();

        assert!(!decision.allowed);
        assert_eq!(decision.reason.as_deref(), Some("Daily cost limit exceeded"));
    }

    #[test]
    fn test_estimated_cost_counts_against_global_budget() {
        let (service, repo) = make_service();
        // Other users left $1 of global daily budget; a $2 request must not fit.
        repo.seed("whale-1", 1, dec!(999), Duration::hours(2));

        let decision = service
            .check_rate_limit("user-1", "enterprise_plus", dec!(2))
            .unwrap();
        assert!(!decision.allowed);
        assert_eq!(
            decision.reason.as_deref(),
            Some("Global daily cost limit exceeded")
        );
    }

    #[test]
    fn test_small_estimate_within_ceilings_is_allowed() {
        let (service, repo) = make_service();
        repo.seed("user-1", 2, dec!(0.10), Duration::minutes(30));

        let decision = service
            .check_rate_limit("user-1", "trial", dec!(0.25))
            .unwrap();
        assert!(decision.allowed);
        assert_eq!(decision.remaining.hourly, 2);
    }

    #[test]
    fn test_monthly_cost_limit() {
        let (service, repo) = make_service();
        repo.seed("user-1", 10, dec!(1), Duration::days(10));

        let decision = service.check_rate_limit("user-1", "trial", dec!(0)).unwrap();
        assert!(!decision.allowed);
        assert_eq!(
            decision.reason.as_deref(),
            Some("Monthly cost limit exceeded")
        );
    }

    #[test]
    fn test_global_daily_cost_limit_spans_users() {
        let (service, repo) = make_service();
        // Other users burned the global daily budget.
        repo.seed("whale-1", 10, dec!(100), Duration::hours(2));

        let decision = service
            .check_rate_limit("user-1", "enterprise_plus", dec!(0))
            .unwrap();
        assert!(!decision.allowed);
        assert_eq!(
            decision.reason.as_deref(),
            Some("Global daily cost limit exceeded")
        );
    }

    #[test]
    fn test_old_usage_ages_out_of_windows() {
        let (service, repo) = make_service();
        repo.seed("user-1", 100, dec!(0.01), Duration::days(45));

        let decision = service.check_rate_limit("user-1", "trial", dec!(0)).unwrap();
        assert!(decision.allowed);
    }

    #[test]
    fn test_usage_stats_aggregates_windows() {
        let (service, repo) = make_service();
        repo.seed("user-1", 2, dec!(0.25), Duration::minutes(30));
        repo.seed("user-1", 1, dec!(0.50), Duration::hours(5));
        repo.seed("user-2", 3, dec!(9), Duration::minutes(5));

        let stats = service.usage_stats("user-1").unwrap();
        assert_eq!(stats.hourly_requests, 2);
        assert_eq!(stats.daily_requests, 3);
        assert_eq!(stats.monthly_requests, 3);
        assert_eq!(stats.daily_cost, dec!(1.00));
        assert_eq!(stats.monthly_cost, dec!(1.00));
    }

    #[tokio::test]
    async fn test_record_usage_appends() {
        let (service, repo) = make_service();
        service
            .record_usage("user-1", "campaign_analysis", dec!(0.12))
            .await
            .unwrap();
        service
            .record_usage("user-1", "copy_suggestions", dec!(0.08))
            .await
            .unwrap();

        let records = repo.records.read().unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].feature, "campaign_analysis");
        assert_eq!(records[1].cost, dec!(0.08));
    }

    #[tokio::test]
    async fn test_check_does_not_reserve() {
        // Two checks back to back both pass when only one request of
        // headroom exists. The limiter is advisory; this documents it.
        let (service, repo) = make_service();
        repo.seed("user-1", 4, dec!(0.01), Duration::minutes(10));

        let first = service.check_rate_limit("user-1", "trial", dec!(0)).unwrap();
        let second = service.check_rate_limit("user-1", "trial", dec!(0)).unwrap();
        assert!(first.allowed);
        assert!(second.allowed);

        // Only after usage is recorded does the next check deny.
        service.record_usage("user-1", "optimize", dec!(0.01)).await.unwrap();
        let third = service.check_rate_limit("user-1", "trial", dec!(0)).unwrap();
        assert!(!third.allowed);
    }
}
