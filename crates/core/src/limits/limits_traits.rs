use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use crate::errors::Result;

use super::limits_model::{RateLimitDecision, UsageRecord, UsageStats};

/// Trait for usage record storage.
#[async_trait]
pub trait UsageRepositoryTrait: Send + Sync {
    /// Append one usage record. Records are immutable once written.
    async fn append(&self, record: UsageRecord) -> Result<()>;

    /// Number of a user's requests at or after `since`.
    fn count_since(&self, user_id: &str, since: DateTime<Utc>) -> Result<i64>;

    /// Sum of a user's request costs at or after `since`.
    fn cost_since(&self, user_id: &str, since: DateTime<Utc>) -> Result<Decimal>;

    /// Sum of all users' request costs at or after `since`.
    fn global_cost_since(&self, since: DateTime<Utc>) -> Result<Decimal>;
}

/// Trait for AI usage limiting.
#[async_trait]
pub trait UsageLimitServiceTrait: Send + Sync {
    /// Read current usage and decide whether one more request may proceed.
    /// `estimated_cost` is the projected spend of the request being checked;
    /// it counts against every cost ceiling.
    fn check_rate_limit(
        &self,
        user_id: &str,
        tier: &str,
        estimated_cost: Decimal,
    ) -> Result<RateLimitDecision>;

    /// Record a completed request and its cost.
    async fn record_usage(&self, user_id: &str, feature: &str, cost: Decimal) -> Result<()>;

    /// Current request counts and spend per rolling window.
    fn usage_stats(&self, user_id: &str) -> Result<UsageStats>;
}
