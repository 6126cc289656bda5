use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Subscription tiers with AI usage allowances.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubscriptionTier {
    Trial,
    SoloProfessional,
    GrowthTeam,
    ProfessionalAgency,
    Enterprise,
    EnterprisePlus,
}

/// Request and cost allowances for one tier.
#[derive(Debug, Clone, Copy)]
pub struct TierLimits {
    pub hourly_requests: i64,
    pub daily_requests: i64,
    pub monthly_requests: i64,
    pub daily_cost: Decimal,
    pub monthly_cost: Decimal,
}

impl SubscriptionTier {
    pub fn limits(&self) -> TierLimits {
        match self {
            SubscriptionTier::Trial => TierLimits {
                hourly_requests: 5,
                daily_requests: 20,
                monthly_requests: 100,
                daily_cost: dec!(1),
                monthly_cost: dec!(10),
            },
            SubscriptionTier::SoloProfessional => TierLimits {
                hourly_requests: 10,
                daily_requests: 50,
                monthly_requests: 500,
                daily_cost: dec!(5),
                monthly_cost: dec!(50),
            },
            SubscriptionTier::GrowthTeam => TierLimits {
                hourly_requests: 25,
                daily_requests: 150,
                monthly_requests: 1500,
                daily_cost: dec!(15),
                monthly_cost: dec!(150),
            },
            SubscriptionTier::ProfessionalAgency => TierLimits {
                hourly_requests: 50,
                daily_requests: 300,
                monthly_requests: 3000,
                daily_cost: dec!(30),
                monthly_cost: dec!(300),
            },
            SubscriptionTier::Enterprise => TierLimits {
                hourly_requests: 100,
                daily_requests: 600,
                monthly_requests: 6000,
                daily_cost: dec!(60),
                monthly_cost: dec!(600),
            },
            SubscriptionTier::EnterprisePlus => TierLimits {
                hourly_requests: 200,
                daily_requests: 1200,
                monthly_requests: 12000,
                daily_cost: dec!(120),
                monthly_cost: dec!(1200),
            },
        }
    }
}

impl FromStr for SubscriptionTier {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "trial" => Ok(SubscriptionTier::Trial),
            "solo_professional" => Ok(SubscriptionTier::SoloProfessional),
            "growth_team" => Ok(SubscriptionTier::GrowthTeam),
            "professional_agency" => Ok(SubscriptionTier::ProfessionalAgency),
            "enterprise" => Ok(SubscriptionTier::Enterprise),
            "enterprise_plus" => Ok(SubscriptionTier::EnterprisePlus),
            other => Err(format!("Unknown subscription tier: {}", other)),
        }
    }
}

/// One AI request, appended after the fact. Records are never mutated.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageRecord {
    pub id: String,
    pub user_id: String,
    pub feature: String,
    pub cost: Decimal,
    pub created_at: DateTime<Utc>,
}

/// Requests left in each window, assuming the request being checked happens.
#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RemainingRequests {
    pub hourly: i64,
    pub daily: i64,
    pub monthly: i64,
}

/// Spend headroom left in each cost window.
#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RemainingCost {
    pub daily: Decimal,
    pub monthly: Decimal,
}

/// Current usage across the limiter's rolling windows.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageStats {
    pub hourly_requests: i64,
    pub daily_requests: i64,
    pub monthly_requests: i64,
    pub daily_cost: Decimal,
    pub monthly_cost: Decimal,
}

/// Advisory verdict from a rate limit check.
///
/// Advisory only: the check reads current usage and decides, nothing is
/// reserved. Two concurrent checks can both pass; the worst case is one
/// request of overshoot, which the cost caps absorb.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RateLimitDecision {
    pub allowed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    pub remaining: RemainingRequests,
    pub cost_remaining: RemainingCost,
    pub reset_time: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tier_parsing_round_trip() {
        for (name, tier) in [
            ("trial", SubscriptionTier::Trial),
            ("solo_professional", SubscriptionTier::SoloProfessional),
            ("growth_team", SubscriptionTier::GrowthTeam),
            ("professional_agency", SubscriptionTier::ProfessionalAgency),
            ("enterprise", SubscriptionTier::Enterprise),
            ("enterprise_plus", SubscriptionTier::EnterprisePlus),
        ] {
            assert_eq!(name.parse::<SubscriptionTier>().unwrap(), tier);
        }
        assert!("platinum".parse::<SubscriptionTier>().is_err());
    }

    #[test]
    fn test_limits_grow_with_tier() {
        let trial = SubscriptionTier::Trial.limits();
        let top = SubscriptionTier::EnterprisePlus.limits();
        assert!(top.hourly_requests > trial.hourly_requests);
        assert!(top.monthly_cost > trial.monthly_cost);
        assert_eq!(trial.daily_requests, 20);
        assert_eq!(top.monthly_requests, 12000);
    }
}
