//! Unified campaign representation.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::Platform;

/// Lifecycle state of a campaign, normalized across vendors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CampaignStatus {
    Draft,
    Active,
    Paused,
    Completed,
}

impl CampaignStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CampaignStatus::Draft => "draft",
            CampaignStatus::Active => "active",
            CampaignStatus::Paused => "paused",
            CampaignStatus::Completed => "completed",
        }
    }

    pub fn from_storage(s: &str) -> Self {
        match s {
            "active" => CampaignStatus::Active,
            "paused" => CampaignStatus::Paused,
            "completed" => CampaignStatus::Completed,
            _ => CampaignStatus::Draft,
        }
    }
}

/// Campaign objective, normalized across vendors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CampaignObjective {
    Awareness,
    Traffic,
    Engagement,
    Leads,
    Sales,
    AppPromotion,
    VideoViews,
}

impl CampaignObjective {
    pub fn as_str(&self) -> &'static str {
        match self {
            CampaignObjective::Awareness => "awareness",
            CampaignObjective::Traffic => "traffic",
            CampaignObjective::Engagement => "engagement",
            CampaignObjective::Leads => "leads",
            CampaignObjective::Sales => "sales",
            CampaignObjective::AppPromotion => "app_promotion",
            CampaignObjective::VideoViews => "video_views",
        }
    }

    pub fn from_storage(s: &str) -> Self {
        match s {
            "awareness" => CampaignObjective::Awareness,
            "engagement" => CampaignObjective::Engagement,
            "leads" => CampaignObjective::Leads,
            "sales" => CampaignObjective::Sales,
            "app_promotion" => CampaignObjective::AppPromotion,
            "video_views" => CampaignObjective::VideoViews,
            _ => CampaignObjective::Traffic,
        }
    }
}

/// Whether the budget amount applies per day or to the campaign lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BudgetKind {
    Daily,
    Lifetime,
}

/// Campaign budget in currency units (not cents or micros; adapters convert).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Budget {
    pub amount: Decimal,
    pub currency: String,
    pub kind: BudgetKind,
}

impl Budget {
    pub fn daily(amount: Decimal, currency: &str) -> Self {
        Self {
            amount,
            currency: currency.to_string(),
            kind: BudgetKind::Daily,
        }
    }

    pub fn lifetime(amount: Decimal, currency: &str) -> Self {
        Self {
            amount,
            currency: currency.to_string(),
            kind: BudgetKind::Lifetime,
        }
    }
}

/// Platform-agnostic campaign record.
///
/// `platform_campaign_id` is the vendor's native id and, together with
/// `platform`, forms the natural key every upsert conflicts on: re-syncing
/// the same vendor campaign must update in place, never duplicate.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnifiedCampaign {
    /// Synthetic id: `<platform>_<platform_campaign_id>`.
    pub id: String,
    pub platform: Platform,
    pub platform_campaign_id: String,
    pub name: String,
    pub status: CampaignStatus,
    pub objective: CampaignObjective,
    pub budget: Budget,
    /// Vendor targeting payload, preserved as-is.
    pub targeting: serde_json::Value,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl UnifiedCampaign {
    /// Build the synthetic unified id from the platform and native id.
    pub fn unified_id(platform: Platform, platform_campaign_id: &str) -> String {
        format!("{}_{}", platform.as_str(), platform_campaign_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unified_id() {
        assert_eq!(
            UnifiedCampaign::unified_id(Platform::Meta, "123"),
            "meta_ads_123"
        );
        assert_eq!(
            UnifiedCampaign::unified_id(Platform::Pinterest, "549755885175"),
            "pinterest_ads_549755885175"
        );
    }

    #[test]
    fn test_status_storage_round_trip() {
        for status in [
            CampaignStatus::Draft,
            CampaignStatus::Active,
            CampaignStatus::Paused,
            CampaignStatus::Completed,
        ] {
            assert_eq!(CampaignStatus::from_storage(status.as_str()), status);
        }
        // Unknown strings degrade to draft, not a panic.
        assert_eq!(CampaignStatus::from_storage("ARCHIVED"), CampaignStatus::Draft);
    }

    #[test]
    fn test_objective_storage_round_trip() {
        for objective in [
            CampaignObjective::Awareness,
            CampaignObjective::Traffic,
            CampaignObjective::Engagement,
            CampaignObjective::Leads,
            CampaignObjective::Sales,
            CampaignObjective::AppPromotion,
            CampaignObjective::VideoViews,
        ] {
            assert_eq!(CampaignObjective::from_storage(objective.as_str()), objective);
        }
    }
}
