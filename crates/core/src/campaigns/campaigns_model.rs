use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use adsync_platforms::{
    Budget, CampaignObjective, CampaignStatus, DerivedMetrics, Platform, UnifiedCampaign,
};

/// A stored campaign owned by a user, with its latest metrics snapshot.
///
/// The snapshot holds the most recent day's raw counts only; derived ratios
/// are recomputed on read so they can never drift from the counts.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Campaign {
    /// Unified id: `<platform>_<platform_campaign_id>`.
    pub id: String,
    pub user_id: String,
    pub platform: Platform,
    pub platform_campaign_id: String,
    pub name: String,
    pub status: CampaignStatus,
    pub objective: CampaignObjective,
    pub budget: Budget,
    pub targeting: serde_json::Value,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub metrics: Option<MetricsSnapshot>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Latest raw metrics stored on a campaign.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricsSnapshot {
    pub date: NaiveDate,
    pub impressions: u64,
    pub clicks: u64,
    pub conversions: f64,
    pub spend: Decimal,
    pub revenue: Decimal,
    pub currency: String,
}

impl MetricsSnapshot {
    pub fn derived(&self) -> DerivedMetrics {
        DerivedMetrics::from_raw(
            self.impressions,
            self.clicks,
            self.conversions,
            self.spend,
            self.revenue,
        )
    }
}

/// Campaign data as fetched from a platform, ready to upsert for a user.
#[derive(Debug, Clone)]
pub struct CampaignUpsert {
    pub user_id: String,
    pub campaign: UnifiedCampaign,
}

/// Campaign view returned by the API, snapshot ratios included.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CampaignView {
    #[serde(flatten)]
    pub campaign: Campaign,
    pub derived: Option<DerivedMetrics>,
}

impl From<Campaign> for CampaignView {
    fn from(campaign: Campaign) -> Self {
        let derived = campaign.metrics.as_ref().map(MetricsSnapshot::derived);
        Self { campaign, derived }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_view_recomputes_ratios_from_snapshot() {
        let campaign = Campaign {
            id: "meta_ads_1".to_string(),
            user_id: "user-1".to_string(),
            platform: Platform::Meta,
            platform_campaign_id: "1".to_string(),
            name: "Test".to_string(),
            status: CampaignStatus::Active,
            objective: CampaignObjective::Sales,
            budget: Budget::daily(dec!(50), "USD"),
            targeting: serde_json::Value::Null,
            start_date: None,
            end_date: None,
            metrics: Some(MetricsSnapshot {
                date: NaiveDate::from_ymd_opt(2025, 6, 1).unwrap(),
                impressions: 1000,
                clicks: 50,
                conversions: 5.0,
                spend: dec!(25),
                revenue: dec!(100),
                currency: "USD".to_string(),
            }),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        let view = CampaignView::from(campaign);
        let derived = view.derived.unwrap();
        assert!((derived.ctr - 0.05).abs() < 1e-9);
        assert!((derived.roas - 4.0).abs() < 1e-9);
    }

    #[test]
    fn test_view_without_snapshot_has_no_derived() {
        let campaign = Campaign {
            id: "google_ads_2".to_string(),
            user_id: "user-1".to_string(),
            platform: Platform::Google,
            platform_campaign_id: "2".to_string(),
            name: "No metrics yet".to_string(),
            status: CampaignStatus::Draft,
            objective: CampaignObjective::Traffic,
            budget: Budget::daily(dec!(10), "USD"),
            targeting: serde_json::Value::Null,
            start_date: None,
            end_date: None,
            metrics: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        assert!(CampaignView::from(campaign).derived.is_none());
    }
}
