//! Unified performance metrics.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::Platform;

/// Time bucket for metric snapshots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MetricsGranularity {
    Daily,
    Weekly,
    Monthly,
}

impl MetricsGranularity {
    pub fn as_str(&self) -> &'static str {
        match self {
            MetricsGranularity::Daily => "daily",
            MetricsGranularity::Weekly => "weekly",
            MetricsGranularity::Monthly => "monthly",
        }
    }
}

/// Ratios derived from raw counts.
///
/// Always recomputed from the raw counts at read/sync time, never stored
/// from vendor-reported values, so the numbers cannot drift from the counts
/// they describe. A zero denominator yields zero, never NaN or infinity.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DerivedMetrics {
    /// Click-through rate: clicks / impressions.
    pub ctr: f64,
    /// Cost per click: spend / clicks.
    pub cpc: f64,
    /// Cost per mille: spend / impressions * 1000.
    pub cpm: f64,
    /// Cost per acquisition: spend / conversions.
    pub cpa: f64,
    /// Return on ad spend: revenue / spend.
    pub roas: f64,
}

impl DerivedMetrics {
    pub fn from_raw(
        impressions: u64,
        clicks: u64,
        conversions: f64,
        spend: Decimal,
        revenue: Decimal,
    ) -> Self {
        let spend_f = decimal_to_f64(spend);
        let revenue_f = decimal_to_f64(revenue);

        Self {
            ctr: ratio(clicks as f64, impressions as f64),
            cpc: ratio(spend_f, clicks as f64),
            cpm: ratio(spend_f, impressions as f64) * 1000.0,
            cpa: ratio(spend_f, conversions),
            roas: ratio(revenue_f, spend_f),
        }
    }
}

fn ratio(numerator: f64, denominator: f64) -> f64 {
    if denominator == 0.0 {
        0.0
    } else {
        numerator / denominator
    }
}

fn decimal_to_f64(d: Decimal) -> f64 {
    use rust_decimal::prelude::ToPrimitive;
    d.to_f64().unwrap_or(0.0)
}

/// One time-bucketed performance snapshot for a campaign.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnifiedMetrics {
    /// Unified campaign id (`<platform>_<native id>`).
    pub campaign_id: String,
    pub platform: Platform,
    pub date: NaiveDate,
    pub impressions: u64,
    pub clicks: u64,
    pub conversions: f64,
    pub spend: Decimal,
    pub revenue: Decimal,
    pub currency: String,
}

impl UnifiedMetrics {
    /// Recompute CTR/CPC/CPM/CPA/ROAS from the raw counts.
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
