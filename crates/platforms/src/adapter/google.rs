//! Google Ads adapter.
//!
//! Talks to the Google Ads REST API via `searchStream` and GAQL.
//! Normalization notes:
//! - money arrives in micros (`amount_micros`, `cost_micros`)
//! - int64 counters are serialized as strings in REST JSON
//! - GAQL has `LIMIT` but no `OFFSET`, so the offset is applied client side

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use log::debug;
use reqwest::Client;
use rust_decimal::Decimal;
use serde::Deserialize;

use crate::adapter::{native_campaign_id, PlatformAdapter, RateLimit};
use crate::errors::PlatformError;
use crate::models::{
    Budget, CampaignObjective, CampaignStatus, MetricsGranularity, Platform, PlatformCredentials,
    UnifiedCampaign, UnifiedMetrics,
};

const BASE_URL: &str = "https://googleads.googleapis.com/v16";
const PLATFORM: Platform = Platform::Google;
const REQUIRED_CREDENTIALS: &[&str] = &["access_token", "developer_token", "customer_id"];

const MICROS_PER_UNIT: i64 = 1_000_000;

pub struct GoogleAdsAdapter {
    client: Client,
}

// ============================================================================
// REST API response structures
// ============================================================================

#[derive(Debug, Deserialize)]
struct StreamChunk {
    #[serde(default = "Vec::new")]
    results: Vec<SearchRow>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SearchRow {
    campaign: Option<GoogleCampaign>,
    campaign_budget: Option<GoogleBudget>,
    metrics: Option<GoogleMetrics>,
    segments: Option<GoogleSegments>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GoogleCampaign {
    id: String,
    name: Option<String>,
    status: Option<String>,
    advertising_channel_type: Option<String>,
    start_date: Option<String>,
    end_date: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GoogleBudget {
    amount_micros: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GoogleMetrics {
    impressions: Option<String>,
    clicks: Option<String>,
    cost_micros: Option<String>,
    conversions: Option<f64>,
    conversions_value: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct GoogleSegments {
    date: Option<String>,
    week: Option<String>,
    month: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    error: Option<ApiErrorDetail>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorDetail {
    message: Option<String>,
}

// ============================================================================
// Normalization helpers
// ============================================================================

fn map_status(status: Option<&str>) -> CampaignStatus {
    match status.unwrap_or_default() {
        "ENABLED" => CampaignStatus::Active,
        "PAUSED" => CampaignStatus::Paused,
        "REMOVED" => CampaignStatus::Completed,
        _ => CampaignStatus::Draft,
    }
}

fn map_channel_type(channel: Option<&str>) -> CampaignObjective {
    match channel.unwrap_or_default() {
        "DISPLAY" => CampaignObjective::Awareness,
        "VIDEO" => CampaignObjective::VideoViews,
        "SHOPPING" | "PERFORMANCE_MAX" => CampaignObjective::Sales,
        "MULTI_CHANNEL" => CampaignObjective::AppPromotion,
        "DISCOVERY" => CampaignObjective::Engagement,
        _ => CampaignObjective::Traffic,
    }
}

fn micros_to_amount(raw: Option<&str>) -> Decimal {
    let micros = raw.and_then(|s| s.parse::<i64>().ok()).unwrap_or(0);
    Decimal::from(micros) / Decimal::from(MICROS_PER_UNIT)
}

fn parse_count(raw: Option<&str>) -> u64 {
    raw.and_then(|s| s.parse::<u64>().ok()).unwrap_or(0)
}

fn parse_date(raw: Option<&str>) -> Option<NaiveDate> {
    raw.and_then(|s| NaiveDate::parse_from_str(s, "%Y-%m-%d").ok())
}

impl SearchRow {
    fn into_unified_campaign(self) -> Option<UnifiedCampaign> {
        let campaign = self.campaign?;
        let now: DateTime<Utc> = Utc::now();

        Some(UnifiedCampaign {
            id: UnifiedCampaign::unified_id(PLATFORM, &campaign.id),
            platform: PLATFORM,
            platform_campaign_id: campaign.id,
            name: campaign.name.unwrap_or_default(),
            status: map_status(campaign.status.as_deref()),
            objective: map_channel_type(campaign.advertising_channel_type.as_deref()),
            budget: Budget::daily(
                micros_to_amount(
                    self.campaign_budget
                        .as_ref()
                        .and_then(|b| b.amount_micros.as_deref()),
                ),
                "USD",
            ),
            targeting: serde_json::Value::Null,
            start_date: parse_date(campaign.start_date.as_deref()),
            end_date: parse_date(campaign.end_date.as_deref()),
            created_at: now,
            updated_at: now,
        })
    }

    fn into_unified_metrics(self, native_id: &str) -> Option<UnifiedMetrics> {
        let metrics = self.metrics?;
        let segments = self.segments?;
        // Weekly/monthly rows carry their bucket's first day in week/month.
        let date = parse_date(segments.date.as_deref())
            .or_else(|| parse_date(segments.week.as_deref()))
            .or_else(|| parse_date(segments.month.as_deref()))?;

        Some(UnifiedMetrics {
            campaign_id: UnifiedCampaign::unified_id(PLATFORM, native_id),
            platform: PLATFORM,
            date,
            impressions: parse_count(metrics.impressions.as_deref()),
            clicks: parse_count(metrics.clicks.as_deref()),
            conversions: metrics.conversions.unwrap_or(0.0),
            spend: micros_to_amount(metrics.cost_micros.as_deref()),
            revenue: Decimal::try_from(metrics.conversions_value.unwrap_or(0.0))
                .unwrap_or_default(),
            currency: "USD".to_string(),
        })
    }
}

// ============================================================================
// Adapter implementation
// ============================================================================

impl GoogleAdsAdapter {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    async fn search(
        &self,
        credentials: &PlatformCredentials,
        query: &str,
    ) -> Result<Vec<SearchRow>, PlatformError> {
        let missing = credentials.missing_keys(REQUIRED_CREDENTIALS);
        if !missing.is_empty() {
            return Err(PlatformError::InvalidCredentials {
                platform: PLATFORM,
                missing,
            });
        }
        let token = credentials.require("access_token").unwrap_or_default();
        let developer_token = credentials.require("developer_token").unwrap_or_default();
        let customer_id = credentials.require("customer_id").unwrap_or_default();

        debug!("Google Ads searchStream for customer {}", customer_id);

        let response = self
            .client
            .post(format!(
                "{}/customers/{}/googleAds:searchStream",
                BASE_URL, customer_id
            ))
            .bearer_auth(token)
            .header("developer-token", developer_token)
            .json(&serde_json::json!({ "query": query }))
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    PlatformError::Timeout { platform: PLATFORM }
                } else {
                    PlatformError::Network(e)
                }
            })?;

        let status = response.status();
        let body = response.text().await.map_err(PlatformError::Network)?;

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(PlatformError::RateLimited { platform: PLATFORM });
        }
        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN {
            return Err(PlatformError::AuthenticationFailed { platform: PLATFORM });
        }
        if !status.is_success() {
            let message = serde_json::from_str::<Vec<ApiErrorBody>>(&body)
                .ok()
                .and_then(|chunks| chunks.into_iter().next())
                .and_then(|c| c.error)
                .and_then(|e| e.message)
                .unwrap_or_else(|| format!("HTTP {}", status));
            return Err(PlatformError::Api {
                platform: PLATFORM,
                message,
                suggestions: vec![
                    "Confirm the developer token is approved for production".to_string(),
                    "Check that the customer id has no dashes".to_string(),
                ],
            });
        }

        // searchStream returns an array of chunks, each with a results page.
        let chunks: Vec<StreamChunk> =
            serde_json::from_str(&body).map_err(|e| PlatformError::Parse {
                platform: PLATFORM,
                message: e.to_string(),
            })?;
        Ok(chunks.into_iter().flat_map(|c| c.results).collect())
    }

    fn metrics_query(
        native_id: &str,
        start: NaiveDate,
        end: NaiveDate,
        granularity: MetricsGranularity,
    ) -> String {
        let bucket = match granularity {
            MetricsGranularity::Daily => "segments.date",
            MetricsGranularity::Weekly => "segments.week",
            MetricsGranularity::Monthly => "segments.month",
        };
        format!(
            "SELECT {bucket}, metrics.impressions, metrics.clicks, metrics.cost_micros, \
             metrics.conversions, metrics.conversions_value \
             FROM campaign \
             WHERE campaign.id = {native_id} \
             AND segments.date BETWEEN '{start}' AND '{end}'"
        )
    }
}

#[async_trait]
impl PlatformAdapter for GoogleAdsAdapter {
    fn platform(&self) -> Platform {
        PLATFORM
    }

    fn required_credentials(&self) -> &'static [&'static str] {
        REQUIRED_CREDENTIALS
    }

    fn rate_limit(&self) -> RateLimit {
        RateLimit {
            requests_per_hour: 1000,
            min_delay: Duration::ZERO,
        }
    }

    async fn authenticate(
        &self,
        credentials: &PlatformCredentials,
    ) -> Result<bool, PlatformError> {
        match self
            .search(credentials, "SELECT customer.id FROM customer LIMIT 1")
            .await
        {
            Ok(_) => Ok(true),
            Err(PlatformError::AuthenticationFailed { .. }) => Ok(false),
            Err(e) => Err(e),
        }
    }

    async fn get_campaigns(
        &self,
        credentials: &PlatformCredentials,
        limit: u32,
        offset: u32,
    ) -> Result<Vec<UnifiedCampaign>, PlatformError> {
        let query = format!(
            "SELECT campaign.id, campaign.name, campaign.status, \
             campaign.advertising_channel_type, campaign.start_date, campaign.end_date, \
             campaign_budget.amount_micros \
             FROM campaign \
             ORDER BY campaign.id \
             LIMIT {}",
            limit + offset
        );
        let rows = self.search(credentials, &query).await?;

        let campaigns: Vec<UnifiedCampaign> = rows
            .into_iter()
            .skip(offset as usize)
            .filter_map(SearchRow::into_unified_campaign)
            .collect();

        debug!("Google Ads: fetched {} campaigns", campaigns.len());
        Ok(campaigns)
    }

    async fn get_metrics(
        &self,
        credentials: &PlatformCredentials,
        campaign_id: &str,
        start: NaiveDate,
        end: NaiveDate,
        granularity: MetricsGranularity,
    ) -> Result<Vec<UnifiedMetrics>, PlatformError> {
        let native_id = native_campaign_id(PLATFORM, campaign_id);
        let query = Self::metrics_query(native_id, start, end, granularity);
        let rows = self.search(credentials, &query).await?;

        Ok(rows
            .into_iter()
            .filter_map(|row| row.into_unified_metrics(native_id))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_status_mapping() {
        assert_eq!(map_status(Some("ENABLED")), CampaignStatus::Active);
        assert_eq!(map_status(Some("PAUSED")), CampaignStatus::Paused);
        assert_eq!(map_status(Some("REMOVED")), CampaignStatus::Completed);
        assert_eq!(map_status(Some("UNKNOWN")), CampaignStatus::Draft);
    }

    #[test]
    fn test_micros_to_amount() {
        assert_eq!(micros_to_amount(Some("50000000")), dec!(50));
        assert_eq!(micros_to_amount(Some("1250000")), dec!(1.25));
        assert_eq!(micros_to_amount(None), dec!(0));
    }

    #[test]
    fn test_campaign_row_normalization() {
        let json = r#"{
            "campaign": {
                "id": "9081726354",
                "name": "Brand Search",
                "status": "ENABLED",
                "advertisingChannelType": "SEARCH",
                "startDate": "2025-03-10"
            },
            "campaignBudget": {"amountMicros": "25000000"}
        }"#;

        let row: SearchRow = serde_json::from_str(json).unwrap();
        let unified = row.into_unified_campaign().unwrap();

        assert_eq!(unified.id, "google_ads_9081726354");
        assert_eq!(unified.status, CampaignStatus::Active);
        assert_eq!(unified.objective, CampaignObjective::Traffic);
        assert_eq!(unified.budget.amount, dec!(25));
        assert_eq!(unified.start_date, NaiveDate::from_ymd_opt(2025, 3, 10));
    }

    #[test]
    fn test_metrics_row_normalization() {
        let json = r#"{
            "metrics": {
                "impressions": "42000",
                "clicks": "980",
                "costMicros": "310000000",
                "conversions": 35.5,
                "conversionsValue": 1750.0
            },
            "segments": {"date": "2025-06-15"}
        }"#;

        let row: SearchRow = serde_json::from_str(json).unwrap();
        let metrics = row.into_unified_metrics("9081726354").unwrap();

        assert_eq!(metrics.campaign_id, "google_ads_9081726354");
        assert_eq!(metrics.impressions, 42_000);
        assert_eq!(metrics.clicks, 980);
        assert_eq!(metrics.conversions, 35.5);
        assert_eq!(metrics.spend, dec!(310));
        assert_eq!(metrics.revenue, dec!(1750));
    }

    #[test]
    fn test_metrics_query_buckets_by_granularity() {
        let start = NaiveDate::from_ymd_opt(2025, 6, 1).unwrap();
        let end = NaiveDate::from_ymd_opt(2025, 6, 30).unwrap();
        let daily = GoogleAdsAdapter::metrics_query("1", start, end, MetricsGranularity::Daily);
        assert!(daily.contains("SELECT segments.date"));
        let monthly = GoogleAdsAdapter::metrics_query("1", start, end, MetricsGranularity::Monthly);
        assert!(monthly.contains("SELECT segments.month"));
        assert!(monthly.contains("BETWEEN '2025-06-01' AND '2025-06-30'"));
    }

    #[test]
    fn test_row_without_campaign_is_skipped() {
        let row: SearchRow = serde_json::from_str(r#"{"segments": {"date": "2025-06-15"}}"#).unwrap();
        assert!(row.into_unified_campaign().is_none());
    }
}
