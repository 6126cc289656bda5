//! Pinterest Ads adapter.
//!
//! Talks to the v5 API. Normalization notes:
//! - spend caps and analytics spend arrive in micro-currency
//! - analytics columns use UPPER_SNAKE names (`IMPRESSION_1`, `CLICKTHROUGH_1`)
//! - pagination is bookmark-based, so the offset is applied client side

use std::time::Duration;

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
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

const BASE_URL: &str = "https://api.pinterest.com/v5";
const PLATFORM: Platform = Platform::Pinterest;
const REQUIRED_CREDENTIALS: &[&str] = &["access_token", "ad_account_id"];

const MICROS_PER_UNIT: i64 = 1_000_000;

pub struct PinterestAdsAdapter {
    client: Client,
}

// ============================================================================
// v5 API response structures
// ============================================================================

#[derive(Debug, Deserialize)]
struct ItemsResponse<T> {
    #[serde(default = "Vec::new")]
    items: Vec<T>,
}

#[derive(Debug, Deserialize)]
struct PinterestCampaign {
    id: String,
    name: Option<String>,
    status: Option<String>,
    objective_type: Option<String>,
    daily_spend_cap: Option<i64>,
    lifetime_spend_cap: Option<i64>,
    start_time: Option<i64>,
    end_time: Option<i64>,
    created_time: Option<i64>,
    updated_time: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct AnalyticsRow {
    #[serde(rename = "DATE")]
    date: Option<String>,
    #[serde(rename = "IMPRESSION_1")]
    impressions: Option<u64>,
    #[serde(rename = "CLICKTHROUGH_1")]
    clicks: Option<u64>,
    #[serde(rename = "SPEND_IN_MICRO_DOLLAR")]
    spend_micro: Option<i64>,
    #[serde(rename = "TOTAL_CONVERSIONS")]
    conversions: Option<f64>,
    #[serde(rename = "TOTAL_ORDER_VALUE_IN_MICRO_DOLLAR")]
    order_value_micro: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: Option<String>,
}

// ============================================================================
// Normalization helpers
// ============================================================================

fn map_status(status: Option<&str>) -> CampaignStatus {
    match status.unwrap_or_default() {
        "ACTIVE" => CampaignStatus::Active,
        "PAUSED" => CampaignStatus::Paused,
        "ARCHIVED" | "COMPLETED" => CampaignStatus::Completed,
        _ => CampaignStatus::Draft,
    }
}

fn map_objective(objective: Option<&str>) -> CampaignObjective {
    match objective.unwrap_or_default() {
        "AWARENESS" | "BRAND_AWARENESS" => CampaignObjective::Awareness,
        "VIDEO_VIEW" => CampaignObjective::VideoViews,
        "WEB_CONVERSION" | "CATALOG_SALES" => CampaignObjective::Sales,
        "APP_INSTALL" => CampaignObjective::AppPromotion,
        "LEAD_GENERATION" => CampaignObjective::Leads,
        _ => CampaignObjective::Traffic,
    }
}

fn micros_to_amount(micros: Option<i64>) -> Decimal {
    Decimal::from(micros.unwrap_or(0)) / Decimal::from(MICROS_PER_UNIT)
}

fn millis_to_date(millis: Option<i64>) -> Option<NaiveDate> {
    millis
        .and_then(chrono::DateTime::from_timestamp_millis)
        .map(|dt| dt.date_naive())
}

impl PinterestCampaign {
    fn into_unified(self) -> UnifiedCampaign {
        let budget = match (self.daily_spend_cap, self.lifetime_spend_cap) {
            (Some(daily), _) if daily > 0 => Budget::daily(micros_to_amount(Some(daily)), "USD"),
            (_, Some(lifetime)) if lifetime > 0 => {
                Budget::lifetime(micros_to_amount(Some(lifetime)), "USD")
            }
            _ => Budget::daily(Decimal::ZERO, "USD"),
        };
        let now = Utc::now();

        UnifiedCampaign {
            id: UnifiedCampaign::unified_id(PLATFORM, &self.id),
            platform: PLATFORM,
            platform_campaign_id: self.id,
            name: self.name.unwrap_or_default(),
            status: map_status(self.status.as_deref()),
            objective: map_objective(self.objective_type.as_deref()),
            budget,
            targeting: serde_json::Value::Null,
            start_date: millis_to_date(self.start_time),
            end_date: millis_to_date(self.end_time),
            created_at: self
                .created_time
                .and_then(chrono::DateTime::from_timestamp_millis)
                .unwrap_or(now),
            updated_at: self
                .updated_time
                .and_then(chrono::DateTime::from_timestamp_millis)
                .unwrap_or(now),
        }
    }
}

impl AnalyticsRow {
    fn into_unified(self, native_id: &str) -> Option<UnifiedMetrics> {
        let date = NaiveDate::parse_from_str(self.date.as_deref()?, "%Y-%m-%d").ok()?;

        Some(UnifiedMetrics {
            campaign_id: UnifiedCampaign::unified_id(PLATFORM, native_id),
            platform: PLATFORM,
            date,
            impressions: self.impressions.unwrap_or(0),
            clicks: self.clicks.unwrap_or(0),
            conversions: self.conversions.unwrap_or(0.0),
            spend: micros_to_amount(self.spend_micro),
            revenue: micros_to_amount(self.order_value_micro),
            currency: "USD".to_string(),
        })
    }
}

// ============================================================================
// Adapter implementation
// ============================================================================

impl PinterestAdsAdapter {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    async fn fetch(
        &self,
        credentials: &PlatformCredentials,
        path: &str,
        params: &[(&str, String)],
    ) -> Result<String, PlatformError> {
        let token = credentials
            .require("access_token")
            .ok_or_else(|| PlatformError::InvalidCredentials {
                platform: PLATFORM,
                missing: vec!["access_token".to_string()],
            })?;

        debug!("Pinterest Ads request: {}/{}", BASE_URL, path);

        let response = self
            .client
            .get(format!("{}/{}", BASE_URL, path))
            .bearer_auth(token)
            .query(params)
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
            let message = serde_json::from_str::<ApiErrorBody>(&body)
                .ok()
                .and_then(|b| b.message)
                .unwrap_or_else(|| format!("HTTP {}", status));
            return Err(PlatformError::Api {
                platform: PLATFORM,
                message,
                suggestions: vec![
                    "Confirm the token carries the ads:read scope".to_string(),
                    "Check the ad account id".to_string(),
                ],
            });
        }

        Ok(body)
    }

    fn parse_body<T: serde::de::DeserializeOwned>(body: &str) -> Result<T, PlatformError> {
        serde_json::from_str(body).map_err(|e| PlatformError::Parse {
            platform: PLATFORM,
            message: e.to_string(),
        })
    }

    fn granularity_param(granularity: MetricsGranularity) -> &'static str {
        match granularity {
            MetricsGranularity::Daily => "DAY",
            MetricsGranularity::Weekly => "WEEK",
            MetricsGranularity::Monthly => "MONTH",
        }
    }

    fn account_id<'a>(
        credentials: &'a PlatformCredentials,
    ) -> Result<&'a str, PlatformError> {
        credentials.require("ad_account_id").ok_or_else(|| {
            PlatformError::InvalidCredentials {
                platform: PLATFORM,
                missing: vec!["ad_account_id".to_string()],
            }
        })
    }
}

#[async_trait]
impl PlatformAdapter for PinterestAdsAdapter {
    fn platform(&self) -> Platform {
        PLATFORM
    }

    fn required_credentials(&self) -> &'static [&'static str] {
        REQUIRED_CREDENTIALS
    }

    fn rate_limit(&self) -> RateLimit {
        RateLimit {
            requests_per_hour: 900,
            min_delay: Duration::ZERO,
        }
    }

    async fn authenticate(
        &self,
        credentials: &PlatformCredentials,
    ) -> Result<bool, PlatformError> {
        match self.fetch(credentials, "user_account", &[]).await {
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
        let account_id = Self::account_id(credentials)?;
        let path = format!("ad_accounts/{}/campaigns", account_id);
        let body = self
            .fetch(
                credentials,
                &path,
                &[
                    ("page_size", (limit + offset).to_string()),
                    ("order", "DESCENDING".to_string()),
                ],
            )
            .await?;

        let page: ItemsResponse<PinterestCampaign> = Self::parse_body(&body)?;
        let campaigns: Vec<UnifiedCampaign> = page
            .items
            .into_iter()
            .skip(offset as usize)
            .map(PinterestCampaign::into_unified)
            .collect();

        debug!("Pinterest Ads: fetched {} campaigns", campaigns.len());
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
        let account_id = Self::account_id(credentials)?;
        let native_id = native_campaign_id(PLATFORM, campaign_id);
        let path = format!("ad_accounts/{}/campaigns/analytics", account_id);
        let columns = "SPEND_IN_MICRO_DOLLAR,IMPRESSION_1,CLICKTHROUGH_1,\
                       TOTAL_CONVERSIONS,TOTAL_ORDER_VALUE_IN_MICRO_DOLLAR";

        let body = self
            .fetch(
                credentials,
                &path,
                &[
                    ("campaign_ids", native_id.to_string()),
                    ("start_date", start.to_string()),
                    ("end_date", end.to_string()),
                    (
                        "granularity",
                        Self::granularity_param(granularity).to_string(),
                    ),
                    ("columns", columns.to_string()),
                ],
            )
            .await?;

        let rows: Vec<AnalyticsRow> = Self::parse_body(&body)?;
        Ok(rows
            .into_iter()
            .filter_map(|row| row.into_unified(native_id))
            .collect())
    }
}
