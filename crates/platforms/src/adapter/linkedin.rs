//! LinkedIn Ads adapter.
//!
//! Talks to the Marketing API (`adCampaignsV2`, `adAnalyticsV2`).
//! Normalization notes:
//! - campaigns are addressed by URN (`urn:li:sponsoredCampaign:<id>`)
//! - budget and cost amounts are decimal strings in currency units
//! - analytics dates arrive as split day/month/year objects
//! - the API has no weekly granularity, so weekly falls back to daily

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

const BASE_URL: &str = "https://api.linkedin.com/v2";
const PLATFORM: Platform = Platform::LinkedIn;
const REQUIRED_CREDENTIALS: &[&str] = &["access_token", "account_id"];

pub struct LinkedInAdsAdapter {
    client: Client,
}

// ============================================================================
// Marketing API response structures
// ============================================================================

#[derive(Debug, Deserialize)]
struct ElementsResponse<T> {
    #[serde(default = "Vec::new")]
    elements: Vec<T>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LinkedInCampaign {
    id: i64,
    name: Option<String>,
    status: Option<String>,
    objective_type: Option<String>,
    daily_budget: Option<LinkedInMoney>,
    total_budget: Option<LinkedInMoney>,
    run_schedule: Option<RunSchedule>,
    targeting_criteria: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LinkedInMoney {
    amount: String,
    currency_code: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RunSchedule {
    start: Option<i64>,
    end: Option<i64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AnalyticsElement {
    date_range: Option<AnalyticsDateRange>,
    impressions: Option<u64>,
    clicks: Option<u64>,
    cost_in_usd: Option<String>,
    external_website_conversions: Option<f64>,
    conversion_value_in_local_currency: Option<String>,
}

#[derive(Debug, Deserialize)]
struct AnalyticsDateRange {
    start: Option<AnalyticsDate>,
}

#[derive(Debug, Deserialize)]
struct AnalyticsDate {
    day: u32,
    month: u32,
    year: i32,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: Option<String>,
}

// ============================================================================
// Normalization helpers
// ============================================================================

fn campaign_urn(native_id: &str) -> String {
    format!("urn:li:sponsoredCampaign:{}", native_id)
}

fn account_urn(account_id: &str) -> String {
    format!("urn:li:sponsoredAccount:{}", account_id)
}

fn map_status(status: Option<&str>) -> CampaignStatus {
    match status.unwrap_or_default() {
        "ACTIVE" => CampaignStatus::Active,
        "PAUSED" => CampaignStatus::Paused,
        "ARCHIVED" | "COMPLETED" | "CANCELED" => CampaignStatus::Completed,
        _ => CampaignStatus::Draft,
    }
}

fn map_objective(objective: Option<&str>) -> CampaignObjective {
    match objective.unwrap_or_default() {
        "BRAND_AWARENESS" => CampaignObjective::Awareness,
        "ENGAGEMENT" => CampaignObjective::Engagement,
        "LEAD_GENERATION" | "JOB_APPLICANTS" => CampaignObjective::Leads,
        "WEBSITE_CONVERSIONS" => CampaignObjective::Sales,
        "VIDEO_VIEWS" => CampaignObjective::VideoViews,
        _ => CampaignObjective::Traffic,
    }
}

fn parse_amount(raw: &str) -> Decimal {
    raw.parse::<Decimal>().unwrap_or_default()
}

fn millis_to_date(millis: Option<i64>) -> Option<NaiveDate> {
    millis
        .and_then(DateTime::from_timestamp_millis)
        .map(|dt| dt.date_naive())
}

impl LinkedInCampaign {
    fn into_unified(self) -> UnifiedCampaign {
        let native_id = self.id.to_string();
        let budget = match (&self.daily_budget, &self.total_budget) {
            (Some(daily), _) => Budget::daily(
                parse_amount(&daily.amount),
                daily.currency_code.as_deref().unwrap_or("USD"),
            ),
            (None, Some(total)) => Budget::lifetime(
                parse_amount(&total.amount),
                total.currency_code.as_deref().unwrap_or("USD"),
            ),
            (None, None) => Budget::daily(Decimal::ZERO, "USD"),
        };
        let now = Utc::now();

        UnifiedCampaign {
            id: UnifiedCampaign::unified_id(PLATFORM, &native_id),
            platform: PLATFORM,
            platform_campaign_id: native_id,
            name: self.name.unwrap_or_default(),
            status: map_status(self.status.as_deref()),
            objective: map_objective(self.objective_type.as_deref()),
            budget,
            targeting: self.targeting_criteria.unwrap_or(serde_json::Value::Null),
            start_date: self.run_schedule.as_ref().and_then(|r| millis_to_date(r.start)),
            end_date: self.run_schedule.as_ref().and_then(|r| millis_to_date(r.end)),
            created_at: now,
            updated_at: now,
        }
    }
}

impl AnalyticsElement {
    fn into_unified(self, native_id: &str) -> Option<UnifiedMetrics> {
        let start = self.date_range?.start?;
        let date = NaiveDate::from_ymd_opt(start.year, start.month, start.day)?;

        Some(UnifiedMetrics {
            campaign_id: UnifiedCampaign::unified_id(PLATFORM, native_id),
            platform: PLATFORM,
            date,
            impressions: self.impressions.unwrap_or(0),
            clicks: self.clicks.unwrap_or(0),
            conversions: self.external_website_conversions.unwrap_or(0.0),
            spend: self
                .cost_in_usd
                .as_deref()
                .map(parse_amount)
                .unwrap_or_default(),
            revenue: self
                .conversion_value_in_local_currency
                .as_deref()
                .map(parse_amount)
                .unwrap_or_default(),
            currency: "USD".to_string(),
        })
    }
}

// ============================================================================
// Adapter implementation
// ============================================================================

impl LinkedInAdsAdapter {
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

        debug!("LinkedIn Ads request: {}/{}", BASE_URL, path);

        let response = self
            .client
            .get(format!("{}/{}", BASE_URL, path))
            .bearer_auth(token)
            .header("X-Restli-Protocol-Version", "2.0.0")
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
                    "Confirm the token carries the rw_ads or r_ads scope".to_string(),
                    "Check the sponsored account id".to_string(),
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

    fn time_granularity(granularity: MetricsGranularity) -> &'static str {
        match granularity {
            // No weekly bucket in the API; daily is the finest substitute.
            MetricsGranularity::Daily | MetricsGranularity::Weekly => "DAILY",
            MetricsGranularity::Monthly => "MONTHLY",
        }
    }
}

#[async_trait]
impl PlatformAdapter for LinkedInAdsAdapter {
    fn platform(&self) -> Platform {
        PLATFORM
    }

    fn required_credentials(&self) -> &'static [&'static str] {
        REQUIRED_CREDENTIALS
    }

    fn rate_limit(&self) -> RateLimit {
        RateLimit {
            requests_per_hour: 500,
            min_delay: Duration::ZERO,
        }
    }

    async fn authenticate(
        &self,
        credentials: &PlatformCredentials,
    ) -> Result<bool, PlatformError> {
        match self.fetch(credentials, "me", &[]).await {
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
        let account_id = credentials.require("account_id").ok_or_else(|| {
            PlatformError::InvalidCredentials {
                platform: PLATFORM,
                missing: vec!["account_id".to_string()],
            }
        })?;

        let body = self
            .fetch(
                credentials,
                "adCampaignsV2",
                &[
                    ("q", "search".to_string()),
                    ("search.account.values[0]", account_urn(account_id)),
                    ("start", offset.to_string()),
                    ("count", limit.to_string()),
                ],
            )
            .await?;

        let page: ElementsResponse<LinkedInCampaign> = Self::parse_body(&body)?;
        let campaigns: Vec<UnifiedCampaign> = page
            .elements
            .into_iter()
            .map(LinkedInCampaign::into_unified)
            .collect();

        debug!("LinkedIn Ads: fetched {} campaigns", campaigns.len());
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

        let body = self
            .fetch(
                credentials,
                "adAnalyticsV2",
                &[
                    ("q", "analytics".to_string()),
                    ("pivot", "CAMPAIGN".to_string()),
                    ("campaigns[0]", campaign_urn(native_id)),
                    (
                        "timeGranularity",
                        Self::time_granularity(granularity).to_string(),
                    ),
                    ("dateRange.start.year", start.format("%Y").to_string()),
                    ("dateRange.start.month", start.format("%-m").to_string()),
                    ("dateRange.start.day", start.format("%-d").to_string()),
                    ("dateRange.end.year", end.format("%Y").to_string()),
                    ("dateRange.end.month", end.format("%-m").to_string()),
                    ("dateRange.end.day", end.format("%-d").to_string()),
                ],
            )
            .await?;

        let page: ElementsResponse<AnalyticsElement> = Self::parse_body(&body)?;
        Ok(page
            .elements
            .into_iter()
            .filter_map(|element| element.into_unified(native_id))
            .collect())
    }
}
