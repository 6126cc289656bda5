//! Meta (Facebook/Instagram) Ads adapter.
//!
//! Talks to the Graph API. Normalization notes:
//! - budgets arrive as cent strings (`daily_budget: "5000"` = 50.00)
//! - insight numerics arrive as strings
//! - conversions are buried in the `actions[]` array by action type
//!
//! Vendor-reported CTR/CPC are ignored; derived ratios are recomputed from
//! the raw counts downstream.

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

const BASE_URL: &str = "https://graph.facebook.com/v18.0";
const PLATFORM: Platform = Platform::Meta;
const REQUIRED_CREDENTIALS: &[&str] = &["access_token", "app_id", "app_secret", "ad_account_id"];

/// Action types counted as conversions, in priority order.
const CONVERSION_ACTIONS: &[&str] = &[
    "offsite_conversion.fb_pixel_purchase",
    "app_install",
    "lead",
];

pub struct MetaAdsAdapter {
    client: Client,
}

// ============================================================================
// Graph API response structures
// ============================================================================

#[derive(Debug, Deserialize)]
struct MeResponse {
    id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct PagedResponse<T> {
    #[serde(default = "Vec::new")]
    data: Vec<T>,
}

#[derive(Debug, Deserialize)]
struct MetaCampaign {
    id: String,
    name: String,
    status: Option<String>,
    objective: Option<String>,
    daily_budget: Option<String>,
    lifetime_budget: Option<String>,
    start_time: Option<String>,
    stop_time: Option<String>,
    targeting: Option<serde_json::Value>,
    created_time: Option<String>,
    updated_time: Option<String>,
}

#[derive(Debug, Deserialize)]
struct MetaAction {
    action_type: String,
    value: String,
}

#[derive(Debug, Deserialize)]
struct MetaInsight {
    campaign_id: Option<String>,
    date_start: String,
    impressions: Option<String>,
    clicks: Option<String>,
    spend: Option<String>,
    #[serde(default)]
    actions: Vec<MetaAction>,
    #[serde(default)]
    action_values: Vec<MetaAction>,
}

#[derive(Debug, Deserialize)]
struct GraphErrorBody {
    error: Option<GraphError>,
}

#[derive(Debug, Deserialize)]
struct GraphError {
    message: Option<String>,
    code: Option<i64>,
}

impl GraphError {
    fn describe(self) -> Option<String> {
        let message = self.message?;
        match self.code {
            Some(code) => Some(format!("{} (code {})", message, code)),
            None => Some(message),
        }
    }
}

// ============================================================================
// Normalization helpers
// ============================================================================

fn map_status(status: Option<&str>) -> CampaignStatus {
    match status.unwrap_or_default() {
        "ACTIVE" => CampaignStatus::Active,
        "PAUSED" | "WITH_ISSUES" => CampaignStatus::Paused,
        "DELETED" | "ARCHIVED" => CampaignStatus::Completed,
        _ => CampaignStatus::Draft,
    }
}

fn map_objective(objective: Option<&str>) -> CampaignObjective {
    match objective.unwrap_or_default() {
        "BRAND_AWARENESS" | "REACH" => CampaignObjective::Awareness,
        "ENGAGEMENT" | "MESSAGES" => CampaignObjective::Engagement,
        "APP_INSTALLS" => CampaignObjective::AppPromotion,
        "VIDEO_VIEWS" => CampaignObjective::VideoViews,
        "LEAD_GENERATION" => CampaignObjective::Leads,
        "CONVERSIONS" | "CATALOG_SALES" => CampaignObjective::Sales,
        _ => CampaignObjective::Traffic,
    }
}

/// Meta reports budgets in cents as strings.
fn cents_to_amount(raw: &str) -> Decimal {
    raw.parse::<Decimal>().unwrap_or_default() / Decimal::from(100)
}

fn parse_date(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok()
}

fn parse_datetime(raw: Option<&str>) -> DateTime<Utc> {
    raw.and_then(|s| DateTime::parse_from_rfc3339(s).ok())
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(Utc::now)
}

fn action_value(actions: &[MetaAction], types: &[&str]) -> f64 {
    for wanted in types {
        if let Some(action) = actions.iter().find(|a| a.action_type == *wanted) {
            return action.value.parse::<f64>().unwrap_or(0.0);
        }
    }
    0.0
}

impl MetaCampaign {
    fn into_unified(self) -> UnifiedCampaign {
        let budget = match (&self.daily_budget, &self.lifetime_budget) {
            (Some(daily), _) => Budget::daily(cents_to_amount(daily), "USD"),
            (None, Some(lifetime)) => Budget::lifetime(cents_to_amount(lifetime), "USD"),
            (None, None) => Budget::daily(Decimal::ZERO, "USD"),
        };

        UnifiedCampaign {
            id: UnifiedCampaign::unified_id(PLATFORM, &self.id),
            platform: PLATFORM,
            platform_campaign_id: self.id,
            name: self.name,
            status: map_status(self.status.as_deref()),
            objective: map_objective(self.objective.as_deref()),
            budget,
            targeting: self.targeting.unwrap_or(serde_json::Value::Null),
            start_date: self
                .start_time
                .as_deref()
                .and_then(|s| parse_date(&s[..s.len().min(10)])),
            end_date: self
                .stop_time
                .as_deref()
                .and_then(|s| parse_date(&s[..s.len().min(10)])),
            created_at: parse_datetime(self.created_time.as_deref()),
            updated_at: parse_datetime(self.updated_time.as_deref()),
        }
    }
}

impl MetaInsight {
    fn into_unified(self, fallback_campaign_id: &str) -> Option<UnifiedMetrics> {
        let native_id = self
            .campaign_id
            .clone()
            .unwrap_or_else(|| fallback_campaign_id.to_string());
        let date = parse_date(&self.date_start)?;
        let spend = self
            .spend
            .as_deref()
            .and_then(|s| s.parse::<Decimal>().ok())
            .unwrap_or_default();
        let revenue = Decimal::try_from(action_value(&self.action_values, CONVERSION_ACTIONS))
            .unwrap_or_default();

        Some(UnifiedMetrics {
            campaign_id: UnifiedCampaign::unified_id(PLATFORM, &native_id),
            platform: PLATFORM,
            date,
            impressions: parse_count(self.impressions.as_deref()),
            clicks: parse_count(self.clicks.as_deref()),
            conversions: action_value(&self.actions, CONVERSION_ACTIONS),
            spend,
            revenue,
            currency: "USD".to_string(),
        })
    }
}

fn parse_count(raw: Option<&str>) -> u64 {
    raw.and_then(|s| s.parse::<u64>().ok()).unwrap_or(0)
}

// ============================================================================
// Adapter implementation
// ============================================================================

impl MetaAdsAdapter {
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

        let mut query: Vec<(&str, String)> = params.to_vec();
        query.push(("access_token", token.to_string()));

        debug!("Meta Ads request: {}/{}", BASE_URL, path);

        let response = self
            .client
            .get(format!("{}/{}", BASE_URL, path))
            .query(&query)
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
            let message = serde_json::from_str::<GraphErrorBody>(&body)
                .ok()
                .and_then(|b| b.error)
                .and_then(GraphError::describe)
                .unwrap_or_else(|| format!("HTTP {}", status));
            return Err(PlatformError::Api {
                platform: PLATFORM,
                message,
                suggestions: vec![
                    "Verify the access token has the ads_read permission".to_string(),
                    "Confirm the ad account id is prefixed correctly".to_string(),
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

    fn time_increment(granularity: MetricsGranularity) -> String {
        match granularity {
            MetricsGranularity::Daily => "1".to_string(),
            MetricsGranularity::Weekly => "7".to_string(),
            MetricsGranularity::Monthly => "monthly".to_string(),
        }
    }
}

#[async_trait]
impl PlatformAdapter for MetaAdsAdapter {
    fn platform(&self) -> Platform {
        PLATFORM
    }

    fn required_credentials(&self) -> &'static [&'static str] {
        REQUIRED_CREDENTIALS
    }

    fn rate_limit(&self) -> RateLimit {
        RateLimit {
            requests_per_hour: 200,
            min_delay: Duration::ZERO,
        }
    }

    async fn authenticate(
        &self,
        credentials: &PlatformCredentials,
    ) -> Result<bool, PlatformError> {
        match self
            .fetch(credentials, "me", &[("fields", "id,name".to_string())])
            .await
        {
            Ok(body) => {
                let me: MeResponse = Self::parse_body(&body)?;
                Ok(me.id.is_some())
            }
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
        let account_id = credentials.require("ad_account_id").ok_or_else(|| {
            PlatformError::InvalidCredentials {
                platform: PLATFORM,
                missing: vec!["ad_account_id".to_string()],
            }
        })?;

        let path = format!("act_{}/campaigns", account_id);
        let fields = "id,name,status,objective,daily_budget,lifetime_budget,\
                      start_time,stop_time,targeting,created_time,updated_time";
        let body = self
            .fetch(
                credentials,
                &path,
                &[
                    ("fields", fields.to_string()),
                    ("limit", limit.to_string()),
                    ("offset", offset.to_string()),
                ],
            )
            .await?;

        let page: PagedResponse<MetaCampaign> = Self::parse_body(&body)?;
        let campaigns: Vec<UnifiedCampaign> =
            page.data.into_iter().map(MetaCampaign::into_unified).collect();

        debug!("Meta Ads: fetched {} campaigns", campaigns.len());
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
        let path = format!("{}/insights", native_id);
        let fields = "campaign_id,date_start,impressions,clicks,spend,actions,action_values";
        let time_range = format!("{{\"since\":\"{}\",\"until\":\"{}\"}}", start, end);

        let body = self
            .fetch(
                credentials,
                &path,
                &[
                    ("fields", fields.to_string()),
                    ("time_range", time_range),
                    ("time_increment", Self::time_increment(granularity)),
                    ("level", "campaign".to_string()),
                ],
            )
            .await?;

        let page: PagedResponse<MetaInsight> = Self::parse_body(&body)?;
        Ok(page
            .data
            .into_iter()
            .filter_map(|insight| insight.into_unified(native_id))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_status_mapping() {
        assert_eq!(map_status(Some("ACTIVE")), CampaignStatus::Active);
        assert_eq!(map_status(Some("WITH_ISSUES")), CampaignStatus::Paused);
        assert_eq!(map_status(Some("ARCHIVED")), CampaignStatus::Completed);
        assert_eq!(map_status(Some("IN_PROCESS")), CampaignStatus::Draft);
        assert_eq!(map_status(None), CampaignStatus::Draft);
    }

    #[test]
    fn test_cents_to_amount() {
        assert_eq!(cents_to_amount("5000"), dec!(50));
        assert_eq!(cents_to_amount("123"), dec!(1.23));
        assert_eq!(cents_to_amount("garbage"), dec!(0));
    }

    #[test]
    fn test_campaign_normalization() {
        let json = r#"{
            "id": "2384757",
            "name": "Summer Launch",
            "status": "ACTIVE",
            "objective": "CONVERSIONS",
            "daily_budget": "2500",
            "start_time": "2025-05-01T00:00:00+0000",
            "targeting": {"geo_locations": {"countries": ["US"]}},
            "created_time": "2025-04-20T09:30:00+0000",
            "updated_time": "2025-05-02T16:00:00+0000"
        }"#;

        let campaign: MetaCampaign = serde_json::from_str(json).unwrap();
        let unified = campaign.into_unified();

        assert_eq!(unified.id, "meta_ads_2384757");
        assert_eq!(unified.platform_campaign_id, "2384757");
        assert_eq!(unified.status, CampaignStatus::Active);
        assert_eq!(unified.objective, CampaignObjective::Sales);
        assert_eq!(unified.budget.amount, dec!(25));
        assert_eq!(unified.start_date, NaiveDate::from_ymd_opt(2025, 5, 1));
        assert!(unified.targeting.get("geo_locations").is_some());
    }

    #[test]
    fn test_insight_normalization_extracts_conversions_from_actions() {
        let json = r#"{
            "campaign_id": "2384757",
            "date_start": "2025-06-01",
            "impressions": "10000",
            "clicks": "250",
            "spend": "125.50",
            "actions": [
                {"action_type": "link_click", "value": "250"},
                {"action_type": "lead", "value": "12"}
            ]
        }"#;

        let insight: MetaInsight = serde_json::from_str(json).unwrap();
        let metrics = insight.into_unified("2384757").unwrap();

        assert_eq!(metrics.campaign_id, "meta_ads_2384757");
        assert_eq!(metrics.impressions, 10_000);
        assert_eq!(metrics.clicks, 250);
        assert_eq!(metrics.conversions, 12.0);
        assert_eq!(metrics.spend, dec!(125.50));
        assert_eq!(metrics.revenue, dec!(0));
    }

    #[test]
    fn test_insight_with_no_activity_yields_zeroes() {
        let json = r#"{"date_start": "2025-06-01"}"#;
        let insight: MetaInsight = serde_json::from_str(json).unwrap();
        let metrics = insight.into_unified("99").unwrap();

        assert_eq!(metrics.impressions, 0);
        assert_eq!(metrics.clicks, 0);
        assert_eq!(metrics.conversions, 0.0);
        let derived = metrics.derived();
        assert_eq!(derived.ctr, 0.0);
        assert_eq!(derived.cpc, 0.0);
    }

    #[test]
    fn test_validate_credentials_shape_only() {
        let adapter = MetaAdsAdapter::new(Client::new());
        let complete = PlatformCredentials::new()
            .with("access_token", "tok")
            .with("app_id", "1")
            .with("app_secret", "s")
            .with("ad_account_id", "123");
        assert!(adapter.validate_credentials(&complete));

        let partial = PlatformCredentials::new().with("access_token", "tok");
        assert!(!adapter.validate_credentials(&partial));
    }

    #[test]
    fn test_time_increment() {
        assert_eq!(MetaAdsAdapter::time_increment(MetricsGranularity::Daily), "1");
        assert_eq!(MetaAdsAdapter::time_increment(MetricsGranularity::Weekly), "7");
        assert_eq!(
            MetaAdsAdapter::time_increment(MetricsGranularity::Monthly),
            "monthly"
        );
    }

    #[test]
    fn test_graph_error_carries_code_into_message() {
        let body: GraphErrorBody = serde_json::from_str(
            r#"{"error":{"message":"Invalid OAuth access token","code":190}}"#,
        )
        .unwrap();
        assert_eq!(
            body.error.unwrap().describe().as_deref(),
            Some("Invalid OAuth access token (code 190)")
        );

        let no_code: GraphErrorBody =
            serde_json::from_str(r#"{"error":{"message":"Unknown error"}}"#).unwrap();
        assert_eq!(
            no_code.error.unwrap().describe().as_deref(),
            Some("Unknown error")
        );
    }
}
