use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use rust_decimal::Decimal;
use serde::Deserialize;

use adsync_core::limits::{RateLimitDecision, UsageStats};

use crate::error::{ApiJson, ApiResult};
use crate::main_lib::AppState;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CheckQuery {
    user_id: String,
    tier: String,
    /// Projected cost of the request being checked, in USD.
    #[serde(default)]
    estimated_cost: Decimal,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct UserQuery {
    user_id: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RecordUsageRequest {
    user_id: String,
    feature: String,
    cost: Decimal,
}

/// Advisory check; it reserves nothing. The decision can go stale between
/// this call and the usage it gates.
async fn check_limits(
    State(state): State<Arc<AppState>>,
    Query(query): Query<CheckQuery>,
) -> ApiResult<ApiJson<RateLimitDecision>> {
    let decision = state
        .usage_limit_service
        .check_rate_limit(&query.user_id, &query.tier, query.estimated_cost)?;
    Ok(ApiJson(decision))
}

async fn get_usage_stats(
    State(state): State<Arc<AppState>>,
    Query(query): Query<UserQuery>,
) -> ApiResult<ApiJson<UsageStats>> {
    let stats = state.usage_limit_service.usage_stats(&query.user_id)?;
    Ok(ApiJson(stats))
}

async fn record_usage(
    State(state): State<Arc<AppState>>,
    Json(body): Json<RecordUsageRequest>,
) -> ApiResult<StatusCode> {
    state
        .usage_limit_service
        .record_usage(&body.user_id, &body.feature, body.cost)
        .await?;
    Ok(StatusCode::CREATED)
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/usage/check", get(check_limits))
        .route("/usage/stats", get(get_usage_stats))
        .route("/usage", post(record_usage))
}
