use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    routing::get,
    Router,
};
use chrono::NaiveDate;
use serde::Deserialize;

use adsync_core::campaigns::CampaignView;
use adsync_core::Error;
use adsync_platforms::{MetricsGranularity, Platform, UnifiedMetrics};

use crate::error::{ApiJson, ApiResult};
use crate::main_lib::AppState;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListQuery {
    user_id: String,
    platform: Option<Platform>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct UserQuery {
    user_id: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct MetricsQuery {
    user_id: String,
    start_date: NaiveDate,
    end_date: NaiveDate,
    granularity: Option<MetricsGranularity>,
}

async fn get_campaigns(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ListQuery>,
) -> ApiResult<ApiJson<Vec<CampaignView>>> {
    let campaigns = match query.platform {
        Some(platform) => state
            .campaign_repository
            .get_campaigns_for_user_platform(&query.user_id, platform)?,
        None => state
            .campaign_repository
            .get_campaigns_for_user(&query.user_id)?,
    };
    Ok(ApiJson(campaigns.into_iter().map(CampaignView::from).collect()))
}

async fn get_campaign(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
    Query(query): Query<UserQuery>,
) -> ApiResult<ApiJson<CampaignView>> {
    let campaign = state.campaign_repository.get_campaign(&id)?;
    if campaign.user_id != query.user_id {
        return Err(Error::NotFound(format!("Campaign {} not found", id)).into());
    }
    Ok(ApiJson(CampaignView::from(campaign)))
}

/// Pulls a fresh metrics series from the vendor and stores the latest row
/// as the campaign's snapshot.
async fn get_campaign_metrics(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
    Query(query): Query<MetricsQuery>,
) -> ApiResult<ApiJson<Vec<UnifiedMetrics>>> {
    let granularity = query.granularity.unwrap_or(MetricsGranularity::Daily);
    let series = state
        .sync_service
        .sync_campaign_metrics(
            &query.user_id,
            &id,
            query.start_date,
            query.end_date,
            granularity,
        )
        .await?;
    Ok(ApiJson(series))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/campaigns", get(get_campaigns))
        .route("/campaigns/{id}", get(get_campaign))
        .route("/campaigns/{id}/metrics", get(get_campaign_metrics))
}
