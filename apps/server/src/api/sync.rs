use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    routing::post,
    Router,
};
use serde::Deserialize;

use adsync_core::sync::{CampaignSyncSummary, UserSyncReport};
use adsync_platforms::Platform;

use crate::error::{ApiJson, ApiResult};
use crate::main_lib::AppState;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct UserQuery {
    user_id: String,
}

/// Syncs every active connection for the user, one platform at a time.
async fn sync_all(
    State(state): State<Arc<AppState>>,
    Query(query): Query<UserQuery>,
) -> ApiResult<ApiJson<UserSyncReport>> {
    let report = state.sync_service.sync_user_platforms(&query.user_id).await?;
    Ok(ApiJson(report))
}

async fn sync_platform(
    Path(platform): Path<Platform>,
    State(state): State<Arc<AppState>>,
    Query(query): Query<UserQuery>,
) -> ApiResult<ApiJson<CampaignSyncSummary>> {
    let summary = state
        .sync_service
        .sync_platform_campaigns(&query.user_id, platform)
        .await?;
    Ok(ApiJson(summary))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/sync", post(sync_all))
        .route("/sync/{platform}", post(sync_platform))
}
