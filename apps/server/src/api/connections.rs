use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{delete, get},
    Json, Router,
};
use serde::Deserialize;

use adsync_core::connections::{NewPlatformConnection, PlatformConnection, SaveConnectionOutcome};
use adsync_platforms::{Platform, PlatformCredentials};

use crate::error::{ApiJson, ApiResult};
use crate::main_lib::AppState;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct UserQuery {
    user_id: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SaveConnectionRequest {
    user_id: String,
    platform: Platform,
    credentials: PlatformCredentials,
    account_name: Option<String>,
}

async fn get_connections(
    State(state): State<Arc<AppState>>,
    Query(query): Query<UserQuery>,
) -> ApiResult<ApiJson<Vec<PlatformConnection>>> {
    let connections = state
        .connection_repository
        .get_all_connections(&query.user_id)?;
    Ok(ApiJson(connections))
}

/// Validates the credential shape, authenticates against the vendor, stores
/// the connection and runs one immediate campaign sync.
async fn save_connection(
    State(state): State<Arc<AppState>>,
    Json(body): Json<SaveConnectionRequest>,
) -> ApiResult<ApiJson<SaveConnectionOutcome>> {
    let outcome = state
        .sync_service
        .save_platform_connection(NewPlatformConnection {
            user_id: body.user_id,
            platform: body.platform,
            credentials: body.credentials,
            account_name: body.account_name,
        })
        .await?;
    Ok(ApiJson(outcome))
}

async fn revoke_connection(
    Path(platform): Path<Platform>,
    State(state): State<Arc<AppState>>,
    Query(query): Query<UserQuery>,
) -> ApiResult<StatusCode> {
    state
        .sync_service
        .revoke_connection(&query.user_id, platform)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/connections", get(get_connections).post(save_connection))
        .route("/connections/{platform}", delete(revoke_connection))
}
