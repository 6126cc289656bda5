use std::sync::Arc;

use axum::{routing::get, Router};
use serde::Serialize;

use crate::error::{ApiJson, ApiResult};
use crate::main_lib::AppState;

#[derive(Serialize)]
struct HealthStatus {
    status: &'static str,
    version: &'static str,
}

async fn get_health() -> ApiResult<ApiJson<HealthStatus>> {
    Ok(ApiJson(HealthStatus {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    }))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/health", get(get_health))
}
