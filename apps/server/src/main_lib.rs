use std::sync::Arc;

use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

use adsync_core::campaigns::CampaignRepositoryTrait;
use adsync_core::connections::ConnectionRepositoryTrait;
use adsync_core::limits::{UsageLimitService, UsageLimitServiceTrait};
use adsync_core::sync::{AdapterProviderTrait, SyncService, SyncServiceTrait};
use adsync_platforms::AdapterRegistry;
use adsync_storage_sqlite::{
    create_pool, run_migrations, CampaignRepository, ConnectionRepository, UsageRepository,
};

use crate::config::Config;

pub struct AppState {
    pub sync_service: Arc<dyn SyncServiceTrait>,
    pub usage_limit_service: Arc<dyn UsageLimitServiceTrait>,
    pub campaign_repository: Arc<dyn CampaignRepositoryTrait>,
    pub connection_repository: Arc<dyn ConnectionRepositoryTrait>,
}

pub fn init_tracing() {
    let log_format = std::env::var("ADSYNC_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);

    if log_format.eq_ignore_ascii_case("json") {
        registry
            .with(fmt::layer().json().with_current_span(false))
            .init();
    } else {
        registry
            .with(fmt::layer().with_target(true).with_line_number(true))
            .init();
    }
}

pub async fn build_state(config: &Config) -> anyhow::Result<Arc<AppState>> {
    let pool = create_pool(&config.db_path)?;
    run_migrations(&pool)?;
    tracing::info!("Database path in use: {}", config.db_path);

    let campaign_repository: Arc<dyn CampaignRepositoryTrait> =
        Arc::new(CampaignRepository::new(pool.clone()));
    let connection_repository: Arc<dyn ConnectionRepositoryTrait> =
        Arc::new(ConnectionRepository::new(pool.clone()));
    let usage_repository = Arc::new(UsageRepository::new(pool.clone()));

    let adapters: Arc<dyn AdapterProviderTrait> = Arc::new(AdapterRegistry::new());

    let sync_service: Arc<dyn SyncServiceTrait> = Arc::new(SyncService::new(
        adapters,
        campaign_repository.clone(),
        connection_repository.clone(),
    ));
    let usage_limit_service: Arc<dyn UsageLimitServiceTrait> =
        Arc::new(UsageLimitService::new(usage_repository));

    Ok(Arc::new(AppState {
        sync_service,
        usage_limit_service,
        campaign_repository,
        connection_repository,
    }))
}
