//! Background scheduler for periodic campaign sync.
//!
//! Runs a fixed 4-hour interval sync across every user with an active
//! platform connection.

use std::sync::Arc;
use tokio::time::{interval, Duration};
use tracing::{info, warn};

use crate::main_lib::AppState;

/// Sync interval: 4 hours (not user-configurable to prevent API abuse)
const SYNC_INTERVAL_SECS: u64 = 4 * 60 * 60;

/// Initial delay before first sync (60 seconds to let server fully start)
const INITIAL_DELAY_SECS: u64 = 60;

/// Starts the background campaign sync scheduler.
pub fn start_sync_scheduler(state: Arc<AppState>) {
    tokio::spawn(async move {
        info!("Campaign sync scheduler started (4-hour interval)");

        tokio::time::sleep(Duration::from_secs(INITIAL_DELAY_SECS)).await;

        // First tick is immediate, subsequent ticks are 4h apart
        let mut sync_interval = interval(Duration::from_secs(SYNC_INTERVAL_SECS));

        loop {
            sync_interval.tick().await;
            run_scheduled_sync(&state).await;
        }
    });
}

/// Runs one scheduled sync pass over all users with active connections.
async fn run_scheduled_sync(state: &Arc<AppState>) {
    let user_ids = match state.connection_repository.list_user_ids() {
        Ok(ids) => ids,
        Err(e) => {
            warn!("Scheduled sync skipped: could not list users: {}", e);
            return;
        }
    };

    if user_ids.is_empty() {
        info!("Scheduled sync skipped: no active connections");
        return;
    }

    info!("Running scheduled campaign sync for {} users", user_ids.len());

    for user_id in user_ids {
        match state.sync_service.sync_user_platforms(&user_id).await {
            Ok(report) => {
                let synced: u32 = report.values().map(|s| s.synced).sum();
                let errors: usize = report.values().map(|s| s.errors.len()).sum();
                if errors > 0 {
                    warn!(
                        "Scheduled sync for user {}: {} campaigns synced, {} errors",
                        user_id, synced, errors
                    );
                } else {
                    info!(
                        "Scheduled sync for user {}: {} campaigns synced",
                        user_id, synced
                    );
                }
            }
            Err(e) => {
                warn!("Scheduled sync failed for user {}: {}", user_id, e);
            }
        }
    }
}
