pub mod sync_model;
pub mod sync_service;
pub mod sync_traits;

pub use sync_model::{CampaignSyncSummary, UserSyncReport};
pub use sync_service::SyncService;
pub use sync_traits::{AdapterProviderTrait, SyncServiceTrait};
