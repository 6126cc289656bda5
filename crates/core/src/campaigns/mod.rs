pub mod campaigns_model;
pub mod campaigns_traits;

pub use campaigns_model::{Campaign, CampaignUpsert, CampaignView, MetricsSnapshot};
pub use campaigns_traits::CampaignRepositoryTrait;
