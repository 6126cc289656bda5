//! Unified, platform-agnostic campaign and metrics models.
//!
//! All adapters normalize their vendor's payloads into these types at the
//! adapter boundary, so vendor schema drift never leaks past this crate.

mod campaign;
mod credentials;
mod metrics;
mod platform;

pub use campaign::{Budget, BudgetKind, CampaignObjective, CampaignStatus, UnifiedCampaign};
pub use credentials::PlatformCredentials;
pub use metrics::{DerivedMetrics, MetricsGranularity, UnifiedMetrics};
pub use platform::Platform;
