//! Ad platform adapters behind a unified schema.
//!
//! Each supported platform (Meta, Google, LinkedIn, Pinterest) implements
//! [`PlatformAdapter`], translating vendor payloads into [`UnifiedCampaign`]
//! and [`UnifiedMetrics`]. The [`AdapterRegistry`] hands out one shared
//! adapter per platform.

pub mod adapter;
pub mod errors;
pub mod models;
pub mod registry;

pub use adapter::{PlatformAdapter, RateLimit};
pub use errors::PlatformError;
pub use models::{
    Budget, BudgetKind, CampaignObjective, CampaignStatus, DerivedMetrics, MetricsGranularity,
    Platform, PlatformCredentials, UnifiedCampaign, UnifiedMetrics,
};
pub use registry::AdapterRegistry;
