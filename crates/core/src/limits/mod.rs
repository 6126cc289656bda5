pub mod limits_model;
pub mod limits_service;
pub mod limits_traits;

pub use limits_model::{
    RateLimitDecision, RemainingCost, RemainingRequests, SubscriptionTier, TierLimits, UsageRecord,
    UsageStats,
};
pub use limits_service::UsageLimitService;
pub use limits_traits::{UsageLimitServiceTrait, UsageRepositoryTrait};
