pub mod connections_model;
pub mod connections_traits;

pub use connections_model::{
    NewPlatformConnection, PlatformConnection, SaveConnectionOutcome, SyncStatus,
};
pub use connections_traits::ConnectionRepositoryTrait;
