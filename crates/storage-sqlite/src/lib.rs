//! SQLite storage implementation for AdSync.
//!
//! This crate is the only place in the application where Diesel dependencies
//! exist. It implements the repository traits defined in `adsync-core` and
//! contains:
//! - Database connection pooling and management
//! - Diesel migrations
//! - Repository implementations for campaigns, connections and AI usage
//! - Database-specific model types (with Diesel derives)

pub mod db;
pub mod errors;
pub mod schema;
pub mod utils;

// Repository implementations
pub mod campaigns;
pub mod connections;
pub mod usage;

pub use campaigns::CampaignRepository;
pub use connections::ConnectionRepository;
pub use usage::UsageRepository;

pub use db::{create_pool, get_connection, run_migrations, DbConnection, DbPool};
pub use errors::{IntoCore, StorageError};

// Re-export from adsync-core for convenience
pub use adsync_core::errors::{DatabaseError, Error, Result};
