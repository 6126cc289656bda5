//! Core services and domain models for the AdSync platform sync layer.
//!
//! Storage is abstracted behind repository traits so the services here can
//! be tested against in-memory mocks and wired to SQLite in production.

pub mod campaigns;
pub mod connections;
pub mod errors;
pub mod limits;
pub mod sync;

pub use errors::{DatabaseError, Error, Result, ValidationError};
