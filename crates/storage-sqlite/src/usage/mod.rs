pub mod model;
pub mod repository;

pub use model::UsageRecordDB;
pub use repository::UsageRepository;
