pub mod model;
pub mod repository;

pub use model::PlatformConnectionDB;
pub use repository::ConnectionRepository;
