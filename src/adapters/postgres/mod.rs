//! PostgreSQL adapters for the persistence ports.

mod catalog_repository;
mod profile_repository;
mod subscription_repository;

pub use catalog_repository::PostgresCatalogRepository;
pub use profile_repository::PostgresProfileRepository;
pub use subscription_repository::PostgresSubscriptionRepository;
