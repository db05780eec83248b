//! Ports: trait boundaries between the application core and the outside
//! world. Adapters implement these; handlers depend only on the traits.

mod catalog_repository;
mod profile_repository;
mod stripe_gateway;
mod subscription_repository;

pub use catalog_repository::CatalogRepository;
pub use profile_repository::{BillableProfile, MirrorOutcome, ProfileRepository};
pub use stripe_gateway::{GatewayError, StripeGateway};
pub use subscription_repository::SubscriptionRepository;
