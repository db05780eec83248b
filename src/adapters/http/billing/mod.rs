//! HTTP surface for the billing sync module.

mod dto;
mod handlers;
mod routes;

pub use handlers::BillingAppState;
pub use routes::billing_router;
