//! Stripe API adapter.

mod gateway;

pub use gateway::{StripeConfig, StripeGatewayAdapter};
