//! Port for the payment provider API.

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::billing::{VendorCustomer, VendorSubscription};

/// Errors from the payment provider API.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// Request never completed (connect failure, timeout).
    #[error("network error calling payment provider: {0}")]
    Network(String),

    /// The provider rejected our credentials.
    #[error("payment provider authentication failed: {0}")]
    Authentication(String),

    /// The provider answered with a non-success status.
    #[error("payment provider API error (status {status}): {message}")]
    Api { status: u16, message: String },

    /// The response body did not match the expected shape.
    #[error("failed to decode payment provider response: {0}")]
    Decode(String),
}

impl From<GatewayError> for crate::domain::billing::SyncError {
    fn from(err: GatewayError) -> Self {
        crate::domain::billing::SyncError::Gateway(err.to_string())
    }
}

/// Read-side boundary to the payment provider.
///
/// Only the lookups the sync paths need; no write operations. Handlers
/// take this as `Arc<dyn StripeGateway>` so tests can substitute stubs.
#[async_trait]
pub trait StripeGateway: Send + Sync {
    /// Lists subscriptions across all customers, newest first, up to `limit`.
    async fn list_subscriptions(&self, limit: u32)
        -> Result<Vec<VendorSubscription>, GatewayError>;

    /// Lists a customer's subscriptions in any status, newest first.
    async fn list_subscriptions_for_customer(
        &self,
        customer_id: &str,
        limit: u32,
    ) -> Result<Vec<VendorSubscription>, GatewayError>;

    /// Fetches one subscription; `None` when the provider does not know it.
    async fn get_subscription(
        &self,
        subscription_id: &str,
    ) -> Result<Option<VendorSubscription>, GatewayError>;

    /// Fetches one customer; `None` for unknown or deleted customers.
    async fn get_customer(&self, customer_id: &str)
        -> Result<Option<VendorCustomer>, GatewayError>;
}
