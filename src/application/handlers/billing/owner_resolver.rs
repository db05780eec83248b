//! OwnerResolver - maps a vendor subscription to its application user.

use std::sync::Arc;

use crate::domain::billing::{SyncError, VendorSubscription};
use crate::domain::foundation::UserId;
use crate::ports::StripeGateway;

/// Resolves which application user owns a vendor subscription.
///
/// Resolution order: the `user_id` key in subscription metadata, then the
/// same key on the subscription's customer. Subscription metadata wins so
/// the common case needs no vendor round-trip.
pub struct OwnerResolver {
    gateway: Arc<dyn StripeGateway>,
}

impl OwnerResolver {
    pub fn new(gateway: Arc<dyn StripeGateway>) -> Self {
        Self { gateway }
    }

    /// Resolves the owner, or `None` when neither side carries a mapping.
    ///
    /// # Errors
    ///
    /// Returns `SyncError::Gateway` when the customer lookup fails. A
    /// deleted or unknown customer is not an error; it resolves to `None`.
    pub async fn resolve(
        &self,
        subscription: &VendorSubscription,
    ) -> Result<Option<UserId>, SyncError> {
        if let Some(owner) = subscription.owner_metadata() {
            return Ok(parse_owner(owner));
        }

        let customer = self.gateway.get_customer(&subscription.customer).await?;

        Ok(customer
            .as_ref()
            .filter(|c| !c.deleted)
            .and_then(|c| c.owner_metadata())
            .and_then(parse_owner))
    }
}

fn parse_owner(raw: &str) -> Option<UserId> {
    UserId::new(raw).ok()
}
