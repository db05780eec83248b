//! Port for the subscription store.

use async_trait::async_trait;

use crate::domain::billing::SubscriptionRecord;
use crate::domain::foundation::{DomainError, UserId};

/// Persistence boundary for mirrored subscriptions.
#[async_trait]
pub trait SubscriptionRepository: Send + Sync {
    /// Inserts or fully replaces the subscription row keyed by vendor id.
    ///
    /// Upsert semantics: every column is overwritten from the record, so
    /// replaying an older projection after a newer one restores the older
    /// state (last write wins, no version checks).
    async fn upsert(&self, record: &SubscriptionRecord) -> Result<(), DomainError>;

    /// Most recently created subscription for a user, if any.
    async fn find_latest_by_user(
        &self,
        user_id: &UserId,
    ) -> Result<Option<SubscriptionRecord>, DomainError>;
}
