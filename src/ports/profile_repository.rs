//! Port for the profile store.

use async_trait::async_trait;

use crate::domain::billing::{Profile, SubscriptionMirror};
use crate::domain::foundation::{DomainError, UserId};

/// Whether a mirror write found a profile row to update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MirrorOutcome {
    /// The profile row was updated.
    Applied,
    /// No profile row exists for the user; nothing was written.
    ProfileMissing,
}

/// A profile eligible for the bulk sync path: it has a vendor customer id.
#[derive(Debug, Clone)]
pub struct BillableProfile {
    pub user_id: UserId,
    pub stripe_customer_id: String,
}

/// Persistence boundary for user profiles.
#[async_trait]
pub trait ProfileRepository: Send + Sync {
    /// Copies the subscription mirror onto the user's profile row.
    ///
    /// When `customer_id` is given it is backfilled onto the profile in the
    /// same write. A missing profile is reported through the outcome, not
    /// as an error, so callers can decide whether it is fatal.
    async fn apply_mirror(
        &self,
        user_id: &UserId,
        mirror: &SubscriptionMirror,
        customer_id: Option<&str>,
    ) -> Result<MirrorOutcome, DomainError>;

    async fn find_by_id(&self, user_id: &UserId) -> Result<Option<Profile>, DomainError>;

    /// All profiles carrying a vendor customer id.
    async fn list_billable(&self) -> Result<Vec<BillableProfile>, DomainError>;
}
