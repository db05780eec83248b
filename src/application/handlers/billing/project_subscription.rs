//! ProjectSubscriptionHandler - the single write path for subscription state.

use std::sync::Arc;

use tracing::warn;

use crate::domain::billing::{
    project_subscription, SubscriptionProjection, SubscriptionStatus, SyncError,
    VendorSubscription,
};
use crate::domain::foundation::UserId;
use crate::ports::{MirrorOutcome, ProfileRepository, SubscriptionRepository};

use super::owner_resolver::OwnerResolver;

/// Outcome of projecting one vendor subscription.
#[derive(Debug, Clone)]
pub enum ProjectOutcome {
    /// Subscription stored and profile mirror updated.
    Applied {
        user_id: UserId,
        status: SubscriptionStatus,
    },
    /// Subscription stored, but the profile row is missing; the mirror
    /// lags until a later sync finds the profile.
    MirrorPending {
        user_id: UserId,
        status: SubscriptionStatus,
    },
    /// Vendor status has no local representation; nothing written.
    SkippedUnrepresentable { vendor_status: String },
    /// No application user could be resolved; nothing written.
    SkippedUnresolvedOwner { subscription_id: String },
}

/// Projects a vendor subscription into the store and the profile mirror.
///
/// Two sequential writes, not a transaction: the subscription upsert is
/// the durable source of local truth and commits first; the profile mirror
/// follows. A mirror failure leaves the mirror stale until the next event
/// or sweep, which is reported but does not roll back the upsert.
pub struct ProjectSubscriptionHandler {
    subscriptions: Arc<dyn SubscriptionRepository>,
    profiles: Arc<dyn ProfileRepository>,
    owner_resolver: OwnerResolver,
}

impl ProjectSubscriptionHandler {
    pub fn new(
        subscriptions: Arc<dyn SubscriptionRepository>,
        profiles: Arc<dyn ProfileRepository>,
        owner_resolver: OwnerResolver,
    ) -> Self {
        Self {
            subscriptions,
            profiles,
            owner_resolver,
        }
    }

    /// Resolves the owner, then projects and writes the subscription.
    ///
    /// With `backfill_customer_id` set, the vendor customer id is written
    /// onto the profile alongside the mirror (sweeps use this to repair
    /// profiles that never went through checkout).
    pub async fn handle(
        &self,
        subscription: &VendorSubscription,
        backfill_customer_id: bool,
    ) -> Result<ProjectOutcome, SyncError> {
        let owner = match self.owner_resolver.resolve(subscription).await? {
            Some(owner) => owner,
            None => {
                warn!(
                    subscription_id = %subscription.id,
                    customer_id = %subscription.customer,
                    "no application user resolvable for subscription"
                );
                return Ok(ProjectOutcome::SkippedUnresolvedOwner {
                    subscription_id: subscription.id.clone(),
                });
            }
        };

        self.project_for_owner(subscription, &owner, backfill_customer_id)
            .await
    }

    /// Projects and writes for an already-known owner, skipping resolution.
    pub async fn project_for_owner(
        &self,
        subscription: &VendorSubscription,
        owner: &UserId,
        backfill_customer_id: bool,
    ) -> Result<ProjectOutcome, SyncError> {
        let (record, mirror) = match project_subscription(subscription, owner) {
            SubscriptionProjection::Ready { record, mirror } => (record, mirror),
            SubscriptionProjection::NotRepresentable { vendor_status } => {
                return Ok(ProjectOutcome::SkippedUnrepresentable { vendor_status });
            }
        };

        self.subscriptions.upsert(&record).await?;

        let customer_id = backfill_customer_id.then(|| subscription.customer.as_str());
        let outcome = self
            .profiles
            .apply_mirror(owner, &mirror, customer_id)
            .await?;

        match outcome {
            MirrorOutcome::Applied => Ok(ProjectOutcome::Applied {
                user_id: owner.clone(),
                status: record.status,
            }),
            MirrorOutcome::ProfileMissing => {
                warn!(
                    user_id = %owner,
                    subscription_id = %record.id,
                    "profile row missing, subscription stored without mirror"
                );
                Ok(ProjectOutcome::MirrorPending {
                    user_id: owner.clone(),
                    status: record.status,
                })
            }
        }
    }
}
