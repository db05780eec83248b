//! SyncUserSubscriptionHandler - on-demand sync for one signed-in user.

use std::sync::Arc;

use tracing::{debug, info};

use crate::domain::billing::{SubscriptionRecord, SyncError};
use crate::domain::foundation::UserId;
use crate::ports::{ProfileRepository, StripeGateway, SubscriptionRepository};

use super::project_subscription::ProjectSubscriptionHandler;

/// Repairs one user's subscription state on demand.
///
/// Lookup order:
/// 1. A stored subscription for the user: re-apply its mirror, covering
///    the case where a webhook wrote the subscription but the profile row
///    did not exist yet.
/// 2. The profile's vendor customer id: fetch the customer's newest
///    subscription from the vendor and project it fresh.
///
/// Neither found: `NoSubscriptionFound`.
pub struct SyncUserSubscriptionHandler {
    subscriptions: Arc<dyn SubscriptionRepository>,
    profiles: Arc<dyn ProfileRepository>,
    gateway: Arc<dyn StripeGateway>,
    project: Arc<ProjectSubscriptionHandler>,
}

impl SyncUserSubscriptionHandler {
    pub fn new(
        subscriptions: Arc<dyn SubscriptionRepository>,
        profiles: Arc<dyn ProfileRepository>,
        gateway: Arc<dyn StripeGateway>,
        project: Arc<ProjectSubscriptionHandler>,
    ) -> Self {
        Self {
            subscriptions,
            profiles,
            gateway,
            project,
        }
    }

    pub async fn handle(&self, user_id: &UserId) -> Result<SubscriptionRecord, SyncError> {
        if let Some(record) = self.subscriptions.find_latest_by_user(user_id).await? {
            debug!(user_id = %user_id, subscription_id = %record.id, "re-applying stored subscription mirror");
            self.profiles
                .apply_mirror(user_id, &record.mirror(), None)
                .await?;
            return Ok(record);
        }

        let profile = self
            .profiles
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| SyncError::ProfileNotFound {
                user_id: user_id.as_str().to_string(),
            })?;

        let customer_id = profile
            .stripe_customer_id
            .ok_or(SyncError::NoSubscriptionFound)?;

        let mut subscriptions = self
            .gateway
            .list_subscriptions_for_customer(&customer_id, 10)
            .await?;

        // Newest first so a canceled-then-resubscribed user gets the
        // current subscription, not the dead one.
        subscriptions.sort_by_key(|s| std::cmp::Reverse(s.created));
        let newest = subscriptions
            .into_iter()
            .next()
            .ok_or(SyncError::NoSubscriptionFound)?;

        info!(user_id = %user_id, subscription_id = %newest.id, "syncing subscription from vendor");
        self.project
            .project_for_owner(&newest, user_id, true)
            .await?;

        self.subscriptions
            .find_latest_by_user(user_id)
            .await?
            .ok_or(SyncError::NoSubscriptionFound)
    }
}
