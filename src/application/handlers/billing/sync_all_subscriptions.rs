//! SyncAllSubscriptionsHandler - bulk repair across every billable profile.

use std::sync::Arc;

use tracing::{info, warn};

use crate::domain::billing::SyncError;
use crate::ports::{ProfileRepository, StripeGateway};

use super::project_subscription::ProjectSubscriptionHandler;

/// Accounting for a bulk sync run.
#[derive(Debug, Clone, Default)]
pub struct SyncAllOutcome {
    pub synced: u32,
    pub failed: u32,
}

/// Iterates profiles that carry a vendor customer id and re-projects each
/// customer's newest subscription. Per-profile failures are logged and
/// counted; the run always completes.
pub struct SyncAllSubscriptionsHandler {
    profiles: Arc<dyn ProfileRepository>,
    gateway: Arc<dyn StripeGateway>,
    project: Arc<ProjectSubscriptionHandler>,
}

impl SyncAllSubscriptionsHandler {
    pub fn new(
        profiles: Arc<dyn ProfileRepository>,
        gateway: Arc<dyn StripeGateway>,
        project: Arc<ProjectSubscriptionHandler>,
    ) -> Self {
        Self {
            profiles,
            gateway,
            project,
        }
    }

    pub async fn handle(&self) -> Result<SyncAllOutcome, SyncError> {
        let billable = self.profiles.list_billable().await?;

        let mut outcome = SyncAllOutcome::default();

        for profile in &billable {
            match self.sync_one(profile).await {
                Ok(()) => outcome.synced += 1,
                Err(err) => {
                    warn!(
                        user_id = %profile.user_id,
                        customer_id = %profile.stripe_customer_id,
                        error = %err,
                        "bulk sync failed for profile"
                    );
                    outcome.failed += 1;
                }
            }
        }

        info!(
            synced = outcome.synced,
            failed = outcome.failed,
            total = billable.len(),
            "bulk subscription sync complete"
        );

        Ok(outcome)
    }

    async fn sync_one(&self, profile: &crate::ports::BillableProfile) -> Result<(), SyncError> {
        let mut subscriptions = self
            .gateway
            .list_subscriptions_for_customer(&profile.stripe_customer_id, 10)
            .await?;

        subscriptions.sort_by_key(|s| std::cmp::Reverse(s.created));
        let newest = subscriptions
            .into_iter()
            .next()
            .ok_or(SyncError::NoSubscriptionFound)?;

        self.project
            .project_for_owner(&newest, &profile.user_id, false)
            .await?;

        Ok(())
    }
}
