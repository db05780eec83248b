//! SweepSubscriptionsHandler - scheduled reconciliation against the vendor.

use std::sync::Arc;

use tracing::{error, info};

use crate::domain::billing::SyncError;
use crate::ports::StripeGateway;

use super::project_subscription::{ProjectOutcome, ProjectSubscriptionHandler};

/// Per-item failure captured during a sweep.
#[derive(Debug, Clone)]
pub struct SweepError {
    pub subscription_id: String,
    pub error: String,
}

/// Accounting for one sweep run.
///
/// `processed` counts every subscription examined, `updated` those whose
/// state was written, and `errors` holds the per-item failures. Not
/// representable statuses count as processed but neither updated nor
/// errored.
#[derive(Debug, Clone, Default)]
pub struct SweepSummary {
    pub processed: u32,
    pub updated: u32,
    pub errors: Vec<SweepError>,
}

/// Walks recent vendor subscriptions and re-projects each one.
///
/// Webhooks get lost; the sweep is the safety net that converges local
/// state back to the vendor's. One bad subscription never aborts the run.
pub struct SweepSubscriptionsHandler {
    gateway: Arc<dyn StripeGateway>,
    project: Arc<ProjectSubscriptionHandler>,
    page_size: u32,
}

impl SweepSubscriptionsHandler {
    pub fn new(
        gateway: Arc<dyn StripeGateway>,
        project: Arc<ProjectSubscriptionHandler>,
        page_size: u32,
    ) -> Self {
        Self {
            gateway,
            project,
            page_size,
        }
    }

    /// Runs one sweep.
    ///
    /// # Errors
    ///
    /// Fails only when the vendor listing itself fails; per-item failures
    /// are captured in the summary instead.
    pub async fn handle(&self) -> Result<SweepSummary, SyncError> {
        let subscriptions = self.gateway.list_subscriptions(self.page_size).await?;

        let mut summary = SweepSummary::default();

        for subscription in &subscriptions {
            summary.processed += 1;

            // Sweeps repair profiles that never saw a checkout, so the
            // customer id is backfilled on every write.
            match self.project.handle(subscription, true).await {
                Ok(ProjectOutcome::Applied { .. }) | Ok(ProjectOutcome::MirrorPending { .. }) => {
                    summary.updated += 1;
                }
                Ok(ProjectOutcome::SkippedUnrepresentable { .. }) => {}
                Ok(ProjectOutcome::SkippedUnresolvedOwner { subscription_id }) => {
                    summary.errors.push(SweepError {
                        subscription_id,
                        error: "no application user resolvable".to_string(),
                    });
                }
                Err(err) => {
                    error!(subscription_id = %subscription.id, error = %err, "sweep item failed");
                    summary.errors.push(SweepError {
                        subscription_id: subscription.id.clone(),
                        error: err.to_string(),
                    });
                }
            }
        }

        info!(
            processed = summary.processed,
            updated = summary.updated,
            errors = summary.errors.len(),
            "subscription sweep complete"
        );

        Ok(summary)
    }
}
