//! Billing synchronization handlers.
//!
//! Every write path (webhook, sweep, on-demand sync) funnels through
//! `ProjectSubscriptionHandler`, so owner resolution and the two-write
//! subscription-plus-mirror sequence behave identically everywhere.

mod get_trial_window;
#[cfg(test)]
pub(crate) mod testing;
mod owner_resolver;
mod process_webhook;
mod project_subscription;
mod sweep_subscriptions;
mod sync_all_subscriptions;
mod sync_user_subscription;

pub use get_trial_window::{GetTrialWindowHandler, TrialWindow};
pub use owner_resolver::OwnerResolver;
pub use process_webhook::{ProcessWebhookCommand, ProcessWebhookHandler, WebhookOutcome};
pub use project_subscription::{ProjectOutcome, ProjectSubscriptionHandler};
pub use sweep_subscriptions::{SweepError, SweepSubscriptionsHandler, SweepSummary};
pub use sync_all_subscriptions::{SyncAllOutcome, SyncAllSubscriptionsHandler};
pub use sync_user_subscription::SyncUserSubscriptionHandler;
