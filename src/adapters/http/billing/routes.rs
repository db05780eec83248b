//! Axum router configuration for the billing sync endpoints.

use axum::{
    routing::{get, post},
    Router,
};

use super::handlers::{
    get_trial_window, handle_stripe_webhook, run_subscription_sweep, sync_all_subscriptions,
    sync_user_subscription, BillingAppState,
};

/// Create the billing module router, intended to be nested at `/api`.
///
/// # Routes
///
/// ## Webhook Endpoints (no session auth, signature verified)
/// - `POST /webhooks/stripe` - payment vendor webhook deliveries
/// - `POST /webhooks` - legacy webhook path, same handler
///
/// ## Reconciliation Endpoints
/// - `GET /cron/sync-subscriptions` - scheduled sweep (bearer cron secret)
/// - `GET /sync-subscription` - repair the signed-in user's subscription
/// - `POST /sync-subscriptions` - bulk repair across billable profiles
///
/// ## Read Endpoints
/// - `GET /subscriptions/trial` - trial window for a user
pub fn billing_router() -> Router<BillingAppState> {
    Router::new()
        .route("/webhooks/stripe", post(handle_stripe_webhook))
        .route("/webhooks", post(handle_stripe_webhook))
        .route("/cron/sync-subscriptions", get(run_subscription_sweep))
        .route("/sync-subscription", get(sync_user_subscription))
        .route("/sync-subscriptions", post(sync_all_subscriptions))
        .route("/subscriptions/trial", get(get_trial_window))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use secrecy::SecretString;

    use crate::application::handlers::billing::testing::{
        InMemoryCatalog, InMemoryProfiles, InMemorySubscriptions, StubGateway,
    };
    use crate::application::handlers::billing::{
        GetTrialWindowHandler, OwnerResolver, ProcessWebhookHandler, ProjectSubscriptionHandler,
        SweepSubscriptionsHandler, SyncAllSubscriptionsHandler, SyncUserSubscriptionHandler,
    };
    use crate::domain::billing::StripeWebhookVerifier;

    use super::*;

    fn test_state() -> BillingAppState {
        let subscriptions = Arc::new(InMemorySubscriptions::default());
        let profiles = Arc::new(InMemoryProfiles::default());
        let catalog = Arc::new(InMemoryCatalog::default());
        let gateway = Arc::new(StubGateway::default());

        let project = Arc::new(ProjectSubscriptionHandler::new(
            subscriptions.clone(),
            profiles.clone(),
            OwnerResolver::new(gateway.clone()),
        ));

        BillingAppState {
            webhook_handler: Arc::new(ProcessWebhookHandler::new(
                StripeWebhookVerifier::new("whsec_test"),
                project.clone(),
                catalog,
                gateway.clone(),
                false,
            )),
            sweep_handler: Arc::new(SweepSubscriptionsHandler::new(
                gateway.clone(),
                project.clone(),
                100,
            )),
            sync_user_handler: Arc::new(SyncUserSubscriptionHandler::new(
                subscriptions.clone(),
                profiles.clone(),
                gateway.clone(),
                project.clone(),
            )),
            sync_all_handler: Arc::new(SyncAllSubscriptionsHandler::new(
                profiles,
                gateway,
                project,
            )),
            trial_handler: Arc::new(GetTrialWindowHandler::new(subscriptions)),
            cron_secret: SecretString::new("cron_test_secret".to_string()),
        }
    }

    #[test]
    fn billing_router_creates_router() {
        let router = billing_router();
        let _: Router<()> = router.with_state(test_state());
    }
}
