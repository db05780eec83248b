//! ProcessWebhookHandler - verifies, classifies, and applies one delivery.

use std::sync::Arc;

use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::domain::billing::{
    project_price, project_product, EventKind, StripeEvent, StripeWebhookVerifier, SyncError,
    VendorCheckoutSession, VendorPrice, VendorProduct, VendorSubscription, WebhookError,
    OWNER_METADATA_KEY,
};
use crate::domain::foundation::UserId;
use crate::ports::{CatalogRepository, StripeGateway};

use super::project_subscription::{ProjectOutcome, ProjectSubscriptionHandler};

/// Command to process one webhook delivery.
#[derive(Debug, Clone)]
pub struct ProcessWebhookCommand {
    /// Raw request body, exactly as received.
    pub payload: Vec<u8>,
    /// Stripe-Signature header value.
    pub signature: String,
}

/// Result of processing a verified delivery.
#[derive(Debug, Clone)]
pub enum WebhookOutcome {
    /// The event was applied to local state.
    Processed,
    /// Event type is outside the allow-list; acknowledged and dropped.
    SkippedIrrelevant,
    /// Event was relevant but could not be applied for a benign reason.
    SkippedSoft(String),
}

/// Handler for incoming payment vendor webhooks.
///
/// Every delivery is verified before its body is trusted. Relevant events
/// funnel into the shared projection path; everything else is acknowledged
/// so the vendor stops redelivering.
pub struct ProcessWebhookHandler {
    verifier: StripeWebhookVerifier,
    project: Arc<ProjectSubscriptionHandler>,
    catalog: Arc<dyn CatalogRepository>,
    gateway: Arc<dyn StripeGateway>,
    require_livemode: bool,
}

/// Minimal shape for deleted catalog objects, which arrive as stubs.
#[derive(Debug, Deserialize)]
struct ObjectId {
    id: String,
}

impl ProcessWebhookHandler {
    pub fn new(
        verifier: StripeWebhookVerifier,
        project: Arc<ProjectSubscriptionHandler>,
        catalog: Arc<dyn CatalogRepository>,
        gateway: Arc<dyn StripeGateway>,
        require_livemode: bool,
    ) -> Self {
        Self {
            verifier,
            project,
            catalog,
            gateway,
            require_livemode,
        }
    }

    pub async fn handle(
        &self,
        cmd: ProcessWebhookCommand,
    ) -> Result<WebhookOutcome, WebhookError> {
        let event = self.verifier.verify_and_parse(&cmd.payload, &cmd.signature)?;

        if self.require_livemode && !event.is_live() {
            warn!(event_id = %event.id, event_type = %event.event_type, "rejecting test mode event");
            return Err(WebhookError::LivemodeRequired);
        }

        let kind = match event.classify() {
            Some(kind) => kind,
            None => {
                debug!(event_id = %event.id, event_type = %event.event_type, "irrelevant event type, dropping");
                return Ok(WebhookOutcome::SkippedIrrelevant);
            }
        };

        info!(event_id = %event.id, event_type = %event.event_type, "processing webhook event");

        match kind {
            EventKind::SubscriptionCreated
            | EventKind::SubscriptionUpdated
            | EventKind::SubscriptionDeleted => self.apply_subscription_event(&event).await,
            EventKind::CheckoutCompleted => self.apply_checkout_completed(&event).await,
            EventKind::ProductCreated | EventKind::ProductUpdated => {
                let product: VendorProduct = parse_object(&event)?;
                self.catalog
                    .upsert_product(&project_product(&product))
                    .await
                    .map_err(downstream)?;
                Ok(WebhookOutcome::Processed)
            }
            EventKind::ProductDeleted => {
                let stub: ObjectId = parse_object(&event)?;
                self.catalog
                    .deactivate_product(&stub.id)
                    .await
                    .map_err(downstream)?;
                Ok(WebhookOutcome::Processed)
            }
            EventKind::PriceCreated | EventKind::PriceUpdated => {
                let price: VendorPrice = parse_object(&event)?;
                match project_price(&price) {
                    Some(record) => {
                        self.catalog
                            .upsert_price(&record)
                            .await
                            .map_err(downstream)?;
                        Ok(WebhookOutcome::Processed)
                    }
                    None => {
                        warn!(price_id = %price.id, price_type = %price.price_type, "unknown pricing type, skipping");
                        Ok(WebhookOutcome::SkippedSoft(format!(
                            "unknown pricing type {}",
                            price.price_type
                        )))
                    }
                }
            }
            EventKind::PriceDeleted => {
                let stub: ObjectId = parse_object(&event)?;
                self.catalog
                    .deactivate_price(&stub.id)
                    .await
                    .map_err(downstream)?;
                Ok(WebhookOutcome::Processed)
            }
        }
    }

    async fn apply_subscription_event(
        &self,
        event: &StripeEvent,
    ) -> Result<WebhookOutcome, WebhookError> {
        let subscription: VendorSubscription = parse_object(event)?;

        match self.project.handle(&subscription, false).await {
            Ok(outcome) => Ok(outcome.into()),
            Err(err) => Err(sync_error_to_webhook(err)),
        }
    }

    /// Checkout completion carries only a subscription reference; the full
    /// object is fetched from the vendor, then projected with the customer
    /// id backfilled onto the profile.
    async fn apply_checkout_completed(
        &self,
        event: &StripeEvent,
    ) -> Result<WebhookOutcome, WebhookError> {
        let session: VendorCheckoutSession = parse_object(event)?;

        let subscription_id = match &session.subscription {
            Some(id) => id,
            None => {
                // One-time payment checkouts have no subscription to sync.
                debug!(session_id = %session.id, "checkout session without subscription, dropping");
                return Ok(WebhookOutcome::SkippedSoft(
                    "checkout session has no subscription".to_string(),
                ));
            }
        };

        let subscription = self
            .gateway
            .get_subscription(subscription_id)
            .await
            .map_err(|e| WebhookError::Downstream(e.to_string()))?;

        let subscription = match subscription {
            Some(subscription) => subscription,
            None => {
                warn!(subscription_id = %subscription_id, "checkout references unknown subscription");
                return Ok(WebhookOutcome::SkippedSoft(format!(
                    "subscription {} not found at vendor",
                    subscription_id
                )));
            }
        };

        // The session metadata may carry the owner when the subscription
        // itself does not (checkout was created with client_reference data).
        let session_owner = session
            .metadata
            .get(OWNER_METADATA_KEY)
            .and_then(|raw| UserId::new(raw).ok());

        let result = match session_owner {
            Some(owner) => {
                self.project
                    .project_for_owner(&subscription, &owner, true)
                    .await
            }
            None => self.project.handle(&subscription, true).await,
        };

        match result {
            Ok(outcome) => Ok(outcome.into()),
            Err(err) => Err(sync_error_to_webhook(err)),
        }
    }
}

impl From<ProjectOutcome> for WebhookOutcome {
    fn from(outcome: ProjectOutcome) -> Self {
        match outcome {
            ProjectOutcome::Applied { .. } | ProjectOutcome::MirrorPending { .. } => {
                WebhookOutcome::Processed
            }
            ProjectOutcome::SkippedUnrepresentable { vendor_status } => {
                WebhookOutcome::SkippedSoft(format!("unrepresentable status {}", vendor_status))
            }
            ProjectOutcome::SkippedUnresolvedOwner { subscription_id } => {
                WebhookOutcome::SkippedSoft(format!(
                    "no owner resolvable for {}",
                    subscription_id
                ))
            }
        }
    }
}

fn parse_object<T: serde::de::DeserializeOwned>(event: &StripeEvent) -> Result<T, WebhookError> {
    event
        .deserialize_object()
        .map_err(|e| WebhookError::ParseError(format!("event {}: {}", event.id, e)))
}

fn downstream(err: crate::domain::foundation::DomainError) -> WebhookError {
    WebhookError::Downstream(err.message().to_string())
}

fn sync_error_to_webhook(err: SyncError) -> WebhookError {
    WebhookError::Downstream(err.to_string())
}
