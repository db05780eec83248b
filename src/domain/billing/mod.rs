//! Billing domain: subscription lifecycle state synchronized from the
//! payment vendor.
//!
//! The vendor (Stripe) is the source of truth for subscription state; this
//! module holds the canonical internal representation, the fixed status
//! mapping, the webhook envelope/classifier/verifier, and the pure
//! projection from vendor-shaped objects to store rows.

mod catalog;
mod errors;
mod profile;
mod projection;
mod status;
mod stripe_event;
mod subscription;
mod vendor;
mod webhook_errors;
mod webhook_verifier;

pub use catalog::{BillingInterval, PriceRecord, PricingType, ProductRecord};
pub use errors::SyncError;
pub use profile::{Profile, SubscriptionMirror};
pub use projection::{
    project_price, project_product, project_subscription, SubscriptionProjection,
};
pub use status::SubscriptionStatus;
pub use stripe_event::{EventKind, StripeEvent, StripeEventData};
pub use subscription::SubscriptionRecord;
pub use vendor::{
    VendorCheckoutSession, VendorCustomer, VendorPrice, VendorProduct, VendorRecurring,
    VendorSubscription, VendorSubscriptionItem, OWNER_METADATA_KEY,
};
pub use webhook_errors::WebhookError;
pub use webhook_verifier::{SignatureHeader, StripeWebhookVerifier};

#[cfg(test)]
pub use stripe_event::StripeEventBuilder;
#[cfg(test)]
pub use webhook_verifier::compute_test_signature;
