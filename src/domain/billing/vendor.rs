//! Vendor-shaped objects as they arrive from Stripe.
//!
//! These types capture only the fields the projection needs; the rest of
//! Stripe's schema is ignored on deserialization. The same shapes appear in
//! webhook `data.object` payloads and in REST API responses, so both the
//! webhook path and the reconciliation jobs parse into them.

use serde::Deserialize;
use std::collections::HashMap;

/// Metadata key carrying the owning application user id.
///
/// Written into customer and subscription metadata at checkout time so
/// lifecycle events can be tied back to a profile row.
pub const OWNER_METADATA_KEY: &str = "user_id";

/// A vendor subscription object.
#[derive(Debug, Clone, Deserialize)]
pub struct VendorSubscription {
    /// Vendor subscription id (sub_xxx).
    pub id: String,

    /// Vendor customer id (cus_xxx).
    pub customer: String,

    /// Raw vendor status string; mapped through the fixed table later.
    pub status: String,

    #[serde(default)]
    pub items: VendorSubscriptionItems,

    #[serde(default)]
    pub metadata: HashMap<String, String>,

    #[serde(default)]
    pub cancel_at_period_end: bool,

    pub cancel_at: Option<i64>,
    pub canceled_at: Option<i64>,
    pub current_period_start: i64,
    pub current_period_end: i64,
    pub created: i64,
    pub ended_at: Option<i64>,
    pub trial_start: Option<i64>,
    pub trial_end: Option<i64>,
}

impl VendorSubscription {
    /// Returns the price id of the first subscription item, if any.
    pub fn primary_price_id(&self) -> Option<&str> {
        self.items.data.first().map(|item| item.price.id.as_str())
    }

    /// Returns the quantity of the first subscription item, defaulting to 1.
    pub fn quantity(&self) -> i64 {
        self.items
            .data
            .first()
            .and_then(|item| item.quantity)
            .unwrap_or(1)
    }

    /// Returns the owning user id carried in subscription metadata, if set.
    pub fn owner_metadata(&self) -> Option<&str> {
        self.metadata
            .get(OWNER_METADATA_KEY)
            .map(String::as_str)
            .filter(|id| !id.is_empty())
    }
}

/// Container for subscription line items.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct VendorSubscriptionItems {
    #[serde(default)]
    pub data: Vec<VendorSubscriptionItem>,
}

/// One subscription line item.
#[derive(Debug, Clone, Deserialize)]
pub struct VendorSubscriptionItem {
    pub price: VendorPriceRef,
    pub quantity: Option<i64>,
}

/// Price reference nested inside a subscription item.
#[derive(Debug, Clone, Deserialize)]
pub struct VendorPriceRef {
    pub id: String,
}

/// A vendor customer object.
#[derive(Debug, Clone, Deserialize)]
pub struct VendorCustomer {
    pub id: String,

    pub email: Option<String>,

    /// Stripe returns `deleted: true` stubs for removed customers.
    #[serde(default)]
    pub deleted: bool,

    #[serde(default)]
    pub metadata: HashMap<String, String>,
}

impl VendorCustomer {
    /// Returns the owning user id carried in customer metadata, if set.
    pub fn owner_metadata(&self) -> Option<&str> {
        self.metadata
            .get(OWNER_METADATA_KEY)
            .map(String::as_str)
            .filter(|id| !id.is_empty())
    }
}

/// A completed checkout session payload.
#[derive(Debug, Clone, Deserialize)]
pub struct VendorCheckoutSession {
    pub id: String,
    pub customer: Option<String>,
    pub subscription: Option<String>,
    #[serde(default)]
    pub metadata: HashMap<String, String>,
}

/// A vendor catalog product.
#[derive(Debug, Clone, Deserialize)]
pub struct VendorProduct {
    pub id: String,
    pub active: bool,
    pub name: String,
    pub description: Option<String>,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub metadata: HashMap<String, String>,
    pub created: i64,
}

/// A vendor catalog price.
#[derive(Debug, Clone, Deserialize)]
pub struct VendorPrice {
    pub id: String,
    pub product: String,
    pub active: bool,
    pub currency: String,
    #[serde(rename = "type")]
    pub price_type: String,
    pub unit_amount: Option<i64>,
    pub recurring: Option<VendorRecurring>,
}

/// Recurrence settings on a recurring price.
#[derive(Debug, Clone, Deserialize)]
pub struct VendorRecurring {
    pub interval: String,
    pub interval_count: Option<i64>,
    pub trial_period_days: Option<i64>,
}
