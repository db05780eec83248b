//! Stripe webhook event envelope and relevance classification.

use serde::{Deserialize, Serialize};

/// Stripe webhook event (simplified).
///
/// Contains the essential fields needed for webhook processing.
/// Additional fields from Stripe's full event schema are ignored.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StripeEvent {
    /// Unique identifier for the event (evt_xxx format).
    pub id: String,

    /// Type of event (e.g., "customer.subscription.updated").
    #[serde(rename = "type")]
    pub event_type: String,

    /// Time at which the event was created (Unix timestamp).
    pub created: i64,

    /// Object containing event-specific data.
    pub data: StripeEventData,

    /// Whether this is a live mode event (vs test mode).
    pub livemode: bool,
}

/// Container for event-specific data.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StripeEventData {
    /// The object that triggered the event (polymorphic based on event type).
    pub object: serde_json::Value,
}

impl StripeEvent {
    /// Returns true if this is a live mode event.
    pub fn is_live(&self) -> bool {
        self.livemode
    }

    /// Attempts to deserialize the data object as the specified type.
    pub fn deserialize_object<T: serde::de::DeserializeOwned>(
        &self,
    ) -> Result<T, serde_json::Error> {
        serde_json::from_value(self.data.object.clone())
    }

    /// Classifies the event against the relevance allow-list.
    pub fn classify(&self) -> Option<EventKind> {
        EventKind::classify(&self.event_type)
    }
}

/// Internal event kinds the sync cares about.
///
/// The vendor's event vocabulary is far broader than this; anything that
/// does not classify is acknowledged and dropped, which is the expected
/// outcome for the majority of deliveries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    SubscriptionCreated,
    SubscriptionUpdated,
    SubscriptionDeleted,
    CheckoutCompleted,
    ProductCreated,
    ProductUpdated,
    ProductDeleted,
    PriceCreated,
    PriceUpdated,
    PriceDeleted,
}

impl EventKind {
    /// Looks up a vendor event type in the fixed allow-list.
    pub fn classify(event_type: &str) -> Option<Self> {
        match event_type {
            "customer.subscription.created" => Some(Self::SubscriptionCreated),
            "customer.subscription.updated" => Some(Self::SubscriptionUpdated),
            "customer.subscription.deleted" => Some(Self::SubscriptionDeleted),
            "checkout.session.completed" => Some(Self::CheckoutCompleted),
            "product.created" => Some(Self::ProductCreated),
            "product.updated" => Some(Self::ProductUpdated),
            "product.deleted" => Some(Self::ProductDeleted),
            "price.created" => Some(Self::PriceCreated),
            "price.updated" => Some(Self::PriceUpdated),
            "price.deleted" => Some(Self::PriceDeleted),
            _ => None,
        }
    }

    /// True for the subscription lifecycle kinds.
    pub fn is_subscription_lifecycle(&self) -> bool {
        matches!(
            self,
            Self::SubscriptionCreated | Self::SubscriptionUpdated | Self::SubscriptionDeleted
        )
    }
}

/// Builder for creating test StripeEvent instances.
#[cfg(test)]
pub struct StripeEventBuilder {
    id: String,
    event_type: String,
    created: i64,
    object: serde_json::Value,
    livemode: bool,
}

#[cfg(test)]
impl Default for StripeEventBuilder {
    fn default() -> Self {
        Self {
            id: "evt_test_123".to_string(),
            event_type: "customer.subscription.updated".to_string(),
            created: chrono::Utc::now().timestamp(),
            object: serde_json::json!({}),
            livemode: false,
        }
    }
}

#[cfg(test)]
impl StripeEventBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    pub fn event_type(mut self, event_type: impl Into<String>) -> Self {
        self.event_type = event_type.into();
        self
    }

    pub fn created(mut self, created: i64) -> Self {
        self.created = created;
        self
    }

    pub fn object(mut self, object: serde_json::Value) -> Self {
        self.object = object;
        self
    }

    pub fn livemode(mut self, livemode: bool) -> Self {
        self.livemode = livemode;
        self
    }

    pub fn build(self) -> StripeEvent {
        StripeEvent {
            id: self.id,
            event_type: self.event_type,
            created: self.created,
            data: StripeEventData {
                object: self.object,
            },
            livemode: self.livemode,
        }
    }
}
