//! Shared in-memory port implementations for handler tests.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::{json, Value};

use crate::domain::billing::{
    PriceRecord, ProductRecord, Profile, SubscriptionMirror, SubscriptionRecord, VendorCustomer,
    VendorSubscription,
};
use crate::domain::foundation::{DomainError, ErrorCode, UserId};
use crate::ports::{
    BillableProfile, CatalogRepository, GatewayError, MirrorOutcome, ProfileRepository,
    StripeGateway, SubscriptionRepository,
};

/// In-memory subscription store keyed by vendor subscription id.
#[derive(Default)]
pub struct InMemorySubscriptions {
    records: Mutex<HashMap<String, SubscriptionRecord>>,
    failing_ids: Mutex<HashSet<String>>,
}

impl InMemorySubscriptions {
    pub fn get(&self, id: &str) -> Option<SubscriptionRecord> {
        self.records.lock().unwrap().get(id).cloned()
    }

    /// Makes upserts of the given subscription id fail with a database error.
    pub fn fail_upserts_for(&self, id: &str) {
        self.failing_ids.lock().unwrap().insert(id.to_string());
    }
}

#[async_trait]
impl SubscriptionRepository for InMemorySubscriptions {
    async fn upsert(&self, record: &SubscriptionRecord) -> Result<(), DomainError> {
        if self.failing_ids.lock().unwrap().contains(&record.id) {
            return Err(DomainError::new(
                ErrorCode::DatabaseError,
                "simulated upsert failure",
            ));
        }
        self.records
            .lock()
            .unwrap()
            .insert(record.id.clone(), record.clone());
        Ok(())
    }

    async fn find_latest_by_user(
        &self,
        user_id: &UserId,
    ) -> Result<Option<SubscriptionRecord>, DomainError> {
        Ok(self
            .records
            .lock()
            .unwrap()
            .values()
            .filter(|r| &r.user_id == user_id)
            .max_by_key(|r| r.created.epoch_seconds())
            .cloned())
    }
}

/// In-memory profile store keyed by user id.
#[derive(Default)]
pub struct InMemoryProfiles {
    profiles: Mutex<HashMap<String, Profile>>,
}

impl InMemoryProfiles {
    pub fn insert(&self, profile: Profile) {
        self.profiles
            .lock()
            .unwrap()
            .insert(profile.id.as_str().to_string(), profile);
    }

    pub fn get(&self, user_id: &str) -> Option<Profile> {
        self.profiles.lock().unwrap().get(user_id).cloned()
    }
}

#[async_trait]
impl ProfileRepository for InMemoryProfiles {
    async fn apply_mirror(
        &self,
        user_id: &UserId,
        mirror: &SubscriptionMirror,
        customer_id: Option<&str>,
    ) -> Result<MirrorOutcome, DomainError> {
        let mut profiles = self.profiles.lock().unwrap();
        match profiles.get_mut(user_id.as_str()) {
            Some(profile) => {
                profile.subscription_status = Some(mirror.status);
                profile.subscription_price_id = mirror.price_id.clone();
                profile.subscription_id = Some(mirror.subscription_id.clone());
                if let Some(customer_id) = customer_id {
                    profile.stripe_customer_id = Some(customer_id.to_string());
                }
                Ok(MirrorOutcome::Applied)
            }
            None => Ok(MirrorOutcome::ProfileMissing),
        }
    }

    async fn find_by_id(&self, user_id: &UserId) -> Result<Option<Profile>, DomainError> {
        Ok(self.profiles.lock().unwrap().get(user_id.as_str()).cloned())
    }

    async fn list_billable(&self) -> Result<Vec<BillableProfile>, DomainError> {
        Ok(self
            .profiles
            .lock()
            .unwrap()
            .values()
            .filter_map(|p| {
                p.stripe_customer_id.as_ref().map(|c| BillableProfile {
                    user_id: p.id.clone(),
                    stripe_customer_id: c.clone(),
                })
            })
            .collect())
    }
}

/// In-memory catalog store.
#[derive(Default)]
pub struct InMemoryCatalog {
    products: Mutex<HashMap<String, ProductRecord>>,
    prices: Mutex<HashMap<String, PriceRecord>>,
}

impl InMemoryCatalog {
    pub fn product(&self, id: &str) -> Option<ProductRecord> {
        self.products.lock().unwrap().get(id).cloned()
    }

    pub fn price(&self, id: &str) -> Option<PriceRecord> {
        self.prices.lock().unwrap().get(id).cloned()
    }
}

#[async_trait]
impl CatalogRepository for InMemoryCatalog {
    async fn upsert_product(&self, product: &ProductRecord) -> Result<(), DomainError> {
        self.products
            .lock()
            .unwrap()
            .insert(product.id.clone(), product.clone());
        Ok(())
    }

    async fn deactivate_product(&self, product_id: &str) -> Result<(), DomainError> {
        if let Some(product) = self.products.lock().unwrap().get_mut(product_id) {
            product.active = false;
        }
        Ok(())
    }

    async fn upsert_price(&self, price: &PriceRecord) -> Result<(), DomainError> {
        self.prices
            .lock()
            .unwrap()
            .insert(price.id.clone(), price.clone());
        Ok(())
    }

    async fn deactivate_price(&self, price_id: &str) -> Result<(), DomainError> {
        if let Some(price) = self.prices.lock().unwrap().get_mut(price_id) {
            price.active = false;
        }
        Ok(())
    }
}

/// Canned payment provider for tests.
#[derive(Default)]
pub struct StubGateway {
    customers: Mutex<HashMap<String, VendorCustomer>>,
    subscriptions: Mutex<Vec<VendorSubscription>>,
    fail_listing: Mutex<bool>,
}

impl StubGateway {
    pub fn add_customer(&self, customer: VendorCustomer) {
        self.customers
            .lock()
            .unwrap()
            .insert(customer.id.clone(), customer);
    }

    pub fn add_subscription(&self, subscription: VendorSubscription) {
        self.subscriptions.lock().unwrap().push(subscription);
    }

    pub fn fail_listing(&self) {
        *self.fail_listing.lock().unwrap() = true;
    }
}

#[async_trait]
impl StripeGateway for StubGateway {
    async fn list_subscriptions(
        &self,
        limit: u32,
    ) -> Result<Vec<VendorSubscription>, GatewayError> {
        if *self.fail_listing.lock().unwrap() {
            return Err(GatewayError::Network("simulated outage".to_string()));
        }
        Ok(self
            .subscriptions
            .lock()
            .unwrap()
            .iter()
            .take(limit as usize)
            .cloned()
            .collect())
    }

    async fn list_subscriptions_for_customer(
        &self,
        customer_id: &str,
        limit: u32,
    ) -> Result<Vec<VendorSubscription>, GatewayError> {
        Ok(self
            .subscriptions
            .lock()
            .unwrap()
            .iter()
            .filter(|s| s.customer == customer_id)
            .take(limit as usize)
            .cloned()
            .collect())
    }

    async fn get_subscription(
        &self,
        subscription_id: &str,
    ) -> Result<Option<VendorSubscription>, GatewayError> {
        Ok(self
            .subscriptions
            .lock()
            .unwrap()
            .iter()
            .find(|s| s.id == subscription_id)
            .cloned())
    }

    async fn get_customer(
        &self,
        customer_id: &str,
    ) -> Result<Option<VendorCustomer>, GatewayError> {
        Ok(self.customers.lock().unwrap().get(customer_id).cloned())
    }
}

/// Builds a vendor subscription from a base shape plus JSON overrides.
pub fn vendor_subscription_json(overrides: Value) -> VendorSubscription {
    let mut base = json!({
        "id": "sub_test",
        "customer": "cus_test",
        "status": "active",
        "items": {
            "data": [{"price": {"id": "price_test"}, "quantity": 1}]
        },
        "metadata": {},
        "cancel_at_period_end": false,
        "cancel_at": null,
        "canceled_at": null,
        "current_period_start": 1704067200,
        "current_period_end": 1706745600,
        "created": 1704067200,
        "ended_at": null,
        "trial_start": null,
        "trial_end": null
    });

    if let (Some(base_map), Some(override_map)) = (base.as_object_mut(), overrides.as_object()) {
        for (key, value) in override_map {
            base_map.insert(key.clone(), value.clone());
        }
    }

    serde_json::from_value(base).expect("valid vendor subscription json")
}

/// Builds a vendor customer with the given metadata.
pub fn vendor_customer_json(id: &str, metadata: Value) -> VendorCustomer {
    serde_json::from_value(json!({
        "id": id,
        "email": "musician@example.com",
        "deleted": false,
        "metadata": metadata
    }))
    .expect("valid vendor customer json")
}
