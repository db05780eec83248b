//! Pure projection of vendor billing objects into local records.
//!
//! All write paths (webhooks, sweeps, on-demand sync) go through these
//! functions, so a subscription projects to the same record no matter
//! which path delivered it.

use crate::domain::foundation::{Timestamp, UserId};

use super::catalog::{BillingInterval, PriceRecord, PricingType, ProductRecord};
use super::profile::SubscriptionMirror;
use super::status::SubscriptionStatus;
use super::subscription::SubscriptionRecord;
use super::vendor::{VendorPrice, VendorProduct, VendorSubscription};

/// Result of projecting one vendor subscription.
#[derive(Debug, Clone)]
pub enum SubscriptionProjection {
    /// The subscription maps cleanly onto the local model.
    Ready {
        record: SubscriptionRecord,
        mirror: SubscriptionMirror,
    },
    /// The vendor status has no local representation; drop without error.
    NotRepresentable { vendor_status: String },
}

/// Projects a vendor subscription for the given owner.
///
/// Full-field replacement: every stored column is recomputed from the
/// vendor object, so applying the same input twice yields the same record.
pub fn project_subscription(
    subscription: &VendorSubscription,
    owner: &UserId,
) -> SubscriptionProjection {
    let status = match SubscriptionStatus::from_vendor(&subscription.status) {
        Some(status) => status,
        None => {
            return SubscriptionProjection::NotRepresentable {
                vendor_status: subscription.status.clone(),
            }
        }
    };

    let record = SubscriptionRecord {
        id: subscription.id.clone(),
        user_id: owner.clone(),
        status,
        price_id: subscription.primary_price_id().map(str::to_string),
        quantity: subscription.quantity(),
        cancel_at_period_end: subscription.cancel_at_period_end,
        cancel_at: subscription.cancel_at.map(Timestamp::from_epoch_seconds),
        canceled_at: subscription.canceled_at.map(Timestamp::from_epoch_seconds),
        current_period_start: Timestamp::from_epoch_seconds(subscription.current_period_start),
        current_period_end: Timestamp::from_epoch_seconds(subscription.current_period_end),
        created: Timestamp::from_epoch_seconds(subscription.created),
        ended_at: subscription.ended_at.map(Timestamp::from_epoch_seconds),
        trial_start: subscription.trial_start.map(Timestamp::from_epoch_seconds),
        trial_end: subscription.trial_end.map(Timestamp::from_epoch_seconds),
        metadata: subscription.metadata.clone(),
    };
    let mirror = record.mirror();

    SubscriptionProjection::Ready { record, mirror }
}

/// Projects a vendor product into a catalog record.
///
/// Feature lists live in product metadata as comma-separated strings under
/// the `features` and `feature-list` keys. Entries are trimmed and empty
/// entries dropped, preserving order.
pub fn project_product(product: &VendorProduct) -> ProductRecord {
    ProductRecord {
        id: product.id.clone(),
        active: product.active,
        name: product.name.clone(),
        description: product.description.clone(),
        features: parse_feature_list(product.metadata.get("features")),
        marketing_features: parse_feature_list(product.metadata.get("feature-list")),
        image: product.images.first().cloned(),
        created: Timestamp::from_epoch_seconds(product.created),
    }
}

/// Projects a vendor price into a catalog record.
///
/// Returns `None` when the pricing type is unknown; such prices are
/// skipped rather than stored with a guessed type.
pub fn project_price(price: &VendorPrice) -> Option<PriceRecord> {
    let pricing_type = PricingType::from_vendor(&price.price_type)?;

    let recurring = price.recurring.as_ref();
    Some(PriceRecord {
        id: price.id.clone(),
        product_id: price.product.clone(),
        active: price.active,
        currency: price.currency.clone(),
        pricing_type,
        unit_amount: price.unit_amount,
        interval: recurring.and_then(|r| BillingInterval::from_vendor(&r.interval)),
        interval_count: recurring.and_then(|r| r.interval_count),
        trial_period_days: recurring.and_then(|r| r.trial_period_days),
    })
}

fn parse_feature_list(raw: Option<&String>) -> Vec<String> {
    raw.map(|value| {
        value
            .split(',')
            .map(str::trim)
            .filter(|entry| !entry.is_empty())
            .map(str::to_string)
            .collect()
    })
    .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use serde_json::json;

    use super::*;

    fn vendor_subscription(status: &str) -> VendorSubscription {
        serde_json::from_value(json!({
            "id": "sub_abc",
            "customer": "cus_abc",
            "status": status,
            "items": {
                "data": [{"price": {"id": "price_abc"}, "quantity": 3}]
            },
            "metadata": {"user_id": "u1", "plan": "pro"},
            "cancel_at_period_end": true,
            "cancel_at": 1706745600,
            "canceled_at": null,
            "current_period_start": 1704067200,
            "current_period_end": 1706745600,
            "created": 1704067200,
            "ended_at": null,
            "trial_start": 1704067200,
            "trial_end": 1705276800
        }))
        .unwrap()
    }

    fn owner() -> UserId {
        UserId::new("11111111-2222-3333-4444-555555555555").unwrap()
    }

    // ══════════════════════════════════════════════════════════════
    // Subscription Projection Tests
    // ══════════════════════════════════════════════════════════════

    #[test]
    fn project_representable_subscription() {
        let projection = project_subscription(&vendor_subscription("trialing"), &owner());

        let (record, mirror) = match projection {
            SubscriptionProjection::Ready { record, mirror } => (record, mirror),
            other => panic!("expected Ready, got {:?}", other),
        };

        assert_eq!(record.id, "sub_abc");
        assert_eq!(record.user_id, owner());
        assert_eq!(record.status, SubscriptionStatus::Trialing);
        assert_eq!(record.price_id.as_deref(), Some("price_abc"));
        assert_eq!(record.quantity, 3);
        assert!(record.cancel_at_period_end);
        assert_eq!(record.cancel_at.unwrap().epoch_seconds(), 1706745600);
        assert!(record.canceled_at.is_none());
        assert_eq!(record.trial_start.unwrap().epoch_seconds(), 1704067200);
        assert_eq!(record.trial_end.unwrap().epoch_seconds(), 1705276800);
        assert_eq!(record.metadata.get("plan").map(String::as_str), Some("pro"));

        assert_eq!(mirror.status, SubscriptionStatus::Trialing);
        assert_eq!(mirror.price_id.as_deref(), Some("price_abc"));
        assert_eq!(mirror.subscription_id, "sub_abc");
    }

    #[test]
    fn project_unrepresentable_status_is_dropped() {
        for status in ["incomplete", "incomplete_expired", "paused"] {
            let projection = project_subscription(&vendor_subscription(status), &owner());
            match projection {
                SubscriptionProjection::NotRepresentable { vendor_status } => {
                    assert_eq!(vendor_status, status);
                }
                other => panic!("expected NotRepresentable, got {:?}", other),
            }
        }
    }

    #[test]
    fn projection_is_deterministic() {
        let sub = vendor_subscription("active");
        let a = project_subscription(&sub, &owner());
        let b = project_subscription(&sub, &owner());

        match (a, b) {
            (
                SubscriptionProjection::Ready { record: ra, .. },
                SubscriptionProjection::Ready { record: rb, .. },
            ) => assert_eq!(ra, rb),
            _ => panic!("expected both projections Ready"),
        }
    }

    #[test]
    fn subscription_without_items_projects_defaults() {
        let sub: VendorSubscription = serde_json::from_value(json!({
            "id": "sub_bare",
            "customer": "cus_bare",
            "status": "active",
            "cancel_at": null,
            "canceled_at": null,
            "current_period_start": 1704067200,
            "current_period_end": 1706745600,
            "created": 1704067200,
            "ended_at": null,
            "trial_start": null,
            "trial_end": null
        }))
        .unwrap();

        match project_subscription(&sub, &owner()) {
            SubscriptionProjection::Ready { record, mirror } => {
                assert!(record.price_id.is_none());
                assert_eq!(record.quantity, 1);
                assert!(mirror.price_id.is_none());
            }
            other => panic!("expected Ready, got {:?}", other),
        }
    }

    // ══════════════════════════════════════════════════════════════
    // Catalog Projection Tests
    // ══════════════════════════════════════════════════════════════

    #[test]
    fn project_product_parses_feature_lists() {
        let mut metadata = HashMap::new();
        metadata.insert("features".to_string(), "setlists, tour budgets ,,merch".to_string());
        metadata.insert("feature-list".to_string(), "Everything in Solo".to_string());

        let product = VendorProduct {
            id: "prod_1".to_string(),
            active: true,
            name: "Band".to_string(),
            description: Some("For full bands".to_string()),
            images: vec!["https://img.example/band.png".to_string()],
            metadata,
            created: 1704067200,
        };

        let record = project_product(&product);

        assert_eq!(record.features, vec!["setlists", "tour budgets", "merch"]);
        assert_eq!(record.marketing_features, vec!["Everything in Solo"]);
        assert_eq!(record.image.as_deref(), Some("https://img.example/band.png"));
        assert_eq!(record.created.epoch_seconds(), 1704067200);
    }

    #[test]
    fn project_product_without_metadata_has_empty_features() {
        let product = VendorProduct {
            id: "prod_2".to_string(),
            active: false,
            name: "Solo".to_string(),
            description: None,
            images: vec![],
            metadata: HashMap::new(),
            created: 1704067200,
        };

        let record = project_product(&product);

        assert!(record.features.is_empty());
        assert!(record.marketing_features.is_empty());
        assert!(record.image.is_none());
    }

    #[test]
    fn project_recurring_price() {
        let price: VendorPrice = serde_json::from_value(json!({
            "id": "price_1",
            "product": "prod_1",
            "active": true,
            "currency": "usd",
            "type": "recurring",
            "unit_amount": 1900,
            "recurring": {"interval": "month", "interval_count": 1, "trial_period_days": 14}
        }))
        .unwrap();

        let record = project_price(&price).unwrap();

        assert_eq!(record.pricing_type, PricingType::Recurring);
        assert_eq!(record.interval, Some(BillingInterval::Month));
        assert_eq!(record.trial_period_days, Some(14));
    }

    #[test]
    fn project_one_time_price_has_no_interval() {
        let price: VendorPrice = serde_json::from_value(json!({
            "id": "price_2",
            "product": "prod_1",
            "active": true,
            "currency": "usd",
            "type": "one_time",
            "unit_amount": 50000,
            "recurring": null
        }))
        .unwrap();

        let record = project_price(&price).unwrap();

        assert_eq!(record.pricing_type, PricingType::OneTime);
        assert!(record.interval.is_none());
        assert!(record.trial_period_days.is_none());
    }

    #[test]
    fn project_price_with_unknown_type_is_skipped() {
        let price: VendorPrice = serde_json::from_value(json!({
            "id": "price_3",
            "product": "prod_1",
            "active": true,
            "currency": "usd",
            "type": "metered_tiered",
            "unit_amount": null,
            "recurring": null
        }))
        .unwrap();

        assert!(project_price(&price).is_none());
    }
}
