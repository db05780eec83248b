//! Vendor catalog entities mirrored for pricing screens.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::Timestamp;

/// A mirrored catalog product.
///
/// Deleted products are kept with `active = false` (soft delete) so prices
/// referencing them stay resolvable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductRecord {
    pub id: String,
    pub active: bool,
    pub name: String,
    pub description: Option<String>,

    /// Ordered feature list, parsed from the vendor `features` metadata key.
    pub features: Vec<String>,

    /// Ordered marketing copy list, parsed from `feature-list` metadata.
    pub marketing_features: Vec<String>,

    pub image: Option<String>,
    pub created: Timestamp,
}

/// A mirrored catalog price.
///
/// `product_id` is soft-enforced; orphaned prices are tolerated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceRecord {
    pub id: String,
    pub product_id: String,
    pub active: bool,
    pub currency: String,
    pub pricing_type: PricingType,

    /// Amount in minor currency units.
    pub unit_amount: Option<i64>,

    pub interval: Option<BillingInterval>,
    pub interval_count: Option<i64>,
    pub trial_period_days: Option<i64>,
}

/// One-time purchase vs recurring billing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PricingType {
    OneTime,
    Recurring,
}

impl PricingType {
    pub fn from_vendor(s: &str) -> Option<Self> {
        match s {
            "one_time" => Some(Self::OneTime),
            "recurring" => Some(Self::Recurring),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::OneTime => "one_time",
            Self::Recurring => "recurring",
        }
    }
}

/// Billing interval of a recurring price.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BillingInterval {
    Day,
    Week,
    Month,
    Year,
}

impl BillingInterval {
    pub fn from_vendor(s: &str) -> Option<Self> {
        match s {
            "day" => Some(Self::Day),
            "week" => Some(Self::Week),
            "month" => Some(Self::Month),
            "year" => Some(Self::Year),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Day => "day",
            Self::Week => "week",
            Self::Month => "month",
            Self::Year => "year",
        }
    }
}
