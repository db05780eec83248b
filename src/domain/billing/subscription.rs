//! Canonical subscription record.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{Timestamp, UserId};

use super::profile::SubscriptionMirror;
use super::status::SubscriptionStatus;

/// One billing relationship between a user and the vendor.
///
/// Keyed by the vendor-issued subscription id. Rows are upserted with full
/// field replacement (last writer wins) and never hard-deleted; termination
/// is expressed as a `Canceled` status.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubscriptionRecord {
    /// Vendor subscription id (primary key).
    pub id: String,

    /// Owning application user.
    pub user_id: UserId,

    pub status: SubscriptionStatus,

    /// Vendor price reference of the primary line item.
    pub price_id: Option<String>,

    pub quantity: i64,

    pub cancel_at_period_end: bool,
    pub cancel_at: Option<Timestamp>,
    pub canceled_at: Option<Timestamp>,

    pub current_period_start: Timestamp,
    pub current_period_end: Timestamp,

    pub created: Timestamp,
    pub ended_at: Option<Timestamp>,

    pub trial_start: Option<Timestamp>,
    pub trial_end: Option<Timestamp>,

    /// Free-form vendor metadata; carries the owner id before the store
    /// knows about the user.
    pub metadata: HashMap<String, String>,
}

impl SubscriptionRecord {
    /// Returns the denormalized triple mirrored onto the profile row.
    pub fn mirror(&self) -> SubscriptionMirror {
        SubscriptionMirror {
            status: self.status,
            price_id: self.price_id.clone(),
            subscription_id: self.id.clone(),
        }
    }

    /// True while the trial window is open at the given instant.
    pub fn in_trial(&self, at: Timestamp) -> bool {
        match (self.trial_start, self.trial_end) {
            (Some(start), Some(end)) => !at.is_after(&end) && !start.is_after(&at),
            _ => false,
        }
    }
}
