//! Internal subscription status and the fixed vendor mapping table.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Canonical subscription status.
///
/// Only these five statuses are representable in the store. Vendor statuses
/// outside the mapping table (`incomplete`, `incomplete_expired`, `paused`)
/// have no stable application-level meaning yet and are skipped by the
/// projector rather than stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubscriptionStatus {
    /// Subscription is active and current.
    Active,

    /// Subscription is in trial period.
    Trialing,

    /// Payment is past due, grace period active.
    PastDue,

    /// Subscription is canceled. Terminal.
    Canceled,

    /// Payment failed after retries exhausted.
    Unpaid,
}

impl SubscriptionStatus {
    /// Maps a raw vendor status string through the fixed table.
    ///
    /// Returns `None` for any status that is not representable, which the
    /// caller must treat as "drop without error".
    pub fn from_vendor(status: &str) -> Option<Self> {
        match status {
            "active" => Some(Self::Active),
            "trialing" => Some(Self::Trialing),
            "past_due" => Some(Self::PastDue),
            "canceled" => Some(Self::Canceled),
            "unpaid" => Some(Self::Unpaid),
            _ => None,
        }
    }

    /// Returns the store representation of the status.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Trialing => "trialing",
            Self::PastDue => "past_due",
            Self::Canceled => "canceled",
            Self::Unpaid => "unpaid",
        }
    }

    /// Check if this status grants access to paid features.
    pub fn grants_access(&self) -> bool {
        matches!(self, Self::Active | Self::Trialing | Self::PastDue)
    }
}

impl fmt::Display for SubscriptionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
