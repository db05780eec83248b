//! Profile row and the subscription mirror written onto it.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::UserId;

use super::status::SubscriptionStatus;

/// One row per application user.
///
/// Read paths query profile rows instead of joining to subscriptions, so a
/// denormalized subset of the current subscription is kept here. The mirror
/// is eventually consistent with the subscriptions table; it is re-asserted
/// on every projection and by the reconciliation jobs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    /// User id, shared with the auth identity.
    pub id: UserId,

    pub email: Option<String>,
    pub display_name: Option<String>,
    pub avatar_url: Option<String>,

    /// Vendor customer id, set at first checkout or backfilled by sweeps.
    pub stripe_customer_id: Option<String>,

    pub subscription_status: Option<SubscriptionStatus>,
    pub subscription_price_id: Option<String>,
    pub subscription_id: Option<String>,
}

/// The triple copied from a subscription projection onto the profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubscriptionMirror {
    pub status: SubscriptionStatus,
    pub price_id: Option<String>,
    pub subscription_id: String,
}
