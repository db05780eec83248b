//! GetTrialWindowHandler - trial bounds for a user's latest subscription.

use std::sync::Arc;

use serde::Serialize;

use crate::domain::billing::SyncError;
use crate::domain::foundation::{Timestamp, UserId};
use crate::ports::SubscriptionRepository;

/// Trial bounds of a subscription. Both ends absent means no trial was
/// ever configured.
#[derive(Debug, Clone, Serialize)]
pub struct TrialWindow {
    pub trial_start: Option<Timestamp>,
    pub trial_end: Option<Timestamp>,
    pub in_trial: bool,
}

/// Reads the trial window from the user's latest stored subscription.
/// Pure read; never calls the vendor.
pub struct GetTrialWindowHandler {
    subscriptions: Arc<dyn SubscriptionRepository>,
}

impl GetTrialWindowHandler {
    pub fn new(subscriptions: Arc<dyn SubscriptionRepository>) -> Self {
        Self { subscriptions }
    }

    /// # Errors
    ///
    /// `NoSubscriptionFound` when the user has no stored subscription.
    pub async fn handle(&self, user_id: &UserId) -> Result<TrialWindow, SyncError> {
        let record = self
            .subscriptions
            .find_latest_by_user(user_id)
            .await?
            .ok_or(SyncError::NoSubscriptionFound)?;

        Ok(TrialWindow {
            trial_start: record.trial_start,
            trial_end: record.trial_end,
            in_trial: record.in_trial(Timestamp::now()),
        })
    }
}
