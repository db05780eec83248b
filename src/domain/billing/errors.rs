//! Errors raised while projecting vendor billing state into local storage.

use thiserror::Error;

use crate::domain::foundation::DomainError;

/// Failures of subscription synchronization.
///
/// Resolution failures are soft: the surrounding job logs them and moves
/// on, since they describe subscriptions this application does not own.
/// Upstream failures are hard and abort the current item.
#[derive(Debug, Error)]
pub enum SyncError {
    /// Neither the subscription nor its customer carries an owner mapping.
    #[error("no application user found for subscription {subscription_id}")]
    UnresolvableOwner { subscription_id: String },

    /// The owner resolved to a user with no profile row.
    #[error("no profile exists for user {user_id}")]
    ProfileNotFound { user_id: String },

    /// A lookup found no subscription for the requesting user.
    #[error("no subscription found for user")]
    NoSubscriptionFound,

    /// The vendor API call failed.
    #[error("payment provider error: {0}")]
    Gateway(String),

    /// A local persistence operation failed.
    #[error("database error: {0}")]
    Database(String),
}

impl SyncError {
    /// Soft errors are logged and skipped rather than failing the request.
    pub fn is_soft(&self) -> bool {
        matches!(
            self,
            Self::UnresolvableOwner { .. } | Self::ProfileNotFound { .. }
        )
    }
}

impl From<DomainError> for SyncError {
    fn from(err: DomainError) -> Self {
        SyncError::Database(err.message().to_string())
    }
}
