//! Errors produced while accepting a webhook delivery.

use thiserror::Error;

/// Failure modes of webhook verification and parsing.
#[derive(Debug, Error)]
pub enum WebhookError {
    /// Signature header is missing, malformed, or the digest does not match.
    #[error("webhook signature verification failed")]
    InvalidSignature,

    /// Event timestamp is older than the replay window allows.
    #[error("webhook event timestamp is too old")]
    StaleEvent,

    /// Event timestamp is in the future beyond tolerated clock skew.
    #[error("webhook event timestamp is invalid")]
    InvalidTimestamp,

    /// Payload could not be parsed as an event envelope.
    #[error("failed to parse webhook payload: {0}")]
    ParseError(String),

    /// Event rejected because live mode is required and it was a test event.
    #[error("test mode event rejected, live mode required")]
    LivemodeRequired,

    /// A downstream dependency failed while the event was being applied.
    #[error("downstream failure while processing webhook: {0}")]
    Downstream(String),
}

impl WebhookError {
    /// HTTP status the webhook endpoint should answer with.
    ///
    /// Verification and parsing failures are the caller's fault and get 400,
    /// which tells the vendor not to retry. Downstream failures get 500 so
    /// the vendor redelivers the event later.
    pub fn status_code(&self) -> u16 {
        match self {
            Self::InvalidSignature
            | Self::StaleEvent
            | Self::InvalidTimestamp
            | Self::ParseError(_)
            | Self::LivemodeRequired => 400,
            Self::Downstream(_) => 500,
        }
    }

    /// Whether the vendor should redeliver the event.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Downstream(_))
    }
}
