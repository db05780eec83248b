//! Request/response DTOs for the billing endpoints.

use serde::{Deserialize, Serialize};

use crate::application::handlers::billing::{SweepSummary, SyncAllOutcome, TrialWindow};
use crate::domain::billing::SubscriptionRecord;

/// Standard error body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            message: message.into(),
        }
    }
}

/// Acknowledgement body for webhook deliveries.
#[derive(Debug, Serialize, Deserialize)]
pub struct WebhookAck {
    pub received: bool,
}

/// Per-item failure in a sweep response.
#[derive(Debug, Serialize)]
pub struct SweepErrorDto {
    pub subscription_id: String,
    pub error: String,
}

/// Accounting section of a sweep response.
#[derive(Debug, Serialize)]
pub struct SweepResultsDto {
    pub processed: u32,
    pub updated: u32,
    pub errors: Vec<SweepErrorDto>,
}

/// Body for the scheduled sweep endpoint.
#[derive(Debug, Serialize)]
pub struct SweepResponse {
    pub success: bool,
    /// RFC 3339 completion time of the run.
    pub timestamp: String,
    pub results: SweepResultsDto,
}

impl From<SweepSummary> for SweepResponse {
    fn from(summary: SweepSummary) -> Self {
        Self {
            success: true,
            timestamp: chrono::Utc::now().to_rfc3339(),
            results: SweepResultsDto {
                processed: summary.processed,
                updated: summary.updated,
                errors: summary
                    .errors
                    .into_iter()
                    .map(|e| SweepErrorDto {
                        subscription_id: e.subscription_id,
                        error: e.error,
                    })
                    .collect(),
            },
        }
    }
}

/// Body for the bulk sync endpoint, which always reports success.
#[derive(Debug, Serialize)]
pub struct SyncAllResponse {
    pub success: bool,
    pub synced: u32,
    pub failed: u32,
}

impl From<SyncAllOutcome> for SyncAllResponse {
    fn from(outcome: SyncAllOutcome) -> Self {
        Self {
            success: true,
            synced: outcome.synced,
            failed: outcome.failed,
        }
    }
}

/// Subscription as returned by the single-user sync endpoint.
#[derive(Debug, Serialize)]
pub struct SubscriptionResponse {
    pub id: String,
    pub user_id: String,
    pub status: String,
    pub price_id: Option<String>,
    pub quantity: i64,
    pub cancel_at_period_end: bool,
    pub current_period_start: String,
    pub current_period_end: String,
    pub trial_start: Option<String>,
    pub trial_end: Option<String>,
}

impl From<SubscriptionRecord> for SubscriptionResponse {
    fn from(record: SubscriptionRecord) -> Self {
        Self {
            id: record.id,
            user_id: record.user_id.as_str().to_string(),
            status: record.status.as_str().to_string(),
            price_id: record.price_id,
            quantity: record.quantity,
            cancel_at_period_end: record.cancel_at_period_end,
            current_period_start: record.current_period_start.to_string(),
            current_period_end: record.current_period_end.to_string(),
            trial_start: record.trial_start.map(|t| t.to_string()),
            trial_end: record.trial_end.map(|t| t.to_string()),
        }
    }
}

/// Trial bounds body.
#[derive(Debug, Serialize)]
pub struct TrialResponse {
    pub trial_start: Option<String>,
    pub trial_end: Option<String>,
    pub in_trial: bool,
}

impl From<TrialWindow> for TrialResponse {
    fn from(window: TrialWindow) -> Self {
        Self {
            trial_start: window.trial_start.map(|t| t.to_string()),
            trial_end: window.trial_end.map(|t| t.to_string()),
            in_trial: window.in_trial,
        }
    }
}

/// Query parameters for the trial endpoint.
#[derive(Debug, Deserialize)]
pub struct TrialQuery {
    pub user_id: Option<String>,
}
