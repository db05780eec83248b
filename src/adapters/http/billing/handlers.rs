//! HTTP handlers for the billing sync endpoints.
//!
//! These handlers connect Axum routes to the application layer handlers.

use std::sync::Arc;

use axum::extract::{Json, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use secrecy::{ExposeSecret, SecretString};
use subtle::ConstantTimeEq;
use tracing::error;

use crate::application::handlers::billing::{
    GetTrialWindowHandler, ProcessWebhookCommand, ProcessWebhookHandler,
    SweepSubscriptionsHandler, SyncAllSubscriptionsHandler, SyncUserSubscriptionHandler,
};
use crate::domain::billing::SyncError;
use crate::domain::foundation::UserId;

use super::dto::{
    ErrorResponse, SubscriptionResponse, SweepResponse, SyncAllResponse, TrialQuery,
    TrialResponse, WebhookAck,
};

// ════════════════════════════════════════════════════════════════════════════════
// Application State
// ════════════════════════════════════════════════════════════════════════════════

/// Shared state for the billing routes. Cloned per request; everything
/// inside is Arc-wrapped.
#[derive(Clone)]
pub struct BillingAppState {
    pub webhook_handler: Arc<ProcessWebhookHandler>,
    pub sweep_handler: Arc<SweepSubscriptionsHandler>,
    pub sync_user_handler: Arc<SyncUserSubscriptionHandler>,
    pub sync_all_handler: Arc<SyncAllSubscriptionsHandler>,
    pub trial_handler: Arc<GetTrialWindowHandler>,
    /// Shared secret authorizing the scheduled sweep endpoint.
    pub cron_secret: SecretString,
}

// ════════════════════════════════════════════════════════════════════════════════
// User Context
// ════════════════════════════════════════════════════════════════════════════════

/// Authenticated user context.
///
/// The session layer in front of this service resolves the session and
/// forwards the user id in the X-User-Id header.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    pub user_id: UserId,
}

/// Rejection type for AuthenticatedUser extraction.
pub struct AuthenticationRequired;

impl IntoResponse for AuthenticationRequired {
    fn into_response(self) -> axum::response::Response {
        let error = ErrorResponse::new("AUTHENTICATION_REQUIRED", "Authentication is required");
        (StatusCode::UNAUTHORIZED, Json(error)).into_response()
    }
}

impl<S> axum::extract::FromRequestParts<S> for AuthenticatedUser
where
    S: Send + Sync,
{
    type Rejection = AuthenticationRequired;

    fn from_request_parts<'life0, 'life1, 'async_trait>(
        parts: &'life0 mut axum::http::request::Parts,
        _state: &'life1 S,
    ) -> std::pin::Pin<
        Box<dyn std::future::Future<Output = Result<Self, Self::Rejection>> + Send + 'async_trait>,
    >
    where
        'life0: 'async_trait,
        'life1: 'async_trait,
        Self: 'async_trait,
    {
        Box::pin(async move {
            let user_id = parts
                .headers
                .get("X-User-Id")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| UserId::new(s).ok())
                .ok_or(AuthenticationRequired)?;

            Ok(AuthenticatedUser { user_id })
        })
    }
}

// ════════════════════════════════════════════════════════════════════════════════
// Webhook Endpoint
// ════════════════════════════════════════════════════════════════════════════════

/// POST /api/webhooks/stripe - receive payment vendor webhook deliveries.
///
/// Also mounted at the legacy POST /api/webhooks path. Verification and
/// parse failures answer 400 so the vendor stops redelivering; downstream
/// failures answer 500 so it retries.
pub async fn handle_stripe_webhook(
    State(state): State<BillingAppState>,
    headers: axum::http::HeaderMap,
    body: axum::body::Bytes,
) -> axum::response::Response {
    let signature = match headers.get("Stripe-Signature").and_then(|v| v.to_str().ok()) {
        Some(signature) => signature.to_string(),
        None => {
            let error = ErrorResponse::new("MISSING_SIGNATURE", "Missing Stripe-Signature header");
            return (StatusCode::BAD_REQUEST, Json(error)).into_response();
        }
    };

    let cmd = ProcessWebhookCommand {
        payload: body.to_vec(),
        signature,
    };

    match state.webhook_handler.handle(cmd).await {
        Ok(_) => (StatusCode::OK, Json(WebhookAck { received: true })).into_response(),
        Err(err) => {
            let status = StatusCode::from_u16(err.status_code())
                .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
            if status.is_server_error() {
                error!(error = %err, "webhook processing failed");
            }
            let body = ErrorResponse::new("WEBHOOK_ERROR", err.to_string());
            (status, Json(body)).into_response()
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════════
// Reconciliation Endpoints
// ════════════════════════════════════════════════════════════════════════════════

/// GET /api/cron/sync-subscriptions - scheduled reconciliation sweep.
///
/// Authorized by a bearer token matching the configured cron secret,
/// compared in constant time.
pub async fn run_subscription_sweep(
    State(state): State<BillingAppState>,
    headers: axum::http::HeaderMap,
) -> axum::response::Response {
    if !cron_authorized(&headers, &state.cron_secret) {
        let error = ErrorResponse::new("UNAUTHORIZED", "Invalid or missing cron secret");
        return (StatusCode::UNAUTHORIZED, Json(error)).into_response();
    }

    match state.sweep_handler.handle().await {
        Ok(summary) => (StatusCode::OK, Json(SweepResponse::from(summary))).into_response(),
        Err(err) => {
            error!(error = %err, "subscription sweep failed");
            let body = ErrorResponse::new("SWEEP_FAILED", err.to_string());
            (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
        }
    }
}

fn cron_authorized(headers: &axum::http::HeaderMap, secret: &SecretString) -> bool {
    let provided = headers
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "));

    match provided {
        Some(token) => {
            let expected = secret.expose_secret().as_bytes();
            let provided = token.as_bytes();
            provided.len() == expected.len() && provided.ct_eq(expected).into()
        }
        None => false,
    }
}

/// GET /api/sync-subscription - repair the signed-in user's subscription.
pub async fn sync_user_subscription(
    State(state): State<BillingAppState>,
    user: AuthenticatedUser,
) -> axum::response::Response {
    match state.sync_user_handler.handle(&user.user_id).await {
        Ok(record) => {
            (StatusCode::OK, Json(SubscriptionResponse::from(record))).into_response()
        }
        Err(err @ (SyncError::NoSubscriptionFound | SyncError::ProfileNotFound { .. })) => {
            let body = ErrorResponse::new("NO_SUBSCRIPTION", err.to_string());
            (StatusCode::NOT_FOUND, Json(body)).into_response()
        }
        Err(err) => {
            error!(user_id = %user.user_id, error = %err, "user subscription sync failed");
            let body = ErrorResponse::new("SYNC_FAILED", err.to_string());
            (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
        }
    }
}

/// POST /api/sync-subscriptions - bulk repair across billable profiles.
///
/// Always answers 200; per-profile failures are logged and counted so a
/// partially failing run still reports what it managed to do.
pub async fn sync_all_subscriptions(
    State(state): State<BillingAppState>,
) -> axum::response::Response {
    match state.sync_all_handler.handle().await {
        Ok(outcome) => (StatusCode::OK, Json(SyncAllResponse::from(outcome))).into_response(),
        Err(err) => {
            error!(error = %err, "bulk subscription sync failed to start");
            (
                StatusCode::OK,
                Json(SyncAllResponse {
                    success: true,
                    synced: 0,
                    failed: 0,
                }),
            )
                .into_response()
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════════
// Trial Endpoint
// ════════════════════════════════════════════════════════════════════════════════

/// GET /api/subscriptions/trial?user_id=... - trial window lookup.
pub async fn get_trial_window(
    State(state): State<BillingAppState>,
    Query(query): Query<TrialQuery>,
) -> axum::response::Response {
    let user_id = match query.user_id.as_deref().and_then(|s| UserId::new(s).ok()) {
        Some(user_id) => user_id,
        None => {
            let error = ErrorResponse::new("MISSING_USER_ID", "user_id query parameter is required");
            return (StatusCode::BAD_REQUEST, Json(error)).into_response();
        }
    };

    match state.trial_handler.handle(&user_id).await {
        Ok(window) => (StatusCode::OK, Json(TrialResponse::from(window))).into_response(),
        Err(SyncError::NoSubscriptionFound) => {
            let body = ErrorResponse::new("NO_SUBSCRIPTION", "No subscription found for user");
            (StatusCode::NOT_FOUND, Json(body)).into_response()
        }
        Err(err) => {
            error!(user_id = %user_id, error = %err, "trial window lookup failed");
            let body = ErrorResponse::new("LOOKUP_FAILED", err.to_string());
            (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
        }
    }
}
