//! Stripe REST adapter for the `StripeGateway` port.
//!
//! Read-only: the sync paths only ever fetch state from Stripe, never
//! mutate it. Authentication is HTTP basic with the secret key as the
//! username, per the Stripe API convention.

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::warn;

use crate::domain::billing::{VendorCustomer, VendorSubscription};
use crate::ports::{GatewayError, StripeGateway};

/// Stripe API configuration.
#[derive(Clone)]
pub struct StripeConfig {
    /// Secret API key (sk_live_... or sk_test_...).
    api_key: SecretString,

    /// Base URL for the Stripe API.
    api_base_url: String,
}

impl StripeConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: SecretString::new(api_key.into()),
            api_base_url: "https://api.stripe.com".to_string(),
        }
    }

    /// Overrides the API base URL (for tests against a local stub).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = url.into();
        self
    }
}

/// List envelope shared by Stripe collection endpoints.
#[derive(Debug, Deserialize)]
struct StripeList<T> {
    data: Vec<T>,
}

/// Error envelope on non-success responses.
#[derive(Debug, Deserialize)]
struct StripeErrorEnvelope {
    error: StripeErrorBody,
}

#[derive(Debug, Deserialize)]
struct StripeErrorBody {
    #[serde(default)]
    message: Option<String>,
}

/// `StripeGateway` implementation backed by the Stripe REST API.
pub struct StripeGatewayAdapter {
    config: StripeConfig,
    http_client: reqwest::Client,
}

impl StripeGatewayAdapter {
    pub fn new(config: StripeConfig) -> Self {
        Self {
            config,
            http_client: reqwest::Client::new(),
        }
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, GatewayError> {
        let url = format!("{}{}", self.config.api_base_url, path);

        let response = self
            .http_client
            .get(&url)
            .basic_auth(self.config.api_key.expose_secret(), Option::<&str>::None)
            .query(query)
            .send()
            .await
            .map_err(|e| GatewayError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let message = response
                .json::<StripeErrorEnvelope>()
                .await
                .ok()
                .and_then(|envelope| envelope.error.message)
                .unwrap_or_else(|| "no error body".to_string());

            warn!(%status, path, message, "Stripe API call failed");

            if status.as_u16() == 401 {
                return Err(GatewayError::Authentication(message));
            }
            return Err(GatewayError::Api {
                status: status.as_u16(),
                message,
            });
        }

        response
            .json::<T>()
            .await
            .map_err(|e| GatewayError::Decode(e.to_string()))
    }

    /// GET for a single object, treating 404 as absence.
    async fn get_optional<T: DeserializeOwned>(
        &self,
        path: &str,
    ) -> Result<Option<T>, GatewayError> {
        match self.get_json::<T>(path, &[]).await {
            Ok(value) => Ok(Some(value)),
            Err(GatewayError::Api { status: 404, .. }) => Ok(None),
            Err(err) => Err(err),
        }
    }
}

#[async_trait]
impl StripeGateway for StripeGatewayAdapter {
    async fn list_subscriptions(
        &self,
        limit: u32,
    ) -> Result<Vec<VendorSubscription>, GatewayError> {
        let list: StripeList<VendorSubscription> = self
            .get_json(
                "/v1/subscriptions",
                &[("limit", limit.to_string()), ("status", "all".to_string())],
            )
            .await?;
        Ok(list.data)
    }

    async fn list_subscriptions_for_customer(
        &self,
        customer_id: &str,
        limit: u32,
    ) -> Result<Vec<VendorSubscription>, GatewayError> {
        let list: StripeList<VendorSubscription> = self
            .get_json(
                "/v1/subscriptions",
                &[
                    ("customer", customer_id.to_string()),
                    ("status", "all".to_string()),
                    ("limit", limit.to_string()),
                ],
            )
            .await?;
        Ok(list.data)
    }

    async fn get_subscription(
        &self,
        subscription_id: &str,
    ) -> Result<Option<VendorSubscription>, GatewayError> {
        self.get_optional(&format!("/v1/subscriptions/{}", subscription_id))
            .await
    }

    async fn get_customer(
        &self,
        customer_id: &str,
    ) -> Result<Option<VendorCustomer>, GatewayError> {
        let customer: Option<VendorCustomer> = self
            .get_optional(&format!("/v1/customers/{}", customer_id))
            .await?;

        // Stripe answers 200 with a `deleted: true` stub after deletion.
        Ok(customer.filter(|c| !c.deleted))
    }
}
