//! Stripe payment gateway adapter.
//!
//! Implements the `PaymentGateway` port over Stripe's REST API. Charges
//! are originated with an idempotency key and tagged with the same key in
//! metadata, so a timed-out attempt can be reconciled through charge
//! search before anyone retries.
//!
//! # Configuration
//!
//! ```ignore
//! let config = StripeConfig::new("sk_test_...");
//! let gateway = StripeGateway::new(config);
//! ```

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;

use crate::domain::foundation::{Currency, Money};
use crate::ports::{
    CreateChargeRequest, CreateCustomerRequest, GatewayCharge, GatewayCustomer, GatewayError,
    PaymentGateway,
};

/// Default timeout for gateway calls.
const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Stripe API configuration.
#[derive(Clone)]
pub struct StripeConfig {
    /// Stripe secret API key (sk_live_... or sk_test_...).
    api_key: SecretString,

    /// Base URL for the Stripe API (default: https://api.stripe.com).
    api_base_url: String,

    /// Per-request timeout.
    request_timeout: Duration,
}

impl StripeConfig {
    /// Create a new Stripe configuration.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: SecretString::new(api_key.into()),
            api_base_url: "https://api.stripe.com".to_string(),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }

    /// Create configuration from the `STRIPE_API_KEY` environment
    /// variable.
    pub fn from_env() -> Result<Self, std::env::VarError> {
        Ok(Self::new(std::env::var("STRIPE_API_KEY")?))
    }

    /// Set a custom API base URL (for testing).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = url.into();
        self
    }

    /// Set the per-request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }
}

/// Stripe payment gateway adapter.
pub struct StripeGateway {
    config: StripeConfig,
    http_client: reqwest::Client,
}

impl StripeGateway {
    /// Create a new Stripe gateway with the given configuration.
    pub fn new(config: StripeConfig) -> Self {
        let http_client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()
            .unwrap_or_default();
        Self {
            config,
            http_client,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.api_base_url, path)
    }

    async fn parse_charge(response: reqwest::Response) -> Result<GatewayCharge, GatewayError> {
        let status = response.status();
        let body: serde_json::Value = response
            .json()
            .await
            .map_err(|e| GatewayError::Api {
                message: format!("unparseable gateway response: {}", e),
            })?;

        if !status.is_success() {
            return Err(error_from_body(status, &body));
        }

        let row: StripeCharge =
            serde_json::from_value(body.clone()).map_err(|e| GatewayError::Api {
                message: format!("unexpected charge shape: {}", e),
            })?;
        let currency = parse_currency(&row.currency)?;

        Ok(GatewayCharge {
            id: row.id,
            amount: Money::new(row.amount, currency),
            paid: row.paid,
            description: row.description.unwrap_or_default(),
            raw: body,
        })
    }

    fn map_transport_error(err: reqwest::Error) -> GatewayError {
        if err.is_timeout() {
            GatewayError::Timeout
        } else {
            GatewayError::network(err.to_string())
        }
    }
}

#[async_trait]
impl PaymentGateway for StripeGateway {
    async fn create_customer(
        &self,
        request: CreateCustomerRequest,
    ) -> Result<GatewayCustomer, GatewayError> {
        let mut form = HashMap::new();
        form.insert("email", request.email.clone());
        form.insert("source", request.card_token.clone());
        form.insert("metadata[user_id]", request.user_id.to_string());

        let response = self
            .http_client
            .post(self.url("/v1/customers"))
            .bearer_auth(self.config.api_key.expose_secret())
            .form(&form)
            .send()
            .await
            .map_err(Self::map_transport_error)?;

        let status = response.status();
        let body: serde_json::Value = response
            .json()
            .await
            .map_err(|e| GatewayError::Api {
                message: format!("unparseable gateway response: {}", e),
            })?;
        if !status.is_success() {
            return Err(error_from_body(status, &body));
        }

        let row: StripeCustomer =
            serde_json::from_value(body).map_err(|e| GatewayError::Api {
                message: format!("unexpected customer shape: {}", e),
            })?;
        Ok(GatewayCustomer {
            id: row.id,
            email: row.email.unwrap_or(request.email),
        })
    }

    async fn create_charge(
        &self,
        request: CreateChargeRequest,
    ) -> Result<GatewayCharge, GatewayError> {
        let mut form = HashMap::new();
        form.insert("customer".to_string(), request.customer_id.clone());
        form.insert(
            "amount".to_string(),
            request.amount.minor_units().to_string(),
        );
        form.insert(
            "currency".to_string(),
            request.amount.currency().gateway_code().to_string(),
        );
        form.insert("description".to_string(), request.description.clone());
        // The idempotency key also goes into metadata so find_charge can
        // search for it later.
        form.insert(
            "metadata[idempotency_key]".to_string(),
            request.idempotency_key.clone(),
        );
        for (key, value) in &request.metadata {
            form.insert(format!("metadata[{}]", key), value.clone());
        }

        let response = self
            .http_client
            .post(self.url("/v1/charges"))
            .bearer_auth(self.config.api_key.expose_secret())
            .header("Idempotency-Key", &request.idempotency_key)
            .form(&form)
            .send()
            .await
            .map_err(Self::map_transport_error)?;

        Self::parse_charge(response).await
    }

    async fn find_charge(
        &self,
        idempotency_key: &str,
    ) -> Result<Option<GatewayCharge>, GatewayError> {
        let query = format!("metadata['idempotency_key']:'{}'", idempotency_key);
        let response = self
            .http_client
            .get(self.url("/v1/charges/search"))
            .bearer_auth(self.config.api_key.expose_secret())
            .query(&[("query", query.as_str()), ("limit", "1")])
            .send()
            .await
            .map_err(Self::map_transport_error)?;

        let status = response.status();
        let body: serde_json::Value = response
            .json()
            .await
            .map_err(|e| GatewayError::Api {
                message: format!("unparseable gateway response: {}", e),
            })?;
        if !status.is_success() {
            return Err(error_from_body(status, &body));
        }

        let Some(first) = body
            .get("data")
            .and_then(|d| d.as_array())
            .and_then(|rows| rows.first())
            .cloned()
        else {
            return Ok(None);
        };

        let row: StripeCharge =
            serde_json::from_value(first.clone()).map_err(|e| GatewayError::Api {
                message: format!("unexpected charge shape: {}", e),
            })?;
        let currency = parse_currency(&row.currency)?;
        Ok(Some(GatewayCharge {
            id: row.id,
            amount: Money::new(row.amount, currency),
            paid: row.paid,
            description: row.description.unwrap_or_default(),
            raw: first,
        }))
    }
}

#[derive(Debug, Deserialize)]
struct StripeCustomer {
    id: String,
    email: Option<String>,
}

#[derive(Debug, Deserialize)]
struct StripeCharge {
    id: String,
    amount: i64,
    currency: String,
    paid: bool,
    description: Option<String>,
}

fn parse_currency(code: &str) -> Result<Currency, GatewayError> {
    match code {
        "nzd" => Ok(Currency::Nzd),
        "usd" => Ok(Currency::Usd),
        "eur" => Ok(Currency::Eur),
        other => Err(GatewayError::Api {
            message: format!("unsupported currency from gateway: {}", other),
        }),
    }
}

fn error_from_body(status: reqwest::StatusCode, body: &serde_json::Value) -> GatewayError {
    let error = body.get("error");
    let message = error
        .and_then(|e| e.get("message"))
        .and_then(|m| m.as_str())
        .unwrap_or("gateway error")
        .to_string();
    let error_type = error
        .and_then(|e| e.get("type"))
        .and_then(|t| t.as_str())
        .unwrap_or_default();

    if error_type == "card_error" {
        let decline_code = error
            .and_then(|e| e.get("decline_code"))
            .and_then(|c| c.as_str())
            .map(|c| c.to_string());
        return GatewayError::Declined {
            message,
            decline_code,
            raw: body.clone(),
        };
    }
    if status.is_client_error() {
        return GatewayError::InvalidRequest { message };
    }
    GatewayError::Api { message }
}
