//! Payment gateway port for external card processing.
//!
//! Defines the contract for charge-originating gateway integrations
//! (e.g. Stripe). The orchestrator is the only consumer; gateway error
//! types never cross the application boundary.
//!
//! # Design
//!
//! - **Gateway agnostic**: the interface works with any card processor.
//! - **Idempotent**: every charge attempt carries an idempotency key, and
//!   a prior attempt can be looked up by that key. This is what makes a
//!   timed-out attempt safe to reconcile instead of blindly retried.
//! - **Canonical amounts**: the gateway's returned amount is trusted over
//!   the requested amount (partial authorization).

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::domain::foundation::{Money, UserId};

/// Port for payment gateway integrations.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Create (or fetch) a customer in the gateway for a card token.
    async fn create_customer(
        &self,
        request: CreateCustomerRequest,
    ) -> Result<GatewayCustomer, GatewayError>;

    /// Attempt a charge. Implementations wrap the network call in a
    /// timeout; a timeout surfaces as [`GatewayError::Timeout`], never as
    /// a silent failure.
    async fn create_charge(
        &self,
        request: CreateChargeRequest,
    ) -> Result<GatewayCharge, GatewayError>;

    /// Look up a prior attempt by idempotency key.
    ///
    /// Returns `None` when the gateway has no record of the attempt,
    /// meaning no money moved.
    async fn find_charge(
        &self,
        idempotency_key: &str,
    ) -> Result<Option<GatewayCharge>, GatewayError>;
}

/// Request to create a customer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateCustomerRequest {
    /// Internal user id (stored as gateway metadata).
    pub user_id: UserId,

    /// Customer email address.
    pub email: String,

    /// Tokenized card to attach.
    pub card_token: String,
}

/// Customer in the gateway.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayCustomer {
    /// Gateway's customer id.
    pub id: String,

    /// Customer email.
    pub email: String,
}

/// Request to attempt a charge.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateChargeRequest {
    /// Gateway's customer id.
    pub customer_id: String,

    /// Amount to charge.
    pub amount: Money,

    /// Accounts-facing description.
    pub description: String,

    /// Metadata echoed back by the gateway (reservation id, charge id).
    pub metadata: HashMap<String, String>,

    /// Key making a retried attempt indistinguishable from the first.
    pub idempotency_key: String,
}

/// The gateway's record of a charge attempt.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayCharge {
    /// Gateway's charge id.
    pub id: String,

    /// Canonical amount actually authorized.
    pub amount: Money,

    /// Whether the money moved.
    pub paid: bool,

    /// Description as recorded by the gateway.
    pub description: String,

    /// Raw response payload for the ledger.
    pub raw: serde_json::Value,
}

/// Errors from gateway operations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GatewayError {
    /// The card was declined; outcome is definitive.
    Declined {
        message: String,
        decline_code: Option<String>,
        raw: serde_json::Value,
    },

    /// The request timed out; the outcome is unknown.
    Timeout,

    /// The connection failed mid-flight; the outcome is unknown.
    Network { message: String },

    /// The gateway rejected the request before attempting it.
    InvalidRequest { message: String },

    /// The gateway reported an internal error.
    Api { message: String },
}

impl GatewayError {
    /// Creates a declined error without a payload.
    pub fn declined(message: impl Into<String>) -> Self {
        GatewayError::Declined {
            message: message.into(),
            decline_code: None,
            raw: serde_json::Value::Null,
        }
    }

    /// Creates a network error.
    pub fn network(message: impl Into<String>) -> Self {
        GatewayError::Network {
            message: message.into(),
        }
    }

    /// True when the charge may or may not have completed and must be
    /// reconciled via [`PaymentGateway::find_charge`] before any retry.
    pub fn outcome_unknown(&self) -> bool {
        matches!(self, GatewayError::Timeout | GatewayError::Network { .. })
    }

    /// User-facing message.
    pub fn message(&self) -> String {
        match self {
            GatewayError::Declined { message, .. } => message.clone(),
            GatewayError::Timeout => "payment gateway timed out".to_string(),
            GatewayError::Network { message } => message.clone(),
            GatewayError::InvalidRequest { message } => message.clone(),
            GatewayError::Api { message } => message.clone(),
        }
    }

    /// Raw payload to store on the failed ledger row, when there is one.
    pub fn raw_response(&self) -> serde_json::Value {
        match self {
            GatewayError::Declined { raw, .. } => raw.clone(),
            _ => serde_json::Value::Null,
        }
    }
}

impl std::fmt::Display for GatewayError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl std::error::Error for GatewayError {}

#[cfg(test)]
mod tests {
    use super::*;

    // Trait object safety test
    #[test]
    fn payment_gateway_is_object_safe() {
        fn _accepts_dyn(_gateway: &dyn PaymentGateway) {}
    }

    #[test]
    fn timeouts_and_network_errors_are_unknown_outcome() {
        assert!(GatewayError::Timeout.outcome_unknown());
        assert!(GatewayError::network("connection reset").outcome_unknown());
    }

    #[test]
    fn declines_are_definitive() {
        assert!(!GatewayError::declined("insufficient funds").outcome_unknown());
        assert!(!GatewayError::Api {
            message: "internal".to_string()
        }
        .outcome_unknown());
    }

    #[test]
    fn declined_message_reaches_display() {
        let err = GatewayError::declined("insufficient funds");
        assert_eq!(err.to_string(), "insufficient funds");
    }
}
