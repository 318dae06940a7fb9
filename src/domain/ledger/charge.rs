//! Charge ledger entries.
//!
//! A charge is the immutable record of one payment attempt. Retrying a
//! failed payment appends a new row; nothing ever updates an existing
//! one, which is what makes the ledger trustworthy as an audit trail.
//! Only successful rows count toward a balance.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{ChargeId, Money, Timestamp, UserId, ValidationError};

use super::PaymentTarget;

/// Outcome of a payment attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChargeState {
    /// The gateway confirmed the money moved.
    Successful,

    /// Declined, errored, or confirmed never to have completed.
    Failed,
}

/// How the money was taken.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    /// Card payment through the gateway.
    Card,

    /// Cash taken at the registration desk.
    Cash,
}

/// Immutable record of one payment attempt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Charge {
    /// Unique identifier; also the gateway idempotency key.
    pub id: ChargeId,

    /// What the charge was made against.
    pub target: PaymentTarget,

    /// User who triggered the payment.
    pub user_id: UserId,

    /// Amount attempted or taken. Never negative in the ledger.
    pub amount: Money,

    /// Outcome.
    pub state: ChargeState,

    /// Payment method.
    pub method: PaymentMethod,

    /// Gateway's identifier for the charge, when one was issued.
    pub gateway_id: Option<String>,

    /// Raw gateway response payload for audit and dispute handling.
    pub gateway_response: serde_json::Value,

    /// Human-readable description shown to holders and accountants.
    pub comment: String,

    /// When the attempt was recorded.
    pub created_at: Timestamp,
}

impl Charge {
    /// Records a successful charge.
    ///
    /// # Errors
    ///
    /// Returns `Negative` if `amount` is below zero; the ledger never
    /// stores negative amounts.
    pub fn successful(
        id: ChargeId,
        target: PaymentTarget,
        user_id: UserId,
        amount: Money,
        method: PaymentMethod,
        comment: impl Into<String>,
        created_at: Timestamp,
    ) -> Result<Self, ValidationError> {
        Self::record(
            id,
            target,
            user_id,
            amount,
            ChargeState::Successful,
            method,
            comment,
            created_at,
        )
    }

    /// Records a failed charge.
    ///
    /// # Errors
    ///
    /// Returns `Negative` if `amount` is below zero.
    pub fn failed(
        id: ChargeId,
        target: PaymentTarget,
        user_id: UserId,
        amount: Money,
        method: PaymentMethod,
        comment: impl Into<String>,
        created_at: Timestamp,
    ) -> Result<Self, ValidationError> {
        Self::record(
            id,
            target,
            user_id,
            amount,
            ChargeState::Failed,
            method,
            comment,
            created_at,
        )
    }

    #[allow(clippy::too_many_arguments)]
    fn record(
        id: ChargeId,
        target: PaymentTarget,
        user_id: UserId,
        amount: Money,
        state: ChargeState,
        method: PaymentMethod,
        comment: impl Into<String>,
        created_at: Timestamp,
    ) -> Result<Self, ValidationError> {
        if amount.is_negative() {
            return Err(ValidationError::negative("amount", amount.minor_units()));
        }
        Ok(Self {
            id,
            target,
            user_id,
            amount,
            state,
            method,
            gateway_id: None,
            gateway_response: serde_json::Value::Null,
            comment: comment.into(),
            created_at,
        })
    }

    /// Attaches the gateway's id and raw response.
    pub fn with_gateway_response(
        mut self,
        gateway_id: impl Into<String>,
        response: serde_json::Value,
    ) -> Self {
        self.gateway_id = Some(gateway_id.into());
        self.gateway_response = response;
        self
    }

    /// True for successful charges.
    pub fn is_successful(&self) -> bool {
        self.state == ChargeState::Successful
    }
}

/// Sum of the successful charges in `charges`, in `currency`.
pub fn successful_total<'a, I>(
    currency: crate::domain::foundation::Currency,
    charges: I,
) -> Result<Money, crate::domain::foundation::MoneyError>
where
    I: IntoIterator<Item = &'a Charge>,
{
    Money::sum(
        currency,
        charges
            .into_iter()
            .filter(|c| c.is_successful())
            .map(|c| c.amount),
    )
}
