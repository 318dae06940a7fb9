//! Billing-specific error types.
//!
//! The payment orchestrator's error taxonomy. Validation failures happen
//! before any money moves and leave no trace; gateway declines leave a
//! failed ledger row; an unknown gateway outcome is the one condition a
//! caller must verify before retrying; a ledger inconsistency means money
//! moved externally but bookkeeping failed, and is alerted loudly rather
//! than swallowed.

use crate::domain::foundation::{
    CartId, DomainError, ErrorCode, Money, MoneyError, ReservationId, ValidationError,
};

/// Payment and balance errors.
#[derive(Debug, Clone, PartialEq)]
pub enum BillingError {
    /// Charge amount missing, zero or negative.
    InvalidAmount { message: String },

    /// Charge amount exceeds what is owed; refusing to overpay.
    OverpaymentRejected { owed: Money, requested: Money },

    /// The gateway declined or definitively failed the charge. Recorded
    /// as a failed ledger row; the reservation is untouched.
    GatewayDeclined { message: String },

    /// The gateway attempt timed out and reconciliation could not confirm
    /// the outcome either way. Retry only with the same idempotency key.
    GatewayUnknownOutcome,

    /// The gateway took the money but recording it failed. Fatal; needs
    /// operator attention.
    LedgerInconsistency { message: String },

    /// Two currencies met mid-calculation.
    CurrencyMismatch { message: String },

    /// Reservation was not found.
    ReservationNotFound(ReservationId),

    /// Cart was not found.
    CartNotFound(CartId),

    /// An invariant the transaction boundaries should make impossible was
    /// observed (e.g. a reservation without an active order).
    InvariantViolation { message: String },

    /// Infrastructure error.
    Infrastructure(String),
}

impl BillingError {
    pub fn invalid_amount(message: impl Into<String>) -> Self {
        BillingError::InvalidAmount {
            message: message.into(),
        }
    }

    pub fn overpayment_rejected(owed: Money, requested: Money) -> Self {
        BillingError::OverpaymentRejected { owed, requested }
    }

    pub fn gateway_declined(message: impl Into<String>) -> Self {
        BillingError::GatewayDeclined {
            message: message.into(),
        }
    }

    pub fn gateway_unknown_outcome() -> Self {
        BillingError::GatewayUnknownOutcome
    }

    pub fn ledger_inconsistency(message: impl Into<String>) -> Self {
        BillingError::LedgerInconsistency {
            message: message.into(),
        }
    }

    pub fn reservation_not_found(id: ReservationId) -> Self {
        BillingError::ReservationNotFound(id)
    }

    pub fn cart_not_found(id: CartId) -> Self {
        BillingError::CartNotFound(id)
    }

    pub fn invariant_violation(message: impl Into<String>) -> Self {
        BillingError::InvariantViolation {
            message: message.into(),
        }
    }

    pub fn infrastructure(message: impl Into<String>) -> Self {
        BillingError::Infrastructure(message.into())
    }

    /// Returns the error code for this error.
    pub fn code(&self) -> ErrorCode {
        match self {
            BillingError::InvalidAmount { .. } => ErrorCode::ValidationFailed,
            BillingError::OverpaymentRejected { .. } => ErrorCode::OverpaymentRejected,
            BillingError::GatewayDeclined { .. } => ErrorCode::GatewayDeclined,
            BillingError::GatewayUnknownOutcome => ErrorCode::GatewayUnknownOutcome,
            BillingError::LedgerInconsistency { .. } => ErrorCode::LedgerInconsistency,
            BillingError::CurrencyMismatch { .. } => ErrorCode::CurrencyMismatch,
            BillingError::ReservationNotFound(_) => ErrorCode::ReservationNotFound,
            BillingError::CartNotFound(_) => ErrorCode::CartNotFound,
            BillingError::InvariantViolation { .. } => ErrorCode::InvariantViolation,
            BillingError::Infrastructure(_) => ErrorCode::DatabaseError,
        }
    }

    /// Returns a user-friendly error message.
    pub fn message(&self) -> String {
        match self {
            BillingError::InvalidAmount { message } => message.clone(),
            BillingError::OverpaymentRejected { owed, requested } => format!(
                "refusing to overpay: {} owed, {} requested",
                owed, requested
            ),
            BillingError::GatewayDeclined { message } => message.clone(),
            BillingError::GatewayUnknownOutcome => {
                "payment outcome unknown; it will be verified before any retry".to_string()
            }
            BillingError::LedgerInconsistency { message } => {
                format!("payment succeeded but could not be recorded: {}", message)
            }
            BillingError::CurrencyMismatch { message } => message.clone(),
            BillingError::ReservationNotFound(id) => format!("Reservation not found: {}", id),
            BillingError::CartNotFound(id) => format!("Cart not found: {}", id),
            BillingError::InvariantViolation { message } => message.clone(),
            BillingError::Infrastructure(msg) => format!("Error: {}", msg),
        }
    }

    /// True when the caller may retry after verification.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            BillingError::GatewayUnknownOutcome | BillingError::Infrastructure(_)
        )
    }
}

impl std::fmt::Display for BillingError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl std::error::Error for BillingError {}

impl From<MoneyError> for BillingError {
    fn from(err: MoneyError) -> Self {
        BillingError::CurrencyMismatch {
            message: err.to_string(),
        }
    }
}

impl From<ValidationError> for BillingError {
    fn from(err: ValidationError) -> Self {
        BillingError::InvalidAmount {
            message: err.to_string(),
        }
    }
}

impl From<DomainError> for BillingError {
    fn from(err: DomainError) -> Self {
        match err.code {
            ErrorCode::InvariantViolation => BillingError::InvariantViolation {
                message: err.message,
            },
            _ => BillingError::Infrastructure(err.to_string()),
        }
    }
}

impl From<BillingError> for DomainError {
    fn from(err: BillingError) -> Self {
        DomainError::new(err.code(), err.message())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::Currency;

    fn nzd(cents: i64) -> Money {
        Money::new(cents, Currency::Nzd)
    }

    #[test]
    fn overpayment_message_names_both_amounts() {
        let err = BillingError::overpayment_rejected(nzd(100_00), nzd(150_00));
        let msg = err.message();
        assert!(msg.contains("$100.00 NZD"));
        assert!(msg.contains("$150.00 NZD"));
        assert_eq!(err.code(), ErrorCode::OverpaymentRejected);
    }

    #[test]
    fn unknown_outcome_is_retryable_declined_is_not() {
        assert!(BillingError::gateway_unknown_outcome().is_retryable());
        assert!(!BillingError::gateway_declined("card declined").is_retryable());
    }

    #[test]
    fn money_error_converts_to_currency_mismatch() {
        let err: BillingError = MoneyError::CurrencyMismatch {
            left: Currency::Nzd,
            right: Currency::Usd,
        }
        .into();
        assert_eq!(err.code(), ErrorCode::CurrencyMismatch);
    }

    #[test]
    fn ledger_inconsistency_code_is_distinct() {
        let err = BillingError::ledger_inconsistency("insert failed");
        assert_eq!(err.code(), ErrorCode::LedgerInconsistency);
        assert!(err.message().contains("could not be recorded"));
    }

    #[test]
    fn converts_to_domain_error() {
        let err = BillingError::gateway_declined("no funds");
        let domain_err: DomainError = err.clone().into();
        assert_eq!(domain_err.code, err.code());
    }
}
