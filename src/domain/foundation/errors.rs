//! Error types for the domain layer.

use std::collections::HashMap;
use std::error::Error;
use std::fmt;
use thiserror::Error;

/// Errors that occur during value object construction.
#[derive(Debug, Clone, Error)]
pub enum ValidationError {
    #[error("Field '{field}' cannot be empty")]
    EmptyField { field: String },

    #[error("Field '{field}' must not be negative, got {actual}")]
    Negative { field: String, actual: i64 },

    #[error("Field '{field}' has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },
}

impl ValidationError {
    /// Creates an empty field validation error.
    pub fn empty_field(field: impl Into<String>) -> Self {
        ValidationError::EmptyField {
            field: field.into(),
        }
    }

    /// Creates a negative amount validation error.
    pub fn negative(field: impl Into<String>, actual: i64) -> Self {
        ValidationError::Negative {
            field: field.into(),
            actual,
        }
    }

    /// Creates an invalid format validation error.
    pub fn invalid_format(field: impl Into<String>, reason: impl Into<String>) -> Self {
        ValidationError::InvalidFormat {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

/// Error codes organized by category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    // Validation errors
    ValidationFailed,
    EmptyField,
    InvalidFormat,
    CurrencyMismatch,

    // Not found errors
    ReservationNotFound,
    TierNotFound,
    CartNotFound,

    // State errors
    InvalidStateTransition,
    ReservationDisabled,
    OverpaymentRejected,
    NoUpgradePath,
    ReservationNotHeld,
    OwnershipMismatch,

    // Gateway errors
    GatewayDeclined,
    GatewayUnknownOutcome,

    // Invariant errors
    InvariantViolation,
    LedgerInconsistency,

    // Infrastructure errors
    DatabaseError,
    InternalError,
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ErrorCode::ValidationFailed => "VALIDATION_FAILED",
            ErrorCode::EmptyField => "EMPTY_FIELD",
            ErrorCode::InvalidFormat => "INVALID_FORMAT",
            ErrorCode::CurrencyMismatch => "CURRENCY_MISMATCH",
            ErrorCode::ReservationNotFound => "RESERVATION_NOT_FOUND",
            ErrorCode::TierNotFound => "TIER_NOT_FOUND",
            ErrorCode::CartNotFound => "CART_NOT_FOUND",
            ErrorCode::InvalidStateTransition => "INVALID_STATE_TRANSITION",
            ErrorCode::ReservationDisabled => "RESERVATION_DISABLED",
            ErrorCode::OverpaymentRejected => "OVERPAYMENT_REJECTED",
            ErrorCode::NoUpgradePath => "NO_UPGRADE_PATH",
            ErrorCode::ReservationNotHeld => "RESERVATION_NOT_HELD",
            ErrorCode::OwnershipMismatch => "OWNERSHIP_MISMATCH",
            ErrorCode::GatewayDeclined => "GATEWAY_DECLINED",
            ErrorCode::GatewayUnknownOutcome => "GATEWAY_UNKNOWN_OUTCOME",
            ErrorCode::InvariantViolation => "INVARIANT_VIOLATION",
            ErrorCode::LedgerInconsistency => "LEDGER_INCONSISTENCY",
            ErrorCode::DatabaseError => "DATABASE_ERROR",
            ErrorCode::InternalError => "INTERNAL_ERROR",
        };
        write!(f, "{}", s)
    }
}

/// Standard domain error with code, message, and optional details.
#[derive(Debug, Clone)]
pub struct DomainError {
    pub code: ErrorCode,
    pub message: String,
    pub details: HashMap<String, String>,
}

impl DomainError {
    /// Creates a new domain error.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            details: HashMap::new(),
        }
    }

    /// Creates a validation error for a specific field.
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: ErrorCode::ValidationFailed,
            message: message.into(),
            details: HashMap::new(),
        }
        .with_detail("field", field.into())
    }

    /// Adds a detail to the error.
    pub fn with_detail(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.details.insert(key.into(), value.into());
        self
    }
}

impl fmt::Display for DomainError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)
    }
}

impl Error for DomainError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_error_empty_field_displays_correctly() {
        let err = ValidationError::empty_field("user_id");
        assert_eq!(format!("{}", err), "Field 'user_id' cannot be empty");
    }

    #[test]
    fn validation_error_negative_displays_correctly() {
        let err = ValidationError::negative("amount", -500);
        assert_eq!(
            format!("{}", err),
            "Field 'amount' must not be negative, got -500"
        );
    }

    #[test]
    fn domain_error_displays_code_and_message() {
        let err = DomainError::new(ErrorCode::ReservationNotFound, "Reservation not found");
        assert_eq!(
            format!("{}", err),
            "[RESERVATION_NOT_FOUND] Reservation not found"
        );
    }

    #[test]
    fn domain_error_with_detail_adds_detail() {
        let err = DomainError::new(ErrorCode::ValidationFailed, "Validation failed")
            .with_detail("field", "amount")
            .with_detail("reason", "must be positive");

        assert_eq!(err.details.get("field"), Some(&"amount".to_string()));
        assert_eq!(
            err.details.get("reason"),
            Some(&"must be positive".to_string())
        );
    }

    #[test]
    fn error_code_display_formats_correctly() {
        assert_eq!(
            format!("{}", ErrorCode::OverpaymentRejected),
            "OVERPAYMENT_REJECTED"
        );
        assert_eq!(
            format!("{}", ErrorCode::GatewayUnknownOutcome),
            "GATEWAY_UNKNOWN_OUTCOME"
        );
    }
}
