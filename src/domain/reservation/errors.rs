//! Reservation-specific error types.
//!
//! Errors raised by the purchase, upgrade, transfer and merge commands.
//! Validation failures are reported to the caller with no partial state
//! change; invariant violations indicate a transaction-boundary bug and
//! are not recoverable.

use crate::domain::foundation::{DomainError, ErrorCode, ReservationId};

/// Reservation command errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReservationError {
    /// Reservation was not found.
    NotFound(ReservationId),

    /// The sender does not hold an active claim on the reservation.
    ///
    /// Deliberately vague so callers cannot probe which reservations
    /// exist.
    NotHeld,

    /// The claim or reservation is not transferable.
    NotTransferable { reason: String },

    /// No upgrade path from the current tier to the requested one.
    NoUpgradePath { from: String, to: String },

    /// The requested tier does not exist in the catalog.
    UnknownTier { tier_id: String },

    /// Merge candidates are held by different users.
    OwnershipMismatch,

    /// Merge requires exactly two reservations.
    WrongReservationCount { got: usize },

    /// An invariant the transaction boundaries should make impossible was
    /// observed (e.g. a claimed reservation without an active order).
    InvariantViolation { message: String },

    /// Infrastructure error.
    Infrastructure(String),
}

impl ReservationError {
    pub fn not_found(id: ReservationId) -> Self {
        ReservationError::NotFound(id)
    }

    pub fn not_held() -> Self {
        ReservationError::NotHeld
    }

    pub fn not_transferable(reason: impl Into<String>) -> Self {
        ReservationError::NotTransferable {
            reason: reason.into(),
        }
    }

    pub fn no_upgrade_path(from: impl Into<String>, to: impl Into<String>) -> Self {
        ReservationError::NoUpgradePath {
            from: from.into(),
            to: to.into(),
        }
    }

    pub fn unknown_tier(tier_id: impl Into<String>) -> Self {
        ReservationError::UnknownTier {
            tier_id: tier_id.into(),
        }
    }

    pub fn ownership_mismatch() -> Self {
        ReservationError::OwnershipMismatch
    }

    pub fn wrong_reservation_count(got: usize) -> Self {
        ReservationError::WrongReservationCount { got }
    }

    pub fn invariant_violation(message: impl Into<String>) -> Self {
        ReservationError::InvariantViolation {
            message: message.into(),
        }
    }

    pub fn infrastructure(message: impl Into<String>) -> Self {
        ReservationError::Infrastructure(message.into())
    }

    /// Returns the error code for this error.
    pub fn code(&self) -> ErrorCode {
        match self {
            ReservationError::NotFound(_) => ErrorCode::ReservationNotFound,
            ReservationError::NotHeld => ErrorCode::ReservationNotHeld,
            ReservationError::NotTransferable { .. } => ErrorCode::ReservationDisabled,
            ReservationError::NoUpgradePath { .. } => ErrorCode::NoUpgradePath,
            ReservationError::UnknownTier { .. } => ErrorCode::TierNotFound,
            ReservationError::OwnershipMismatch => ErrorCode::OwnershipMismatch,
            ReservationError::WrongReservationCount { .. } => ErrorCode::ValidationFailed,
            ReservationError::InvariantViolation { .. } => ErrorCode::InvariantViolation,
            ReservationError::Infrastructure(_) => ErrorCode::DatabaseError,
        }
    }

    /// Returns a user-friendly error message.
    pub fn message(&self) -> String {
        match self {
            ReservationError::NotFound(id) => format!("Reservation not found: {}", id),
            ReservationError::NotHeld => "reservation not held".to_string(),
            ReservationError::NotTransferable { reason } => reason.clone(),
            ReservationError::NoUpgradePath { from, to } => {
                format!("{} cannot upgrade to {}", from, to)
            }
            ReservationError::UnknownTier { tier_id } => {
                format!("Tier not found: {}", tier_id)
            }
            ReservationError::OwnershipMismatch => {
                "memberships need to be owned by the same user".to_string()
            }
            ReservationError::WrongReservationCount { got } => {
                format!("merge needs exactly 2 reservations, got {}", got)
            }
            ReservationError::InvariantViolation { message } => message.clone(),
            ReservationError::Infrastructure(msg) => format!("Error: {}", msg),
        }
    }
}

impl std::fmt::Display for ReservationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl std::error::Error for ReservationError {}

impl From<DomainError> for ReservationError {
    fn from(err: DomainError) -> Self {
        match err.code {
            ErrorCode::ReservationNotFound => {
                ReservationError::Infrastructure(err.to_string())
            }
            ErrorCode::InvariantViolation => ReservationError::InvariantViolation {
                message: err.message,
            },
            _ => ReservationError::Infrastructure(err.to_string()),
        }
    }
}

impl From<ReservationError> for DomainError {
    fn from(err: ReservationError) -> Self {
        DomainError::new(err.code(), err.message())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_held_is_deliberately_vague() {
        let err = ReservationError::not_held();
        assert_eq!(err.message(), "reservation not held");
        assert_eq!(err.code(), ErrorCode::ReservationNotHeld);
    }

    #[test]
    fn no_upgrade_path_names_both_tiers() {
        let err = ReservationError::no_upgrade_path("adult", "supporting");
        assert_eq!(err.message(), "adult cannot upgrade to supporting");
        assert_eq!(err.code(), ErrorCode::NoUpgradePath);
    }

    #[test]
    fn wrong_count_reports_got() {
        let err = ReservationError::wrong_reservation_count(3);
        assert!(err.message().contains("got 3"));
        assert_eq!(err.code(), ErrorCode::ValidationFailed);
    }

    #[test]
    fn ownership_mismatch_message_matches_support_wording() {
        let err = ReservationError::ownership_mismatch();
        assert_eq!(
            err.message(),
            "memberships need to be owned by the same user"
        );
    }

    #[test]
    fn converts_to_domain_error() {
        let err = ReservationError::ownership_mismatch();
        let domain_err: DomainError = err.clone().into();
        assert_eq!(domain_err.code, err.code());
    }
}
