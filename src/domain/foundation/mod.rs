//! Foundation module - Shared domain primitives.
//!
//! Contains value objects, identifiers, money arithmetic, and error types
//! that form the vocabulary of the registration domain.

mod errors;
mod ids;
mod money;
mod timestamp;

pub use errors::{DomainError, ErrorCode, ValidationError};
pub use ids::{
    CartId, CartItemId, ChargeId, ClaimId, MembershipNumber, OrderId, ReservationId, TierId,
    UserId,
};
pub use money::{Currency, Money, MoneyError};
pub use timestamp::Timestamp;
