//! Reservation repository port.
//!
//! Persistence for reservations and their order/claim history. The
//! composite methods exist because of the transaction boundaries the
//! domain needs: a concurrent reader must never observe a reservation
//! with two active orders, two active claims, or a half-done number swap.
//! Each composite method is one database transaction in real adapters.

use async_trait::async_trait;

use crate::domain::foundation::{
    DomainError, MembershipNumber, ReservationId, TierId, Timestamp, UserId,
};
use crate::domain::reservation::{Claim, ContactDetail, Order, Reservation, ReservationState};

/// Input for issuing a brand-new reservation.
#[derive(Debug, Clone)]
pub struct NewReservation {
    /// Tier the first order links to.
    pub tier_id: TierId,

    /// User the first claim links to.
    pub user_id: UserId,

    /// `Paid` for zero-priced tiers, `Instalment` otherwise.
    pub initial_state: ReservationState,

    /// Explicit badge number (imports); `None` to issue the next one.
    pub membership_number: Option<MembershipNumber>,

    /// Contact details attached to the first claim.
    pub contact: Option<ContactDetail>,

    /// Instant the reservation, order and claim all activate.
    pub at: Timestamp,
}

/// Input for an atomic tier change (upgrade / support override).
#[derive(Debug, Clone)]
pub struct TierChange {
    /// Tier the replacement order links to.
    pub new_tier_id: TierId,

    /// Proration baseline to persist, when the pre-change tier was
    /// settled in full. `None` leaves the stored baseline untouched.
    pub record_fully_paid_tier: Option<TierId>,

    /// Payment state after the change, computed against the new tier.
    pub new_state: ReservationState,

    /// Instant the old order closes and the new one opens.
    pub at: Timestamp,
}

/// Repository port for reservation persistence.
#[async_trait]
pub trait ReservationRepository: Send + Sync {
    /// Issues a new reservation with its first order and claim.
    ///
    /// Implementations hold a pessimistic lock on the numbering sequence
    /// while computing the next membership number, so concurrent
    /// purchases can never be handed the same number. One transaction.
    ///
    /// # Errors
    ///
    /// - `DatabaseError` on persistence failure (including an explicit
    ///   number colliding with an existing one)
    async fn insert_new(&self, new: NewReservation) -> Result<Reservation, DomainError>;

    /// Find a reservation by its id. Returns `None` if not found.
    async fn find(&self, id: ReservationId) -> Result<Option<Reservation>, DomainError>;

    /// The reservation's active order, if it has one.
    async fn active_order(&self, id: ReservationId) -> Result<Option<Order>, DomainError>;

    /// The reservation's active claim, if it is currently held.
    async fn active_claim(&self, id: ReservationId) -> Result<Option<Claim>, DomainError>;

    /// Full order history, oldest first.
    async fn order_history(&self, id: ReservationId) -> Result<Vec<Order>, DomainError>;

    /// Sets the payment state.
    async fn update_state(
        &self,
        id: ReservationId,
        state: ReservationState,
    ) -> Result<(), DomainError>;

    /// Freezes balance pricing to tier prices as of `at`.
    async fn set_price_lock(&self, id: ReservationId, at: Timestamp) -> Result<(), DomainError>;

    /// Applies a tier change: closes the active order, opens one for the
    /// new tier at the same instant, persists the proration baseline and
    /// the recomputed state. One transaction.
    ///
    /// Returns the newly opened order.
    async fn apply_tier_change(
        &self,
        id: ReservationId,
        change: TierChange,
    ) -> Result<Order, DomainError>;

    /// Transfers the active claim to `to_user`: closes the old claim and
    /// opens the new one at the same instant, duplicating the old claim's
    /// contact details when `copy_contact` is set. One transaction.
    ///
    /// Returns the newly opened claim.
    async fn swap_claim(
        &self,
        id: ReservationId,
        to_user: UserId,
        at: Timestamp,
        copy_contact: bool,
    ) -> Result<Claim, DomainError>;

    /// Merges `remove` into `keep`: closes `remove`'s active claim, then
    /// swaps membership numbers through negative sentinels so the unique
    /// constraint never trips; `keep` ends with the lower of the two
    /// numbers. One transaction.
    async fn merge_reservations(
        &self,
        keep: ReservationId,
        remove: ReservationId,
        at: Timestamp,
    ) -> Result<(), DomainError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    // Trait object safety test
    #[test]
    fn reservation_repository_is_object_safe() {
        fn _accepts_dyn(_repo: &dyn ReservationRepository) {}
    }
}
