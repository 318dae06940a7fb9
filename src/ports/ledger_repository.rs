//! Ledger repository port.
//!
//! The charge table is append-only: rows are inserted, never updated or
//! deleted, and reads need no locking. The one subtlety is that a
//! successful charge and the reservation state it implies must land in
//! the same transaction, or a concurrent balance read could see a charge
//! without its state flip (or the reverse).

use async_trait::async_trait;

use crate::domain::foundation::{CartId, DomainError, ReservationId};
use crate::domain::ledger::Charge;
use crate::domain::reservation::ReservationState;

/// Repository port for the charge ledger.
#[async_trait]
pub trait LedgerRepository: Send + Sync {
    /// Appends a charge row with no side effects. Used for failed
    /// attempts, which never change reservation state.
    async fn append(&self, charge: &Charge) -> Result<(), DomainError>;

    /// Appends a charge row and sets each listed reservation's state, all
    /// in one transaction. Used for successful charges; `states` carries
    /// one entry for a direct charge and one per cart member for a cart
    /// charge.
    async fn append_with_states(
        &self,
        charge: &Charge,
        states: &[(ReservationId, ReservationState)],
    ) -> Result<(), DomainError>;

    /// Every charge targeting the reservation directly, oldest first.
    async fn charges_for_reservation(
        &self,
        id: ReservationId,
    ) -> Result<Vec<Charge>, DomainError>;

    /// Every charge targeting the cart, oldest first.
    async fn charges_for_cart(&self, id: CartId) -> Result<Vec<Charge>, DomainError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    // Trait object safety test
    #[test]
    fn ledger_repository_is_object_safe() {
        fn _accepts_dyn(_repo: &dyn LedgerRepository) {}
    }
}
