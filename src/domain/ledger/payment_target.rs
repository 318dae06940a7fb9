//! What a ledger charge was made against.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{CartId, ReservationId};

/// The buyable a charge targets: one reservation directly, or a cart of
/// items paid together. The balance calculator consumes both uniformly
/// instead of merging two association paths ad hoc.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PaymentTarget {
    /// Charge made directly against a reservation.
    Reservation { reservation_id: ReservationId },

    /// Charge made against a cart; attributed across its items.
    Cart { cart_id: CartId },
}

impl PaymentTarget {
    /// Convenience constructor for the direct case.
    pub fn reservation(reservation_id: ReservationId) -> Self {
        PaymentTarget::Reservation { reservation_id }
    }

    /// Convenience constructor for the cart case.
    pub fn cart(cart_id: CartId) -> Self {
        PaymentTarget::Cart { cart_id }
    }

    /// The reservation id when this is a direct target.
    pub fn as_reservation(&self) -> Option<ReservationId> {
        match self {
            PaymentTarget::Reservation { reservation_id } => Some(*reservation_id),
            PaymentTarget::Cart { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn direct_target_exposes_reservation() {
        let id = ReservationId::new();
        let target = PaymentTarget::reservation(id);
        assert_eq!(target.as_reservation(), Some(id));
    }

    #[test]
    fn cart_target_is_not_a_reservation() {
        let target = PaymentTarget::cart(CartId::new());
        assert_eq!(target.as_reservation(), None);
    }

    #[test]
    fn serializes_with_kind_tag() {
        let json = serde_json::to_string(&PaymentTarget::cart(CartId::new())).unwrap();
        assert!(json.contains("\"kind\":\"cart\""));
    }
}
