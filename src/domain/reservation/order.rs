//! Orders: time-bounded links between a reservation and a tier.
//!
//! An order records which tier a reservation is (or was) held at. Exactly
//! one order is active per reservation at any instant; an upgrade closes
//! the old order and opens the new one at the same timestamp, so the
//! order history doubles as the tier-change audit trail. Instalment
//! payments keep flowing against a tier even after the store stops
//! selling it.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{OrderId, ReservationId, TierId, Timestamp};

/// Link between a reservation and the tier it is held at.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub reservation_id: ReservationId,
    pub tier_id: TierId,
    pub active_from: Timestamp,
    pub active_to: Option<Timestamp>,
}

impl Order {
    /// Opens a new active order at `active_from`.
    pub fn open(reservation_id: ReservationId, tier_id: TierId, active_from: Timestamp) -> Self {
        Self {
            id: OrderId::new(),
            reservation_id,
            tier_id,
            active_from,
            active_to: None,
        }
    }

    /// True while the order has not been closed.
    pub fn is_active(&self) -> bool {
        self.active_to.is_none()
    }

    /// Closes the order at `at`.
    pub fn close(&mut self, at: Timestamp) {
        self.active_to = Some(at);
    }

    /// True when the order was active at `at` (half-open window).
    pub fn active_at(&self, at: Timestamp) -> bool {
        if at < self.active_from {
            return false;
        }
        match self.active_to {
            Some(to) => at < to,
            None => true,
        }
    }
}
