//! Reservation payment-state machine.

use serde::{Deserialize, Serialize};

/// Payment state of a reservation.
///
/// Set exclusively by the balance calculator and payment orchestrator
/// (and the purchase/upgrade commands that re-run them); nothing else may
/// flip these.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReservationState {
    /// Partially paid; instalments still owing.
    Instalment,

    /// Fully paid off.
    Paid,

    /// Hidden from holders, not transferable. Reservations are never
    /// deleted, only disabled.
    Disabled,
}

impl ReservationState {
    /// Whether the state machine allows moving to `target`.
    ///
    /// `Instalment` and `Paid` flow into each other freely (an upgrade can
    /// put a paid reservation back on instalments); `Disabled` is entered
    /// from anywhere and never left.
    pub fn can_transition_to(&self, target: ReservationState) -> bool {
        match (self, target) {
            (ReservationState::Disabled, ReservationState::Disabled) => true,
            (ReservationState::Disabled, _) => false,
            (_, _) => true,
        }
    }

    /// Returns the display name for this state.
    pub fn display_name(&self) -> &'static str {
        match self {
            ReservationState::Instalment => "instalment",
            ReservationState::Paid => "paid",
            ReservationState::Disabled => "disabled",
        }
    }
}

impl std::fmt::Display for ReservationState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}
