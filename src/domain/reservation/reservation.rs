//! Reservation aggregate entity.
//!
//! A Reservation represents one purchased or held membership instance.
//! Users are associated through [`Claim`](super::Claim) rows, tiers
//! through [`Order`](super::Order) rows; the reservation itself carries
//! the badge number and the payment state.
//!
//! # Design Decisions
//!
//! - **Ascending numbers**: `membership_number` values are unique and
//!   issued in ascending order under a pessimistic lock.
//! - **Never deleted**: a dead reservation is marked `Disabled`.
//! - **Balance-driven state**: `Instalment`/`Paid` follow the balance
//!   calculator, nothing else.
//! - **Proration baseline**: `last_fully_paid_tier` records the tier that
//!   was settled in full before an upgrade, so later upgrades are priced
//!   as deltas. Once set it is never cleared, only moved to an
//!   equal-or-higher-priced tier.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{
    DomainError, ErrorCode, MembershipNumber, ReservationId, TierId, Timestamp,
};

use super::ReservationState;

/// One purchased or held membership instance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reservation {
    /// Unique identifier for this reservation.
    pub id: ReservationId,

    /// Badge number, unique and ascending.
    pub membership_number: MembershipNumber,

    /// Payment state, driven by the balance calculator.
    pub state: ReservationState,

    /// When set, balance calculations price the current tier as of this
    /// historical instant instead of now.
    pub price_lock_date: Option<Timestamp>,

    /// Tier last settled in full, the baseline for upgrade proration.
    pub last_fully_paid_tier: Option<TierId>,

    /// When the baseline was recorded; payments from this instant on
    /// count toward a prorated balance.
    pub last_fully_paid_at: Option<Timestamp>,

    /// When the reservation was created.
    pub created_at: Timestamp,
}

impl Reservation {
    /// Creates a reservation in the given initial state.
    ///
    /// Zero-priced tiers start `Paid`, everything else `Instalment`; that
    /// choice belongs to the purchase command, not here.
    pub fn new(
        id: ReservationId,
        membership_number: MembershipNumber,
        state: ReservationState,
        created_at: Timestamp,
    ) -> Self {
        Self {
            id,
            membership_number,
            state,
            price_lock_date: None,
            last_fully_paid_tier: None,
            last_fully_paid_at: None,
            created_at,
        }
    }

    /// True unless the reservation has been disabled.
    pub fn transferable(&self) -> bool {
        self.state != ReservationState::Disabled
    }

    /// True when fully paid.
    pub fn paid(&self) -> bool {
        self.state == ReservationState::Paid
    }

    /// True while instalments are still owing.
    pub fn instalment(&self) -> bool {
        self.state == ReservationState::Instalment
    }

    /// True once disabled.
    pub fn disabled(&self) -> bool {
        self.state == ReservationState::Disabled
    }

    /// Moves to `target`, enforcing the state machine.
    ///
    /// # Errors
    ///
    /// Returns `InvalidStateTransition` when the move is not allowed
    /// (only leaving `Disabled` is).
    pub fn transition_to(&mut self, target: ReservationState) -> Result<(), DomainError> {
        if !self.state.can_transition_to(target) {
            return Err(DomainError::new(
                ErrorCode::InvalidStateTransition,
                format!(
                    "Cannot transition reservation {} from {} to {}",
                    self.membership_number, self.state, target
                ),
            ));
        }
        self.state = target;
        Ok(())
    }

    /// Freezes balance calculations to tier prices as of `at`.
    pub fn lock_price_at(&mut self, at: Timestamp) {
        self.price_lock_date = Some(at);
    }

    /// Records `tier` as the proration baseline, settled as of `at`.
    ///
    /// The caller has already established the reservation was settled in
    /// full at `tier` and that `tier` is not cheaper than any existing
    /// baseline; this just records it.
    pub fn record_fully_paid_tier(&mut self, tier: TierId, at: Timestamp) {
        self.last_fully_paid_tier = Some(tier);
        self.last_fully_paid_at = Some(at);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reservation(state: ReservationState) -> Reservation {
        Reservation::new(
            ReservationId::new(),
            MembershipNumber::new(100),
            state,
            Timestamp::from_unix_secs(0),
        )
    }

    #[test]
    fn instalment_reservation_is_transferable() {
        assert!(reservation(ReservationState::Instalment).transferable());
        assert!(reservation(ReservationState::Paid).transferable());
    }

    #[test]
    fn disabled_reservation_is_not_transferable() {
        assert!(!reservation(ReservationState::Disabled).transferable());
    }

    #[test]
    fn paid_can_return_to_instalment() {
        // An upgrade reopens the balance.
        let mut res = reservation(ReservationState::Paid);
        assert!(res.transition_to(ReservationState::Instalment).is_ok());
        assert!(res.instalment());
    }

    #[test]
    fn disabled_cannot_be_revived() {
        let mut res = reservation(ReservationState::Disabled);
        let result = res.transition_to(ReservationState::Paid);
        assert!(result.is_err());
        assert_eq!(
            result.unwrap_err().code,
            ErrorCode::InvalidStateTransition
        );
        assert!(res.disabled());
    }

    #[test]
    fn price_lock_records_instant() {
        let mut res = reservation(ReservationState::Instalment);
        let at = Timestamp::from_unix_secs(12345);
        res.lock_price_at(at);
        assert_eq!(res.price_lock_date, Some(at));
    }

    #[test]
    fn fully_paid_tier_is_recorded_with_its_instant() {
        let mut res = reservation(ReservationState::Paid);
        let tier = TierId::new();
        let at = Timestamp::from_unix_secs(500);
        res.record_fully_paid_tier(tier, at);
        assert_eq!(res.last_fully_paid_tier, Some(tier));
        assert_eq!(res.last_fully_paid_at, Some(at));
    }
}
