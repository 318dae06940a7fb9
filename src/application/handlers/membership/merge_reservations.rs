//! MergeReservationsHandler - collapses two memberships into one.
//!
//! Defined only for exactly two reservations held by the same user. The
//! keeper is the one holding the pricier current tier; it ends up with
//! the lower of the two badge numbers, the discarded reservation's claim
//! is closed, and the number swap runs through negative sentinels so the
//! uniqueness constraint never trips mid-transaction.
//!
//! The discarded reservation's charge history stays where it is; see
//! DESIGN.md for why that is recorded as a known limitation rather than
//! silently changed.

use std::sync::Arc;

use crate::domain::foundation::{ReservationId, Timestamp};
use crate::domain::reservation::ReservationError;
use crate::ports::{CatalogRepository, ReservationRepository};

/// Command to merge two reservations held by one user.
#[derive(Debug, Clone)]
pub struct MergeReservationsCommand {
    pub reservation_ids: Vec<ReservationId>,
}

/// Result of a successful merge.
#[derive(Debug, Clone)]
pub struct MergeOutcome {
    /// The surviving reservation, now carrying the lower number.
    pub kept: ReservationId,

    /// The discarded reservation, claim closed, carrying the higher
    /// number.
    pub removed: ReservationId,
}

/// Handler for reservation merges.
pub struct MergeReservationsHandler {
    reservations: Arc<dyn ReservationRepository>,
    catalog: Arc<dyn CatalogRepository>,
}

impl MergeReservationsHandler {
    pub fn new(
        reservations: Arc<dyn ReservationRepository>,
        catalog: Arc<dyn CatalogRepository>,
    ) -> Self {
        Self {
            reservations,
            catalog,
        }
    }

    pub async fn handle(
        &self,
        cmd: MergeReservationsCommand,
    ) -> Result<MergeOutcome, ReservationError> {
        let now = Timestamp::now();

        let (first_id, second_id) = match cmd.reservation_ids.as_slice() {
            &[first, second] => (first, second),
            other => {
                return Err(ReservationError::wrong_reservation_count(other.len()));
            }
        };

        let first = self
            .reservations
            .find(first_id)
            .await?
            .ok_or(ReservationError::NotFound(first_id))?;
        let second = self
            .reservations
            .find(second_id)
            .await?
            .ok_or(ReservationError::NotFound(second_id))?;

        // Same holder, via the active claims.
        let first_claim = self.reservations.active_claim(first_id).await?;
        let second_claim = self.reservations.active_claim(second_id).await?;
        match (&first_claim, &second_claim) {
            (Some(a), Some(b)) if a.user_id == b.user_id => {}
            _ => return Err(ReservationError::ownership_mismatch()),
        }

        // The pricier current tier survives; ties keep the first
        // supplied.
        let catalog = self.catalog.load().await?;
        let first_price = self.current_tier_price(&catalog, first_id, &first).await?;
        let second_price = self.current_tier_price(&catalog, second_id, &second).await?;

        let second_is_pricier = matches!(
            second_price.compare(first_price),
            Ok(std::cmp::Ordering::Greater)
        );
        let (keep, remove) = if second_is_pricier {
            (second_id, first_id)
        } else {
            (first_id, second_id)
        };

        self.reservations
            .merge_reservations(keep, remove, now)
            .await?;

        Ok(MergeOutcome {
            kept: keep,
            removed: remove,
        })
    }

    async fn current_tier_price(
        &self,
        catalog: &crate::domain::catalog::MembershipCatalog,
        id: ReservationId,
        reservation: &crate::domain::reservation::Reservation,
    ) -> Result<crate::domain::foundation::Money, ReservationError> {
        let order = self.reservations.active_order(id).await?.ok_or_else(|| {
            ReservationError::invariant_violation(format!(
                "reservation {} has no active order",
                reservation.membership_number
            ))
        })?;
        let tier = catalog.tier(order.tier_id).ok_or_else(|| {
            ReservationError::invariant_violation(format!(
                "order {} references unknown tier {}",
                order.id, order.tier_id
            ))
        })?;
        Ok(tier.price)
    }
}
