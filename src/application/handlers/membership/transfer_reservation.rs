//! TransferReservationHandler - moves a held membership between users.
//!
//! Closes the sender's claim and opens one for the receiver at the same
//! instant. Charges and payment history are never touched: they hang off
//! the reservation, which is exactly why the balance calculator keys off
//! reservations and not users.

use std::sync::Arc;

use crate::domain::foundation::{ReservationId, Timestamp, UserId};
use crate::domain::reservation::{Claim, ReservationError};
use crate::ports::{AuditLog, ReservationRepository};

/// Command to transfer a reservation between users.
#[derive(Debug, Clone)]
pub struct TransferReservationCommand {
    pub reservation_id: ReservationId,
    pub from_user: UserId,
    pub to_user: UserId,

    /// Support operator applying the transfer, for the audit trail.
    pub audit_actor: String,

    /// Duplicate the sender's contact details onto the new claim.
    pub copy_contact: bool,
}

/// Handler for membership transfers.
pub struct TransferReservationHandler {
    reservations: Arc<dyn ReservationRepository>,
    audit: Arc<dyn AuditLog>,
}

impl TransferReservationHandler {
    pub fn new(reservations: Arc<dyn ReservationRepository>, audit: Arc<dyn AuditLog>) -> Self {
        Self {
            reservations,
            audit,
        }
    }

    pub async fn handle(
        &self,
        cmd: TransferReservationCommand,
    ) -> Result<Claim, ReservationError> {
        let now = Timestamp::now();

        // An unknown reservation and a reservation the sender does not
        // hold answer identically, so callers cannot probe for existence.
        let Some(reservation) = self.reservations.find(cmd.reservation_id).await? else {
            return Err(ReservationError::not_held());
        };
        let Some(claim) = self.reservations.active_claim(cmd.reservation_id).await? else {
            return Err(ReservationError::not_held());
        };
        if claim.user_id != cmd.from_user {
            return Err(ReservationError::not_held());
        }

        if !claim.transferable() {
            return Err(ReservationError::not_transferable(
                "claim is not transferable",
            ));
        }
        if !reservation.transferable() {
            return Err(ReservationError::not_transferable(
                "reservation is not transferable",
            ));
        }

        // Both parties get the note; best-effort.
        let note = format!(
            "{} transferred {} from {} to {}",
            cmd.audit_actor, reservation.membership_number, cmd.from_user, cmd.to_user
        );
        for user in [&cmd.from_user, &cmd.to_user] {
            if let Err(err) = self.audit.record_note(user, &note).await {
                tracing::warn!(error = %err, "audit note for transfer failed");
            }
        }

        let new_claim = self
            .reservations
            .swap_claim(cmd.reservation_id, cmd.to_user, now, cmd.copy_contact)
            .await?;

        Ok(new_claim)
    }
}
