//! Claims: time-bounded ownership of a reservation by a user.
//!
//! Exactly one claim is active per claimed reservation. A transfer closes
//! the sender's claim and opens one for the receiver at the same instant;
//! the claim history shows who held a membership when, which matters when
//! considering a refund for a membership no longer held by its payer.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{ClaimId, ReservationId, Timestamp, UserId};

/// Contact details attached to a claim.
///
/// Duplicated onto the receiver's claim when a transfer asks for it; the
/// variant schemas the deployments used are collapsed into one plain
/// record here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactDetail {
    pub name: String,
    pub email: String,
}

/// Link between a reservation and the user holding it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claim {
    pub id: ClaimId,
    pub reservation_id: ReservationId,
    pub user_id: UserId,
    pub active_from: Timestamp,
    pub active_to: Option<Timestamp>,
    pub contact: Option<ContactDetail>,
}

impl Claim {
    /// Opens a new active claim at `active_from`.
    pub fn open(reservation_id: ReservationId, user_id: UserId, active_from: Timestamp) -> Self {
        Self {
            id: ClaimId::new(),
            reservation_id,
            user_id,
            active_from,
            active_to: None,
            contact: None,
        }
    }

    /// True while the claim has not been closed.
    pub fn is_active(&self) -> bool {
        self.active_to.is_none()
    }

    /// A claim can only be transferred while it is still active.
    pub fn transferable(&self) -> bool {
        self.active_to.is_none()
    }

    /// Closes the claim at `at`.
    pub fn close(&mut self, at: Timestamp) {
        self.active_to = Some(at);
    }

    /// Attaches contact details.
    pub fn with_contact(mut self, contact: ContactDetail) -> Self {
        self.contact = Some(contact);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn claim() -> Claim {
        Claim::open(
            ReservationId::new(),
            UserId::new("user-1").unwrap(),
            Timestamp::from_unix_secs(100),
        )
    }

    #[test]
    fn open_claim_is_active_and_transferable() {
        let claim = claim();
        assert!(claim.is_active());
        assert!(claim.transferable());
    }

    #[test]
    fn closed_claim_is_not_transferable() {
        let mut claim = claim();
        claim.close(Timestamp::from_unix_secs(200));
        assert!(!claim.is_active());
        assert!(!claim.transferable());
    }

    #[test]
    fn contact_can_be_attached() {
        let claim = claim().with_contact(ContactDetail {
            name: "Ada".to_string(),
            email: "ada@example.com".to_string(),
        });
        assert_eq!(claim.contact.unwrap().name, "Ada");
    }
}
