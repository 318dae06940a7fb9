//! PurchaseMembershipHandler - issues a new reservation to a buyer.
//!
//! Creates the reservation, its first order and its first claim in one
//! transaction. Badge numbers come out of the repository's pessimistic
//! lock on the numbering sequence, so two concurrent purchases can never
//! be handed the same number.

use std::sync::Arc;

use crate::domain::foundation::{MembershipNumber, TierId, Timestamp, UserId};
use crate::domain::reservation::{ContactDetail, Reservation, ReservationError, ReservationState};
use crate::ports::{CatalogRepository, NewReservation, ReservationRepository};

/// Command to purchase a membership.
#[derive(Debug, Clone)]
pub struct PurchaseMembershipCommand {
    pub user_id: UserId,
    pub tier_id: TierId,

    /// Contact details for the first claim.
    pub contact: Option<ContactDetail>,

    /// Explicit badge number for imports; `None` issues the next one.
    pub membership_number: Option<MembershipNumber>,
}

/// Handler for membership purchases.
pub struct PurchaseMembershipHandler {
    reservations: Arc<dyn ReservationRepository>,
    catalog: Arc<dyn CatalogRepository>,
}

impl PurchaseMembershipHandler {
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
        cmd: PurchaseMembershipCommand,
    ) -> Result<Reservation, ReservationError> {
        let catalog = self.catalog.load().await?;
        let tier = catalog
            .tier(cmd.tier_id)
            .ok_or_else(|| ReservationError::unknown_tier(cmd.tier_id.to_string()))?;

        // Free tiers have nothing to pay off.
        let initial_state = if tier.price.is_zero() {
            ReservationState::Paid
        } else {
            ReservationState::Instalment
        };

        let reservation = self
            .reservations
            .insert_new(NewReservation {
                tier_id: tier.id,
                user_id: cmd.user_id,
                initial_state,
                membership_number: cmd.membership_number,
                contact: cmd.contact,
                at: Timestamp::now(),
            })
            .await?;

        Ok(reservation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::{InMemoryCatalog, InMemoryStore};

    struct Harness {
        handler: PurchaseMembershipHandler,
        store: Arc<InMemoryStore>,
        catalog: Arc<InMemoryCatalog>,
    }

    fn harness() -> Harness {
        let store = Arc::new(InMemoryStore::new());
        let catalog = Arc::new(InMemoryCatalog::with_default_tiers(
            Timestamp::from_unix_secs(0),
        ));
        let handler = PurchaseMembershipHandler::new(store.clone(), catalog.clone());
        Harness {
            handler,
            store,
            catalog,
        }
    }

    fn command(tier_id: TierId) -> PurchaseMembershipCommand {
        PurchaseMembershipCommand {
            user_id: UserId::new("buyer").unwrap(),
            tier_id,
            contact: None,
            membership_number: None,
        }
    }

    #[tokio::test]
    async fn paid_tier_starts_on_instalments() {
        let harness = harness();
        let adult = harness.catalog.tier_by_name("adult").await.unwrap();

        let reservation = harness.handler.handle(command(adult.id)).await.unwrap();
        assert_eq!(reservation.state, ReservationState::Instalment);
        assert_eq!(reservation.membership_number, MembershipNumber::FIRST);
    }

    #[tokio::test]
    async fn free_tier_starts_paid() {
        let harness = harness();
        let kid = harness.catalog.tier_by_name("kid_in_tow").await.unwrap();

        let reservation = harness.handler.handle(command(kid.id)).await.unwrap();
        assert_eq!(reservation.state, ReservationState::Paid);
    }

    #[tokio::test]
    async fn purchase_opens_order_and_claim() {
        let harness = harness();
        let adult = harness.catalog.tier_by_name("adult").await.unwrap();

        let reservation = harness.handler.handle(command(adult.id)).await.unwrap();

        let order = harness
            .store
            .active_order(reservation.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(order.tier_id, adult.id);
        let claim = harness
            .store
            .active_claim(reservation.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(claim.user_id.as_str(), "buyer");
    }

    #[tokio::test]
    async fn numbers_ascend_across_purchases() {
        let harness = harness();
        let adult = harness.catalog.tier_by_name("adult").await.unwrap();

        let first = harness.handler.handle(command(adult.id)).await.unwrap();
        let second = harness.handler.handle(command(adult.id)).await.unwrap();
        assert!(second.membership_number > first.membership_number);
    }

    #[tokio::test]
    async fn unknown_tier_is_rejected() {
        let harness = harness();
        let result = harness.handler.handle(command(TierId::new())).await;
        assert!(matches!(result, Err(ReservationError::UnknownTier { .. })));
    }
}
