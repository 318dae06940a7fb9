//! In-memory implementation of the persistence ports.
//!
//! One shared store backs the reservation, ledger, cart and customer
//! ports so that the composite operations are atomic the same way a
//! database transaction makes them atomic: everything happens under one
//! write lock. Used by tests and local development.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::domain::foundation::{
    CartId, CartItemId, DomainError, ErrorCode, MembershipNumber, ReservationId, Timestamp,
    UserId,
};
use crate::domain::ledger::{Cart, CartItem, Charge};
use crate::domain::reservation::{Claim, Order, Reservation, ReservationState};
use crate::ports::{
    CartRepository, CustomerDirectory, LedgerRepository, NewReservation, ReservationRepository,
    TierChange,
};

#[derive(Default)]
struct Inner {
    reservations: HashMap<ReservationId, Reservation>,
    orders: Vec<Order>,
    claims: Vec<Claim>,
    charges: Vec<Charge>,
    carts: HashMap<CartId, Cart>,
    items: Vec<CartItem>,
    customers: HashMap<String, String>,
}

impl Inner {
    fn next_membership_number(&self) -> MembershipNumber {
        self.reservations
            .values()
            .map(|r| r.membership_number)
            .max()
            .map(|n| n.next())
            .unwrap_or(MembershipNumber::FIRST)
    }

    fn assert_number_free(&self, number: MembershipNumber) -> Result<(), DomainError> {
        if self
            .reservations
            .values()
            .any(|r| r.membership_number == number)
        {
            return Err(DomainError::new(
                ErrorCode::DatabaseError,
                format!("membership number {} already taken", number),
            ));
        }
        Ok(())
    }

    fn set_number(
        &mut self,
        id: ReservationId,
        number: MembershipNumber,
    ) -> Result<(), DomainError> {
        self.assert_number_free(number)?;
        let reservation = self
            .reservations
            .get_mut(&id)
            .ok_or_else(|| DomainError::new(ErrorCode::ReservationNotFound, id.to_string()))?;
        reservation.membership_number = number;
        Ok(())
    }

    fn active_order_mut(&mut self, id: ReservationId) -> Option<&mut Order> {
        self.orders
            .iter_mut()
            .find(|o| o.reservation_id == id && o.is_active())
    }

    fn active_claim_mut(&mut self, id: ReservationId) -> Option<&mut Claim> {
        self.claims
            .iter_mut()
            .find(|c| c.reservation_id == id && c.is_active())
    }
}

/// Shared in-memory store implementing the persistence ports.
#[derive(Default)]
pub struct InMemoryStore {
    inner: RwLock<Inner>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// All charges ever appended, for test assertions.
    pub async fn all_charges(&self) -> Vec<Charge> {
        self.inner.read().await.charges.clone()
    }

    /// All claims for a reservation, for test assertions.
    pub async fn claims_for(&self, id: ReservationId) -> Vec<Claim> {
        self.inner
            .read()
            .await
            .claims
            .iter()
            .filter(|c| c.reservation_id == id)
            .cloned()
            .collect()
    }
}

#[async_trait]
impl ReservationRepository for InMemoryStore {
    async fn insert_new(&self, new: NewReservation) -> Result<Reservation, DomainError> {
        // The write lock doubles as the pessimistic number-sequence lock.
        let mut inner = self.inner.write().await;

        let number = match new.membership_number {
            Some(explicit) => {
                inner.assert_number_free(explicit)?;
                explicit
            }
            None => inner.next_membership_number(),
        };

        let reservation = Reservation::new(ReservationId::new(), number, new.initial_state, new.at);
        let order = Order::open(reservation.id, new.tier_id, new.at);
        let mut claim = Claim::open(reservation.id, new.user_id, new.at);
        if let Some(contact) = new.contact {
            claim = claim.with_contact(contact);
        }

        inner.reservations.insert(reservation.id, reservation.clone());
        inner.orders.push(order);
        inner.claims.push(claim);
        Ok(reservation)
    }

    async fn find(&self, id: ReservationId) -> Result<Option<Reservation>, DomainError> {
        Ok(self.inner.read().await.reservations.get(&id).cloned())
    }

    async fn active_order(&self, id: ReservationId) -> Result<Option<Order>, DomainError> {
        Ok(self
            .inner
            .read()
            .await
            .orders
            .iter()
            .find(|o| o.reservation_id == id && o.is_active())
            .cloned())
    }

    async fn active_claim(&self, id: ReservationId) -> Result<Option<Claim>, DomainError> {
        Ok(self
            .inner
            .read()
            .await
            .claims
            .iter()
            .find(|c| c.reservation_id == id && c.is_active())
            .cloned())
    }

    async fn order_history(&self, id: ReservationId) -> Result<Vec<Order>, DomainError> {
        let inner = self.inner.read().await;
        let mut orders: Vec<Order> = inner
            .orders
            .iter()
            .filter(|o| o.reservation_id == id)
            .cloned()
            .collect();
        orders.sort_by_key(|o| o.active_from);
        Ok(orders)
    }

    async fn update_state(
        &self,
        id: ReservationId,
        state: ReservationState,
    ) -> Result<(), DomainError> {
        let mut inner = self.inner.write().await;
        let reservation = inner
            .reservations
            .get_mut(&id)
            .ok_or_else(|| DomainError::new(ErrorCode::ReservationNotFound, id.to_string()))?;
        reservation.transition_to(state)
    }

    async fn set_price_lock(&self, id: ReservationId, at: Timestamp) -> Result<(), DomainError> {
        let mut inner = self.inner.write().await;
        let reservation = inner
            .reservations
            .get_mut(&id)
            .ok_or_else(|| DomainError::new(ErrorCode::ReservationNotFound, id.to_string()))?;
        reservation.lock_price_at(at);
        Ok(())
    }

    async fn apply_tier_change(
        &self,
        id: ReservationId,
        change: TierChange,
    ) -> Result<Order, DomainError> {
        let mut inner = self.inner.write().await;

        let active = inner.active_order_mut(id).ok_or_else(|| {
            DomainError::new(
                ErrorCode::InvariantViolation,
                format!("reservation {} has no active order", id),
            )
        })?;
        active.close(change.at);

        let new_order = Order::open(id, change.new_tier_id, change.at);
        inner.orders.push(new_order.clone());

        let reservation = inner
            .reservations
            .get_mut(&id)
            .ok_or_else(|| DomainError::new(ErrorCode::ReservationNotFound, id.to_string()))?;
        if let Some(tier) = change.record_fully_paid_tier {
            reservation.record_fully_paid_tier(tier, change.at);
        }
        reservation.transition_to(change.new_state)?;

        Ok(new_order)
    }

    async fn swap_claim(
        &self,
        id: ReservationId,
        to_user: UserId,
        at: Timestamp,
        copy_contact: bool,
    ) -> Result<Claim, DomainError> {
        let mut inner = self.inner.write().await;

        let active = inner.active_claim_mut(id).ok_or_else(|| {
            DomainError::new(
                ErrorCode::InvariantViolation,
                format!("reservation {} has no active claim", id),
            )
        })?;
        let contact = active.contact.clone();
        active.close(at);

        let mut new_claim = Claim::open(id, to_user, at);
        if copy_contact {
            if let Some(contact) = contact {
                new_claim = new_claim.with_contact(contact);
            }
        }
        inner.claims.push(new_claim.clone());
        Ok(new_claim)
    }

    async fn merge_reservations(
        &self,
        keep: ReservationId,
        remove: ReservationId,
        at: Timestamp,
    ) -> Result<(), DomainError> {
        let mut inner = self.inner.write().await;

        let keep_number = inner
            .reservations
            .get(&keep)
            .map(|r| r.membership_number)
            .ok_or_else(|| DomainError::new(ErrorCode::ReservationNotFound, keep.to_string()))?;
        let remove_number = inner
            .reservations
            .get(&remove)
            .map(|r| r.membership_number)
            .ok_or_else(|| {
                DomainError::new(ErrorCode::ReservationNotFound, remove.to_string())
            })?;

        if let Some(claim) = inner.active_claim_mut(remove) {
            claim.close(at);
        }

        // The sentinel dance: numbers stay unique at every step.
        let low = keep_number.min(remove_number);
        let high = keep_number.max(remove_number);
        inner.set_number(remove, MembershipNumber::new(-1))?;
        inner.set_number(keep, MembershipNumber::new(-2))?;
        inner.set_number(remove, high)?;
        inner.set_number(keep, low)?;

        Ok(())
    }
}

#[async_trait]
impl LedgerRepository for InMemoryStore {
    async fn append(&self, charge: &Charge) -> Result<(), DomainError> {
        self.inner.write().await.charges.push(charge.clone());
        Ok(())
    }

    async fn append_with_states(
        &self,
        charge: &Charge,
        states: &[(ReservationId, ReservationState)],
    ) -> Result<(), DomainError> {
        let mut inner = self.inner.write().await;
        for (id, state) in states {
            let reservation = inner.reservations.get_mut(id).ok_or_else(|| {
                DomainError::new(ErrorCode::ReservationNotFound, id.to_string())
            })?;
            reservation.transition_to(*state)?;
        }
        inner.charges.push(charge.clone());
        Ok(())
    }

    async fn charges_for_reservation(
        &self,
        id: ReservationId,
    ) -> Result<Vec<Charge>, DomainError> {
        let inner = self.inner.read().await;
        let mut charges: Vec<Charge> = inner
            .charges
            .iter()
            .filter(|c| c.target.as_reservation() == Some(id))
            .cloned()
            .collect();
        charges.sort_by_key(|c| c.created_at);
        Ok(charges)
    }

    async fn charges_for_cart(&self, id: CartId) -> Result<Vec<Charge>, DomainError> {
        use crate::domain::ledger::PaymentTarget;
        let inner = self.inner.read().await;
        let mut charges: Vec<Charge> = inner
            .charges
            .iter()
            .filter(|c| c.target == PaymentTarget::cart(id))
            .cloned()
            .collect();
        charges.sort_by_key(|c| c.created_at);
        Ok(charges)
    }
}

#[async_trait]
impl CartRepository for InMemoryStore {
    async fn find_cart(&self, id: CartId) -> Result<Option<Cart>, DomainError> {
        Ok(self.inner.read().await.carts.get(&id).cloned())
    }

    async fn items_for_cart(&self, id: CartId) -> Result<Vec<CartItem>, DomainError> {
        let inner = self.inner.read().await;
        let mut items: Vec<CartItem> = inner
            .items
            .iter()
            .filter(|i| i.cart_id == id)
            .cloned()
            .collect();
        items.sort_by_key(|i| i.active_from);
        Ok(items)
    }

    async fn items_for_reservation(
        &self,
        id: ReservationId,
    ) -> Result<Vec<CartItem>, DomainError> {
        Ok(self
            .inner
            .read()
            .await
            .items
            .iter()
            .filter(|i| i.reservation_id == id)
            .cloned()
            .collect())
    }

    async fn insert_cart(&self, cart: &Cart) -> Result<(), DomainError> {
        self.inner.write().await.carts.insert(cart.id, cart.clone());
        Ok(())
    }

    async fn insert_item(&self, item: &CartItem) -> Result<(), DomainError> {
        self.inner.write().await.items.push(item.clone());
        Ok(())
    }

    async fn close_item(&self, id: CartItemId, at: Timestamp) -> Result<(), DomainError> {
        let mut inner = self.inner.write().await;
        let item = inner
            .items
            .iter_mut()
            .find(|i| i.id == id)
            .ok_or_else(|| DomainError::new(ErrorCode::CartNotFound, id.to_string()))?;
        item.close(at);
        Ok(())
    }
}

#[async_trait]
impl CustomerDirectory for InMemoryStore {
    async fn gateway_customer_id(&self, user_id: &UserId) -> Result<Option<String>, DomainError> {
        Ok(self
            .inner
            .read()
            .await
            .customers
            .get(user_id.as_str())
            .cloned())
    }

    async fn remember_gateway_customer(
        &self,
        user_id: &UserId,
        customer_id: &str,
    ) -> Result<(), DomainError> {
        self.inner
            .write()
            .await
            .customers
            .insert(user_id.as_str().to_string(), customer_id.to_string());
        Ok(())
    }
}
