//! Carts: several memberships paid for together.
//!
//! A cart aggregates items, each pointing at the reservation being bought
//! and the tier price listed when it was added. One charge against the
//! cart settles items collectively, so the balance calculator needs a
//! deterministic rule for how much of each cart payment belongs to each
//! reservation.
//!
//! Attribution rule: each successful cart charge is allocated across the
//! cart's items in insertion order, up to each item's listed price,
//! counting only items whose acquisition window covers the charge
//! instant. Reassigning an item closes its window, so money paid while it
//! belonged to one reservation is never re-counted for another.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{
    CartId, CartItemId, Currency, Money, MoneyError, ReservationId, TierId, Timestamp, UserId,
};

use super::{Charge, PaymentTarget};

/// A shopping cart owned by one user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cart {
    pub id: CartId,
    pub user_id: UserId,
    pub created_at: Timestamp,
}

impl Cart {
    /// Opens an empty cart.
    pub fn new(user_id: UserId, created_at: Timestamp) -> Self {
        Self {
            id: CartId::new(),
            user_id,
            created_at,
        }
    }
}

/// One membership acquisition held in a cart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartItem {
    pub id: CartItemId,
    pub cart_id: CartId,
    pub reservation_id: ReservationId,
    pub tier_id: TierId,

    /// Tier price listed when the item was added; the cart sells at the
    /// listed price even if the catalog moves later.
    pub listed_price: Money,

    pub active_from: Timestamp,
    pub active_to: Option<Timestamp>,
}

impl CartItem {
    /// Adds an acquisition to `cart` at the listed price.
    pub fn new(
        cart_id: CartId,
        reservation_id: ReservationId,
        tier_id: TierId,
        listed_price: Money,
        active_from: Timestamp,
    ) -> Self {
        Self {
            id: CartItemId::new(),
            cart_id,
            reservation_id,
            tier_id,
            listed_price,
            active_from,
            active_to: None,
        }
    }

    /// True when the item's acquisition window covers `at`.
    pub fn active_at(&self, at: Timestamp) -> bool {
        if at < self.active_from {
            return false;
        }
        match self.active_to {
            Some(to) => at < to,
            None => true,
        }
    }

    /// Closes the window, e.g. when the item is reassigned.
    pub fn close(&mut self, at: Timestamp) {
        self.active_to = Some(at);
    }
}

/// A slice of a cart payment attributed to one reservation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartCredit {
    pub reservation_id: ReservationId,
    pub amount: Money,

    /// When the underlying cart charge happened; balance proration
    /// filters on this.
    pub charged_at: Timestamp,
}

/// Result of attributing a cart's successful charges to its items.
#[derive(Debug, Clone, PartialEq)]
pub struct CartAttribution {
    /// Per-reservation slices, in allocation order.
    pub credits: Vec<CartCredit>,

    /// Money paid against the cart that no active item could absorb.
    pub unallocated: Money,
}

impl CartAttribution {
    /// Total credited to `reservation_id`.
    pub fn credited_to(&self, reservation_id: ReservationId) -> Result<Money, MoneyError> {
        Money::sum(
            self.unallocated.currency(),
            self.credits
                .iter()
                .filter(|c| c.reservation_id == reservation_id)
                .map(|c| c.amount),
        )
    }
}

/// Attributes the successful charges against a cart to its items.
///
/// Charges are processed oldest first; within a charge, items absorb
/// money in the order they were added to the cart, each up to its listed
/// price. Charges that do not target the cart, or failed, are ignored.
///
/// # Errors
///
/// Returns `CurrencyMismatch` when an item price or charge amount is not
/// in `currency`.
pub fn attribute_cart_charges(
    currency: Currency,
    cart_id: CartId,
    items: &[CartItem],
    charges: &[Charge],
) -> Result<CartAttribution, MoneyError> {
    for item in items {
        // Surface mismatched listings before any allocation.
        Money::zero(currency).add(item.listed_price)?;
    }

    let mut capacity: Vec<i64> = items.iter().map(|i| i.listed_price.minor_units()).collect();
    let mut credits = Vec::new();
    let mut unallocated = 0i64;

    let mut cart_charges: Vec<&Charge> = charges
        .iter()
        .filter(|c| c.is_successful() && c.target == PaymentTarget::cart(cart_id))
        .collect();
    cart_charges.sort_by_key(|c| c.created_at);

    for charge in cart_charges {
        Money::zero(currency).add(charge.amount)?;
        let mut remaining = charge.amount.minor_units();

        for (index, item) in items.iter().enumerate() {
            if remaining == 0 {
                break;
            }
            if !item.active_at(charge.created_at) {
                continue;
            }
            let take = remaining.min(capacity[index]);
            if take > 0 {
                credits.push(CartCredit {
                    reservation_id: item.reservation_id,
                    amount: Money::new(take, currency),
                    charged_at: charge.created_at,
                });
                capacity[index] -= take;
                remaining -= take;
            }
        }

        unallocated += remaining;
    }

    Ok(CartAttribution {
        credits,
        unallocated: Money::new(unallocated, currency),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::{ChargeId, UserId};
    use crate::domain::ledger::PaymentMethod;

    fn nzd(cents: i64) -> Money {
        Money::new(cents, Currency::Nzd)
    }

    fn user() -> UserId {
        UserId::new("buyer").unwrap()
    }

    fn cart_charge(cart_id: CartId, cents: i64, at: u64) -> Charge {
        Charge::successful(
            ChargeId::new(),
            PaymentTarget::cart(cart_id),
            user(),
            nzd(cents),
            PaymentMethod::Card,
            "cart payment",
            Timestamp::from_unix_secs(at),
        )
        .unwrap()
    }

    fn item(cart_id: CartId, cents: i64, from: u64) -> CartItem {
        CartItem::new(
            cart_id,
            ReservationId::new(),
            TierId::new(),
            nzd(cents),
            Timestamp::from_unix_secs(from),
        )
    }

    #[test]
    fn single_charge_fills_items_in_order() {
        let cart = Cart::new(user(), Timestamp::from_unix_secs(0));
        let items = vec![item(cart.id, 75_00, 0), item(cart.id, 105_00, 0)];
        let charges = vec![cart_charge(cart.id, 180_00, 10)];

        let attribution =
            attribute_cart_charges(Currency::Nzd, cart.id, &items, &charges).unwrap();

        assert_eq!(
            attribution.credited_to(items[0].reservation_id).unwrap(),
            nzd(75_00)
        );
        assert_eq!(
            attribution.credited_to(items[1].reservation_id).unwrap(),
            nzd(105_00)
        );
        assert!(attribution.unallocated.is_zero());
    }

    #[test]
    fn partial_charge_fills_first_item_first() {
        let cart = Cart::new(user(), Timestamp::from_unix_secs(0));
        let items = vec![item(cart.id, 75_00, 0), item(cart.id, 105_00, 0)];
        let charges = vec![cart_charge(cart.id, 100_00, 10)];

        let attribution =
            attribute_cart_charges(Currency::Nzd, cart.id, &items, &charges).unwrap();

        assert_eq!(
            attribution.credited_to(items[0].reservation_id).unwrap(),
            nzd(75_00)
        );
        assert_eq!(
            attribution.credited_to(items[1].reservation_id).unwrap(),
            nzd(25_00)
        );
    }

    #[test]
    fn closed_item_window_excludes_later_charges() {
        let cart = Cart::new(user(), Timestamp::from_unix_secs(0));
        let mut reassigned = item(cart.id, 75_00, 0);
        reassigned.close(Timestamp::from_unix_secs(5));
        let current = item(cart.id, 75_00, 5);
        let items = vec![reassigned.clone(), current.clone()];
        let charges = vec![cart_charge(cart.id, 75_00, 10)];

        let attribution =
            attribute_cart_charges(Currency::Nzd, cart.id, &items, &charges).unwrap();

        assert!(attribution
            .credited_to(reassigned.reservation_id)
            .unwrap()
            .is_zero());
        assert_eq!(
            attribution.credited_to(current.reservation_id).unwrap(),
            nzd(75_00)
        );
    }

    #[test]
    fn overpayment_lands_in_unallocated() {
        let cart = Cart::new(user(), Timestamp::from_unix_secs(0));
        let items = vec![item(cart.id, 75_00, 0)];
        let charges = vec![cart_charge(cart.id, 100_00, 10)];

        let attribution =
            attribute_cart_charges(Currency::Nzd, cart.id, &items, &charges).unwrap();

        assert_eq!(attribution.unallocated, nzd(25_00));
    }

    #[test]
    fn failed_and_foreign_charges_are_ignored() {
        let cart = Cart::new(user(), Timestamp::from_unix_secs(0));
        let other_cart = Cart::new(user(), Timestamp::from_unix_secs(0));
        let items = vec![item(cart.id, 75_00, 0)];

        let failed = Charge::failed(
            ChargeId::new(),
            PaymentTarget::cart(cart.id),
            user(),
            nzd(75_00),
            PaymentMethod::Card,
            "declined",
            Timestamp::from_unix_secs(10),
        )
        .unwrap();
        let foreign = cart_charge(other_cart.id, 75_00, 10);

        let attribution =
            attribute_cart_charges(Currency::Nzd, cart.id, &items, &[failed, foreign]).unwrap();

        assert!(attribution.credits.is_empty());
        assert!(attribution.unallocated.is_zero());
    }

    #[test]
    fn charges_allocate_oldest_first() {
        let cart = Cart::new(user(), Timestamp::from_unix_secs(0));
        let items = vec![item(cart.id, 75_00, 0)];
        // Supplied newest first; allocation must still begin with the
        // older charge.
        let newer = cart_charge(cart.id, 50_00, 20);
        let older = cart_charge(cart.id, 50_00, 10);

        let attribution =
            attribute_cart_charges(Currency::Nzd, cart.id, &items, &[newer, older]).unwrap();

        assert_eq!(attribution.credits.len(), 2);
        assert_eq!(
            attribution.credits[0].charged_at,
            Timestamp::from_unix_secs(10)
        );
        assert_eq!(attribution.credits[0].amount, nzd(50_00));
        assert_eq!(attribution.credits[1].amount, nzd(25_00));
        assert_eq!(attribution.unallocated, nzd(25_00));
    }
}
