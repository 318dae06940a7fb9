//! BalanceQuery - assembles balance sheets from storage.
//!
//! The balance calculator itself is pure ([`BalanceSheet`]); this query
//! gathers its inputs: the effective tier price (honoring price locks),
//! the proration baseline, the direct charge history, and cart payments
//! attributed to the reservation. Every other handler that needs "how
//! much is owed right now" goes through here.

use std::sync::Arc;

use crate::domain::billing::{cart_amount_owed, BalanceSheet, BillingError, PaymentAmountOptions};
use crate::domain::catalog::MembershipCatalog;
use crate::domain::foundation::{CartId, Money, ReservationId};
use crate::domain::ledger::{attribute_cart_charges, CartCredit};
use crate::domain::reservation::{Order, Reservation};
use crate::ports::{CartRepository, CatalogRepository, LedgerRepository, ReservationRepository};

/// Query service computing amounts owed.
pub struct BalanceQuery {
    reservations: Arc<dyn ReservationRepository>,
    ledger: Arc<dyn LedgerRepository>,
    catalog: Arc<dyn CatalogRepository>,
    carts: Arc<dyn CartRepository>,
}

impl BalanceQuery {
    pub fn new(
        reservations: Arc<dyn ReservationRepository>,
        ledger: Arc<dyn LedgerRepository>,
        catalog: Arc<dyn CatalogRepository>,
        carts: Arc<dyn CartRepository>,
    ) -> Self {
        Self {
            reservations,
            ledger,
            catalog,
            carts,
        }
    }

    /// Amount still owed on a reservation, clamped at zero.
    ///
    /// # Errors
    ///
    /// - `ReservationNotFound` for unknown ids
    /// - `InvariantViolation` when the reservation has no active order
    ///   (callers must guarantee one exists)
    pub async fn amount_owed(&self, reservation_id: ReservationId) -> Result<Money, BillingError> {
        let sheet = self.balance_sheet(reservation_id).await?;
        Ok(sheet.amount_owed()?)
    }

    /// The instalment amounts currently offered for a reservation.
    pub async fn payment_options(
        &self,
        reservation_id: ReservationId,
    ) -> Result<PaymentAmountOptions, BillingError> {
        let owed = self.amount_owed(reservation_id).await?;
        Ok(PaymentAmountOptions::new(owed))
    }

    /// Amount still owed across a whole cart.
    pub async fn amount_owed_for_cart(&self, cart_id: CartId) -> Result<Money, BillingError> {
        let cart = self
            .carts
            .find_cart(cart_id)
            .await?
            .ok_or(BillingError::CartNotFound(cart_id))?;
        let items = self.carts.items_for_cart(cart.id).await?;
        let charges = self.ledger.charges_for_cart(cart.id).await?;

        let currency = match items.first() {
            Some(item) => item.listed_price.currency(),
            None => return Err(BillingError::invariant_violation("cart has no items")),
        };
        let attribution = attribute_cart_charges(currency, cart.id, &items, &charges)?;
        Ok(cart_amount_owed(currency, &items, &attribution)?)
    }

    /// Assembles the full balance sheet for a reservation.
    pub async fn balance_sheet(
        &self,
        reservation_id: ReservationId,
    ) -> Result<BalanceSheet, BillingError> {
        let reservation = self
            .reservations
            .find(reservation_id)
            .await?
            .ok_or(BillingError::ReservationNotFound(reservation_id))?;
        let order = self
            .reservations
            .active_order(reservation_id)
            .await?
            .ok_or_else(|| {
                BillingError::invariant_violation(format!(
                    "reservation {} has no active order",
                    reservation.membership_number
                ))
            })?;
        let catalog = self.catalog.load().await?;

        let effective_price = effective_price(&catalog, &reservation, &order)?;
        let proration_baseline = proration_baseline(&catalog, &reservation, &order)?;
        let direct_charges = self.ledger.charges_for_reservation(reservation_id).await?;
        let cart_credits = self
            .cart_credits_for(reservation_id, effective_price.currency())
            .await?;

        Ok(BalanceSheet {
            effective_price,
            proration_baseline,
            proration_since: reservation.last_fully_paid_at.unwrap_or(order.active_from),
            direct_charges,
            cart_credits,
        })
    }

    /// Cart payment slices attributed to a reservation, across every cart
    /// that ever held an item for it.
    async fn cart_credits_for(
        &self,
        reservation_id: ReservationId,
        currency: crate::domain::foundation::Currency,
    ) -> Result<Vec<CartCredit>, BillingError> {
        let own_items = self.carts.items_for_reservation(reservation_id).await?;
        let mut cart_ids: Vec<CartId> = Vec::new();
        for item in &own_items {
            if !cart_ids.contains(&item.cart_id) {
                cart_ids.push(item.cart_id);
            }
        }

        let mut credits = Vec::new();
        for cart_id in cart_ids {
            let items = self.carts.items_for_cart(cart_id).await?;
            let charges = self.ledger.charges_for_cart(cart_id).await?;
            let attribution = attribute_cart_charges(currency, cart_id, &items, &charges)?;
            credits.extend(
                attribution
                    .credits
                    .into_iter()
                    .filter(|c| c.reservation_id == reservation_id),
            );
        }
        Ok(credits)
    }
}

/// Tier price the balance is computed against: the active order's tier,
/// priced as of the price-lock instant when one is set.
fn effective_price(
    catalog: &MembershipCatalog,
    reservation: &Reservation,
    order: &Order,
) -> Result<Money, BillingError> {
    let current_tier = catalog.tier(order.tier_id).ok_or_else(|| {
        BillingError::invariant_violation(format!(
            "order {} references unknown tier {}",
            order.id, order.tier_id
        ))
    })?;

    if let Some(lock) = reservation.price_lock_date {
        // No row covering the lock instant means the name post-dates the
        // lock; the current row's price stands.
        if let Some(locked) = catalog.active_at(&current_tier.name, lock) {
            return Ok(locked.price);
        }
    }
    Ok(current_tier.price)
}

/// The last fully paid tier's price, when it differs from the current
/// tier.
fn proration_baseline(
    catalog: &MembershipCatalog,
    reservation: &Reservation,
    order: &Order,
) -> Result<Option<Money>, BillingError> {
    let Some(baseline_id) = reservation.last_fully_paid_tier else {
        return Ok(None);
    };
    if baseline_id == order.tier_id {
        return Ok(None);
    }
    let baseline = catalog.tier(baseline_id).ok_or_else(|| {
        BillingError::invariant_violation(format!(
            "reservation {} references unknown fully-paid tier {}",
            reservation.membership_number, baseline_id
        ))
    })?;
    Ok(Some(baseline.price))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::{InMemoryCatalog, InMemoryStore};
    use crate::domain::foundation::{ChargeId, Currency, Timestamp, UserId};
    use crate::domain::ledger::{Charge, PaymentMethod, PaymentTarget};
    use crate::domain::reservation::ReservationState;
    use crate::ports::NewReservation;

    fn nzd(cents: i64) -> Money {
        Money::new(cents, Currency::Nzd)
    }

    async fn setup() -> (BalanceQuery, Arc<InMemoryStore>, Arc<InMemoryCatalog>) {
        let store = Arc::new(InMemoryStore::new());
        let catalog = Arc::new(InMemoryCatalog::with_default_tiers(
            Timestamp::from_unix_secs(0),
        ));
        let query = BalanceQuery::new(
            store.clone(),
            store.clone(),
            catalog.clone(),
            store.clone(),
        );
        (query, store, catalog)
    }

    async fn reserve(
        store: &InMemoryStore,
        catalog: &InMemoryCatalog,
        tier_name: &str,
    ) -> crate::domain::reservation::Reservation {
        let tier = catalog.tier_by_name(tier_name).await.unwrap();
        store
            .insert_new(NewReservation {
                tier_id: tier.id,
                user_id: UserId::new("holder").unwrap(),
                initial_state: ReservationState::Instalment,
                membership_number: None,
                contact: None,
                at: Timestamp::from_unix_secs(10),
            })
            .await
            .unwrap()
    }

    async fn pay(store: &InMemoryStore, reservation_id: ReservationId, cents: i64, at: u64) {
        let charge = Charge::successful(
            ChargeId::new(),
            PaymentTarget::reservation(reservation_id),
            UserId::new("holder").unwrap(),
            nzd(cents),
            PaymentMethod::Card,
            "payment",
            Timestamp::from_unix_secs(at),
        )
        .unwrap();
        store.append(&charge).await.unwrap();
    }

    #[tokio::test]
    async fn new_reservation_owes_tier_price() {
        let (query, store, catalog) = setup().await;
        let reservation = reserve(&store, &catalog, "adult").await;

        let owed = query.amount_owed(reservation.id).await.unwrap();
        assert_eq!(owed, nzd(370_00));
    }

    #[tokio::test]
    async fn unknown_reservation_is_reported() {
        let (query, _, _) = setup().await;
        let result = query.amount_owed(ReservationId::new()).await;
        assert!(matches!(result, Err(BillingError::ReservationNotFound(_))));
    }

    #[tokio::test]
    async fn payments_reduce_owed() {
        let (query, store, catalog) = setup().await;
        let reservation = reserve(&store, &catalog, "young_adult").await;
        pay(&store, reservation.id, 50_00, 20).await;
        pay(&store, reservation.id, 50_00, 30).await;

        let owed = query.amount_owed(reservation.id).await.unwrap();
        assert_eq!(owed, nzd(125_00));
    }

    #[tokio::test]
    async fn price_lock_uses_historical_tier_price() {
        let (query, store, catalog) = setup().await;
        let reservation = reserve(&store, &catalog, "adult").await;

        // Price rises at t=1000; the reservation locked at t=500.
        catalog
            .amend_price("adult", nzd(400_00), Timestamp::from_unix_secs(1000))
            .await
            .unwrap();
        store
            .set_price_lock(reservation.id, Timestamp::from_unix_secs(500))
            .await
            .unwrap();

        let owed = query.amount_owed(reservation.id).await.unwrap();
        assert_eq!(owed, nzd(370_00));
    }

    #[tokio::test]
    async fn payment_options_step_toward_balance() {
        let (query, store, catalog) = setup().await;
        let reservation = reserve(&store, &catalog, "young_adult").await;

        let options = query.payment_options(reservation.id).await.unwrap();
        assert_eq!(
            options.amounts(),
            vec![nzd(75_00), nzd(125_00), nzd(175_00), nzd(225_00)]
        );
    }
}
