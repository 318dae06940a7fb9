//! The balance calculator.
//!
//! Pure arithmetic over assembled inputs: given the effective tier price,
//! the charge history and any cart credits, how much is still owed on a
//! reservation right now. Assembling those inputs from storage is the
//! application layer's job ([`BalanceQuery`](crate::application::handlers::billing::BalanceQuery));
//! keeping the arithmetic pure keeps every invariant testable without a
//! database.
//!
//! # Algorithm
//!
//! 1. The effective price is the tier linked by the active order, or the
//!    price that tier's name had at `price_lock_date` when a lock is set.
//! 2. Already-paid is the sum of successful charges against the
//!    reservation plus cart payments attributed to it while its cart item
//!    was active.
//! 3. When a proration baseline exists (a previously settled tier
//!    different from the current one), the owed amount is the price delta
//!    over that baseline minus only the payments made since the baseline
//!    was settled; the baseline stands in for everything paid before it.
//! 4. The result is clamped at zero. Failed charges never participate.

use crate::domain::foundation::{Currency, Money, MoneyError, Timestamp};
use crate::domain::ledger::{successful_total, CartAttribution, CartCredit, Charge, CartItem};

/// Everything the calculator needs to price one reservation.
#[derive(Debug, Clone)]
pub struct BalanceSheet {
    /// Price of the reservation's current tier (price-locked when set).
    pub effective_price: Money,

    /// Price of the last fully paid tier, present only when it differs
    /// from the current tier.
    pub proration_baseline: Option<Money>,

    /// When the baseline was settled; payments at or after this instant
    /// count toward a prorated balance. Ignored while no baseline is set.
    pub proration_since: Timestamp,

    /// Charges made directly against the reservation.
    pub direct_charges: Vec<Charge>,

    /// Cart payment slices attributed to the reservation.
    pub cart_credits: Vec<CartCredit>,
}

impl BalanceSheet {
    /// Total successfully paid toward this reservation, ever.
    pub fn amount_paid(&self) -> Result<Money, MoneyError> {
        let currency = self.currency();
        let direct = successful_total(currency, &self.direct_charges)?;
        let carts = Money::sum(currency, self.cart_credits.iter().map(|c| c.amount))?;
        direct.add(carts)
    }

    /// Amount still owed, clamped at zero.
    pub fn amount_owed(&self) -> Result<Money, MoneyError> {
        let owed = match self.proration_baseline {
            Some(baseline) => {
                let delta = self.effective_price.subtract(baseline)?;
                delta.subtract(self.paid_since(self.proration_since)?)?
            }
            None => self.effective_price.subtract(self.amount_paid()?)?,
        };
        Ok(owed.max_zero())
    }

    fn currency(&self) -> Currency {
        self.effective_price.currency()
    }

    fn paid_since(&self, since: Timestamp) -> Result<Money, MoneyError> {
        let currency = self.currency();
        let direct = successful_total(
            currency,
            self.direct_charges
                .iter()
                .filter(|c| c.created_at >= since),
        )?;
        let carts = Money::sum(
            currency,
            self.cart_credits
                .iter()
                .filter(|c| c.charged_at >= since)
                .map(|c| c.amount),
        )?;
        direct.add(carts)
    }
}

/// Amount still owed on a whole cart: listed item prices minus the cart
/// payments already attributed (and any unallocated surplus), clamped at
/// zero.
pub fn cart_amount_owed(
    currency: Currency,
    items: &[CartItem],
    attribution: &CartAttribution,
) -> Result<Money, MoneyError> {
    let listed = Money::sum(currency, items.iter().map(|i| i.listed_price))?;
    let credited = Money::sum(currency, attribution.credits.iter().map(|c| c.amount))?;
    let owed = listed
        .subtract(credited)?
        .subtract(attribution.unallocated)?;
    Ok(owed.max_zero())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::{ChargeId, ReservationId, UserId};
    use crate::domain::ledger::{PaymentMethod, PaymentTarget};
    use proptest::prelude::*;

    fn nzd(cents: i64) -> Money {
        Money::new(cents, Currency::Nzd)
    }

    fn at(secs: u64) -> Timestamp {
        Timestamp::from_unix_secs(secs)
    }

    fn charge(cents: i64, succeeded: bool, secs: u64) -> Charge {
        let id = ChargeId::new();
        let target = PaymentTarget::reservation(ReservationId::new());
        let user = UserId::new("payer").unwrap();
        if succeeded {
            Charge::successful(id, target, user, nzd(cents), PaymentMethod::Card, "payment", at(secs))
                .unwrap()
        } else {
            Charge::failed(id, target, user, nzd(cents), PaymentMethod::Card, "declined", at(secs))
                .unwrap()
        }
    }

    fn sheet(price: i64, charges: Vec<Charge>) -> BalanceSheet {
        BalanceSheet {
            effective_price: nzd(price),
            proration_baseline: None,
            proration_since: at(0),
            direct_charges: charges,
            cart_credits: vec![],
        }
    }

    #[test]
    fn unpaid_reservation_owes_full_price() {
        assert_eq!(sheet(370_00, vec![]).amount_owed().unwrap(), nzd(370_00));
    }

    #[test]
    fn successful_charges_reduce_the_balance() {
        let sheet = sheet(225_00, vec![charge(50_00, true, 10), charge(50_00, true, 20)]);
        assert_eq!(sheet.amount_owed().unwrap(), nzd(125_00));
    }

    #[test]
    fn failed_charges_are_invisible() {
        let with_failure = sheet(
            225_00,
            vec![charge(50_00, true, 10), charge(225_00, false, 20)],
        );
        let without = sheet(225_00, vec![charge(50_00, true, 10)]);
        assert_eq!(
            with_failure.amount_owed().unwrap(),
            without.amount_owed().unwrap()
        );
    }

    #[test]
    fn balance_never_goes_negative() {
        let sheet = sheet(75_00, vec![charge(75_00, true, 10), charge(10_00, true, 20)]);
        assert!(sheet.amount_owed().unwrap().is_zero());
    }

    #[test]
    fn proration_prices_upgrade_as_delta() {
        // Fully paid $75 tier, upgraded to a $225 tier at t=100.
        let sheet = BalanceSheet {
            effective_price: nzd(225_00),
            proration_baseline: Some(nzd(75_00)),
            proration_since: at(100),
            direct_charges: vec![charge(75_00, true, 10)],
            cart_credits: vec![],
        };
        assert_eq!(sheet.amount_owed().unwrap(), nzd(150_00));
    }

    #[test]
    fn payments_after_upgrade_reduce_prorated_balance() {
        let sheet = BalanceSheet {
            effective_price: nzd(225_00),
            proration_baseline: Some(nzd(75_00)),
            proration_since: at(100),
            direct_charges: vec![charge(75_00, true, 10), charge(50_00, true, 200)],
            cart_credits: vec![],
        };
        assert_eq!(sheet.amount_owed().unwrap(), nzd(100_00));
    }

    #[test]
    fn pre_upgrade_payments_do_not_double_count_with_baseline() {
        // The baseline already stands in for the $75 paid before the
        // upgrade; counting that charge again would undercharge.
        let sheet = BalanceSheet {
            effective_price: nzd(225_00),
            proration_baseline: Some(nzd(75_00)),
            proration_since: at(100),
            direct_charges: vec![charge(75_00, true, 10)],
            cart_credits: vec![],
        };
        assert_eq!(sheet.amount_owed().unwrap(), nzd(150_00));
    }

    #[test]
    fn cart_credits_count_toward_balance() {
        let reservation_id = ReservationId::new();
        let sheet = BalanceSheet {
            effective_price: nzd(105_00),
            proration_baseline: None,
            proration_since: at(0),
            direct_charges: vec![],
            cart_credits: vec![CartCredit {
                reservation_id,
                amount: nzd(40_00),
                charged_at: at(10),
            }],
        };
        assert_eq!(sheet.amount_owed().unwrap(), nzd(65_00));
    }

    #[test]
    fn cart_credits_before_upgrade_are_subsumed_by_baseline() {
        let reservation_id = ReservationId::new();
        let sheet = BalanceSheet {
            effective_price: nzd(225_00),
            proration_baseline: Some(nzd(75_00)),
            proration_since: at(100),
            direct_charges: vec![],
            cart_credits: vec![
                CartCredit {
                    reservation_id,
                    amount: nzd(75_00),
                    charged_at: at(10),
                },
                CartCredit {
                    reservation_id,
                    amount: nzd(30_00),
                    charged_at: at(150),
                },
            ],
        };
        assert_eq!(sheet.amount_owed().unwrap(), nzd(120_00));
    }

    #[test]
    fn currency_mismatch_is_surfaced() {
        let mut sheet = sheet(225_00, vec![charge(50_00, true, 10)]);
        sheet.direct_charges[0].amount = Money::new(50_00, Currency::Usd);
        assert!(sheet.amount_owed().is_err());
    }

    proptest! {
        // Adding a failed charge never changes the amount owed, for any
        // mix of prior successes and failures.
        #[test]
        fn failed_charges_never_affect_owed(
            price in 0i64..500_00,
            paid in proptest::collection::vec((0i64..200_00, any::<bool>()), 0..8),
            failed_amount in 0i64..500_00,
        ) {
            let charges: Vec<Charge> = paid
                .iter()
                .enumerate()
                .map(|(i, (cents, ok))| charge(*cents, *ok, i as u64))
                .collect();

            let before = sheet(price, charges.clone()).amount_owed().unwrap();

            let mut with_failure = charges;
            with_failure.push(charge(failed_amount, false, 999));
            let after = sheet(price, with_failure).amount_owed().unwrap();

            prop_assert_eq!(before, after);
        }

        // More successful payment never increases what is owed.
        #[test]
        fn owed_is_monotone_in_payments(
            price in 0i64..500_00,
            first in 0i64..200_00,
            second in 0i64..200_00,
        ) {
            let one = sheet(price, vec![charge(first, true, 1)]).amount_owed().unwrap();
            let two = sheet(price, vec![charge(first, true, 1), charge(second, true, 2)])
                .amount_owed()
                .unwrap();
            prop_assert!(two.compare(one).unwrap() != std::cmp::Ordering::Greater);
        }
    }
}
