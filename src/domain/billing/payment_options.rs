//! Instalment payment amount options.
//!
//! Holders paying a membership off over time pick from a fixed menu:
//! the minimum payment, then steps of $50, with the exact balance always
//! the final option.

use crate::domain::foundation::Money;

/// Minimum instalment payment, in minor units. Matches the cheapest
/// supporting membership, so one successful payment always covers one.
pub const MIN_PAYMENT_MINOR_UNITS: i64 = 75_00;

/// Step between offered amounts, in minor units.
pub const PAYMENT_STEP_MINOR_UNITS: i64 = 50_00;

/// The amounts a holder may pay toward an outstanding balance.
#[derive(Debug, Clone, PartialEq)]
pub struct PaymentAmountOptions {
    amount_owed: Money,
}

impl PaymentAmountOptions {
    /// Builds the menu for an outstanding balance.
    pub fn new(amount_owed: Money) -> Self {
        Self { amount_owed }
    }

    /// Offered amounts, ascending; empty when nothing is owed.
    pub fn amounts(&self) -> Vec<Money> {
        let owed = self.amount_owed.minor_units();
        let currency = self.amount_owed.currency();
        let minimum = owed.min(MIN_PAYMENT_MINOR_UNITS);
        if minimum <= 0 {
            return Vec::new();
        }

        let mut amounts: Vec<Money> = (minimum..owed)
            .step_by(PAYMENT_STEP_MINOR_UNITS as usize)
            .map(|cents| Money::new(cents, currency))
            .collect();
        let exact = Money::new(owed, currency);
        if amounts.last() != Some(&exact) {
            amounts.push(exact);
        }
        amounts
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::Currency;

    fn nzd(cents: i64) -> Money {
        Money::new(cents, Currency::Nzd)
    }

    #[test]
    fn nothing_owed_offers_nothing() {
        assert!(PaymentAmountOptions::new(nzd(0)).amounts().is_empty());
        assert!(PaymentAmountOptions::new(nzd(-10)).amounts().is_empty());
    }

    #[test]
    fn menu_steps_from_minimum_to_exact_balance() {
        let amounts = PaymentAmountOptions::new(nzd(225_00)).amounts();
        assert_eq!(
            amounts,
            vec![nzd(75_00), nzd(125_00), nzd(175_00), nzd(225_00)]
        );
    }

    #[test]
    fn small_balances_offer_only_the_exact_amount() {
        let amounts = PaymentAmountOptions::new(nzd(40_00)).amounts();
        assert_eq!(amounts, vec![nzd(40_00)]);
    }

    #[test]
    fn step_landing_exactly_on_balance_is_not_duplicated() {
        let amounts = PaymentAmountOptions::new(nzd(175_00)).amounts();
        assert_eq!(amounts, vec![nzd(75_00), nzd(125_00), nzd(175_00)]);
    }
}
