//! Exact money arithmetic over integer minor units.
//!
//! Every monetary value in the system flows through this type: tier
//! prices, charge amounts, balances owed. Amounts are stored as `i64`
//! minor units (cents) with an explicit currency code; no floating point
//! is involved at any stage of a calculation, only display formatting
//! divides by 100.
//!
//! # Design Decisions
//!
//! - **Fallible arithmetic**: `add`/`subtract` return `Result` and refuse
//!   to combine different currencies instead of silently coercing.
//! - **Signed**: intermediate "amount still owed" deltas can go negative;
//!   callers clamp with [`Money::max_zero`]. Persisted ledger amounts are
//!   validated non-negative at `Charge` construction.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use thiserror::Error;

/// Currency codes accepted by the platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Currency {
    /// New Zealand dollar.
    Nzd,
    /// United States dollar.
    Usd,
    /// Euro.
    Eur,
}

impl Currency {
    /// Returns the uppercase ISO 4217 code.
    pub fn code(&self) -> &'static str {
        match self {
            Currency::Nzd => "NZD",
            Currency::Usd => "USD",
            Currency::Eur => "EUR",
        }
    }

    /// Returns the lowercase code the gateway API expects.
    pub fn gateway_code(&self) -> &'static str {
        match self {
            Currency::Nzd => "nzd",
            Currency::Usd => "usd",
            Currency::Eur => "eur",
        }
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Errors from money arithmetic.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MoneyError {
    #[error("cannot combine {left} with {right}")]
    CurrencyMismatch { left: Currency, right: Currency },
}

/// An exact amount of money in a single currency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Money {
    minor_units: i64,
    currency: Currency,
}

impl Money {
    /// Creates an amount from minor units (cents).
    pub const fn new(minor_units: i64, currency: Currency) -> Self {
        Self {
            minor_units,
            currency,
        }
    }

    /// Zero in the given currency.
    pub const fn zero(currency: Currency) -> Self {
        Self::new(0, currency)
    }

    /// Returns the amount in minor units.
    pub const fn minor_units(&self) -> i64 {
        self.minor_units
    }

    /// Returns the currency.
    pub const fn currency(&self) -> Currency {
        self.currency
    }

    /// True when the amount is exactly zero.
    pub const fn is_zero(&self) -> bool {
        self.minor_units == 0
    }

    /// True when the amount is greater than zero.
    pub const fn is_positive(&self) -> bool {
        self.minor_units > 0
    }

    /// True when the amount is less than zero.
    pub const fn is_negative(&self) -> bool {
        self.minor_units < 0
    }

    /// Adds another amount of the same currency.
    ///
    /// # Errors
    ///
    /// Returns `CurrencyMismatch` when the currencies differ.
    pub fn add(&self, other: Money) -> Result<Money, MoneyError> {
        self.check_currency(other)?;
        Ok(Money::new(self.minor_units + other.minor_units, self.currency))
    }

    /// Subtracts another amount of the same currency.
    ///
    /// The result may be negative; balance calculations clamp at the end,
    /// not per step.
    ///
    /// # Errors
    ///
    /// Returns `CurrencyMismatch` when the currencies differ.
    pub fn subtract(&self, other: Money) -> Result<Money, MoneyError> {
        self.check_currency(other)?;
        Ok(Money::new(self.minor_units - other.minor_units, self.currency))
    }

    /// Compares two amounts of the same currency.
    ///
    /// # Errors
    ///
    /// Returns `CurrencyMismatch` when the currencies differ.
    pub fn compare(&self, other: Money) -> Result<Ordering, MoneyError> {
        self.check_currency(other)?;
        Ok(self.minor_units.cmp(&other.minor_units))
    }

    /// Clamps negative amounts to zero.
    pub fn max_zero(&self) -> Money {
        if self.minor_units < 0 {
            Money::zero(self.currency)
        } else {
            *self
        }
    }

    /// Sums an iterator of amounts, starting from zero in `currency`.
    ///
    /// # Errors
    ///
    /// Returns `CurrencyMismatch` on the first amount in a different
    /// currency.
    pub fn sum<I>(currency: Currency, amounts: I) -> Result<Money, MoneyError>
    where
        I: IntoIterator<Item = Money>,
    {
        let mut total = Money::zero(currency);
        for amount in amounts {
            total = total.add(amount)?;
        }
        Ok(total)
    }

    /// Formats as `"$370.00 NZD"`.
    ///
    /// The only place minor units become major.minor; everything upstream
    /// stays integral.
    pub fn format(&self) -> String {
        let sign = if self.minor_units < 0 { "-" } else { "" };
        let abs = self.minor_units.abs();
        format!(
            "{}${}.{:02} {}",
            sign,
            abs / 100,
            abs % 100,
            self.currency.code()
        )
    }

    fn check_currency(&self, other: Money) -> Result<(), MoneyError> {
        if self.currency != other.currency {
            return Err(MoneyError::CurrencyMismatch {
                left: self.currency,
                right: other.currency,
            });
        }
        Ok(())
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn nzd(cents: i64) -> Money {
        Money::new(cents, Currency::Nzd)
    }

    #[test]
    fn add_same_currency() {
        let total = nzd(100_00).add(nzd(25_50)).unwrap();
        assert_eq!(total, nzd(125_50));
    }

    #[test]
    fn add_rejects_currency_mismatch() {
        let result = nzd(100).add(Money::new(100, Currency::Usd));
        assert_eq!(
            result,
            Err(MoneyError::CurrencyMismatch {
                left: Currency::Nzd,
                right: Currency::Usd,
            })
        );
    }

    #[test]
    fn subtract_may_go_negative() {
        let delta = nzd(50_00).subtract(nzd(75_00)).unwrap();
        assert!(delta.is_negative());
        assert_eq!(delta.minor_units(), -25_00);
    }

    #[test]
    fn subtract_rejects_currency_mismatch() {
        assert!(nzd(100).subtract(Money::new(1, Currency::Eur)).is_err());
    }

    #[test]
    fn max_zero_clamps_negative() {
        assert_eq!(nzd(-25_00).max_zero(), nzd(0));
        assert_eq!(nzd(25_00).max_zero(), nzd(25_00));
    }

    #[test]
    fn compare_orders_amounts() {
        assert_eq!(nzd(100).compare(nzd(200)).unwrap(), Ordering::Less);
        assert_eq!(nzd(200).compare(nzd(200)).unwrap(), Ordering::Equal);
        assert!(nzd(100).compare(Money::new(100, Currency::Usd)).is_err());
    }

    #[test]
    fn sum_accumulates_from_zero() {
        let total = Money::sum(Currency::Nzd, vec![nzd(75_00), nzd(50_00), nzd(50_00)]).unwrap();
        assert_eq!(total, nzd(175_00));
    }

    #[test]
    fn sum_of_nothing_is_zero() {
        assert_eq!(Money::sum(Currency::Nzd, vec![]).unwrap(), nzd(0));
    }

    #[test]
    fn format_shows_major_minor_and_code() {
        assert_eq!(nzd(370_00).format(), "$370.00 NZD");
        assert_eq!(nzd(5).format(), "$0.05 NZD");
        assert_eq!(nzd(-25_50).format(), "-$25.50 NZD");
    }

    #[test]
    fn zero_checks() {
        assert!(nzd(0).is_zero());
        assert!(nzd(1).is_positive());
        assert!(nzd(-1).is_negative());
    }

    #[test]
    fn serializes_with_currency() {
        let json = serde_json::to_string(&nzd(75_00)).unwrap();
        assert!(json.contains("7500"));
        assert!(json.contains("nzd"));
    }

    proptest! {
        #[test]
        fn add_then_subtract_roundtrips(a in -1_000_000i64..1_000_000, b in -1_000_000i64..1_000_000) {
            let roundtrip = nzd(a).add(nzd(b)).unwrap().subtract(nzd(b)).unwrap();
            prop_assert_eq!(roundtrip, nzd(a));
        }

        #[test]
        fn max_zero_is_never_negative(a in -1_000_000i64..1_000_000) {
            prop_assert!(!nzd(a).max_zero().is_negative());
        }
    }
}
