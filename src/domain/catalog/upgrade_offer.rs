//! Upgrade offers between membership tiers.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{Money, MoneyError};

use super::MembershipTier;

/// An available upgrade from one tier to another at a price delta.
///
/// Upgrades are always available to a different tier of equal or higher
/// value; the delta is what the holder still pays on top of the tier they
/// are leaving.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpgradeOffer {
    pub from_tier: MembershipTier,
    pub to_tier: MembershipTier,
    price_delta: Money,
}

impl UpgradeOffer {
    /// Builds an offer between two tiers.
    ///
    /// # Errors
    ///
    /// Returns `CurrencyMismatch` when the tiers are priced in different
    /// currencies.
    pub fn between(from: MembershipTier, to: MembershipTier) -> Result<Self, MoneyError> {
        let price_delta = to.price.subtract(from.price)?;
        Ok(Self {
            from_tier: from,
            to_tier: to,
            price_delta,
        })
    }

    /// The additional price of taking this upgrade.
    pub fn price(&self) -> Money {
        self.price_delta
    }

    /// Store-page title for the offer.
    pub fn title(&self) -> String {
        format!("Upgrade {} to {}", self.from_tier.name, self.to_tier.name)
    }
}
