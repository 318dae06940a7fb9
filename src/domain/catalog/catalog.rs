//! The versioned membership catalog.
//!
//! Holds every tier row ever published, open and closed. Lookups are by
//! name-and-instant so that price-locked reservations and historical
//! charge descriptions resolve against the price that was actually on
//! offer at the time.
//!
//! # Invariants
//!
//! - For a given name, validity windows never overlap.
//! - Rows are never mutated: a price change closes the current row and
//!   appends a successor.

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::foundation::{Currency, Money, MoneyError, TierId, Timestamp};

use super::{MembershipTier, TierName, TierRights, UpgradeOffer};

/// Errors raised by catalog maintenance.
#[derive(Debug, Clone, Error)]
pub enum CatalogError {
    #[error("tier '{name}' already has a row active in that window")]
    OverlappingWindow { name: String },

    #[error("no open row for tier '{name}'")]
    NoOpenRow { name: String },

    #[error(transparent)]
    Money(#[from] MoneyError),
}

/// In-memory aggregate over all tier rows.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MembershipCatalog {
    tiers: Vec<MembershipTier>,
}

impl MembershipCatalog {
    /// Builds a catalog from existing rows.
    ///
    /// # Errors
    ///
    /// Returns `OverlappingWindow` if two rows of the same name overlap.
    pub fn new(tiers: Vec<MembershipTier>) -> Result<Self, CatalogError> {
        let mut catalog = Self { tiers: Vec::new() };
        for tier in tiers {
            catalog.add_tier(tier)?;
        }
        Ok(catalog)
    }

    /// Appends a tier row, enforcing the non-overlap invariant.
    pub fn add_tier(&mut self, tier: MembershipTier) -> Result<(), CatalogError> {
        let overlaps = self
            .tiers
            .iter()
            .filter(|existing| existing.name == tier.name)
            .any(|existing| windows_overlap(existing, &tier));
        if overlaps {
            return Err(CatalogError::OverlappingWindow {
                name: tier.name.as_str().to_string(),
            });
        }
        self.tiers.push(tier);
        Ok(())
    }

    /// Looks a row up by id.
    pub fn tier(&self, id: TierId) -> Option<&MembershipTier> {
        self.tiers.iter().find(|t| t.id == id)
    }

    /// The row of `name` whose window covers `at`, if any.
    pub fn active_at(&self, name: &TierName, at: Timestamp) -> Option<&MembershipTier> {
        self.tiers
            .iter()
            .find(|t| t.name == *name && t.active_at(at))
    }

    /// Every row active at `at`, cheapest first.
    pub fn tiers_active_at(&self, at: Timestamp) -> Vec<&MembershipTier> {
        let mut active: Vec<&MembershipTier> =
            self.tiers.iter().filter(|t| t.active_at(at)).collect();
        active.sort_by_key(|t| t.price.minor_units());
        active
    }

    /// Closes the open row for `name` at `at` and appends a successor at
    /// the new price, returning the successor's id.
    ///
    /// # Errors
    ///
    /// Returns `NoOpenRow` when the name has no open-ended row.
    pub fn amend_price(
        &mut self,
        name: &TierName,
        new_price: Money,
        at: Timestamp,
    ) -> Result<TierId, CatalogError> {
        let open = self
            .tiers
            .iter_mut()
            .find(|t| t.name == *name && t.is_open())
            .ok_or_else(|| CatalogError::NoOpenRow {
                name: name.as_str().to_string(),
            })?;
        open.active_to = Some(at);
        let successor = MembershipTier {
            id: TierId::new(),
            name: open.name.clone(),
            price: new_price,
            active_from: at,
            active_to: None,
            rights: open.rights,
            description: open.description.clone(),
        };
        let id = successor.id;
        self.tiers.push(successor);
        Ok(id)
    }

    /// Upgrades currently offered from `from`: every active tier with a
    /// different name priced at or above it.
    pub fn upgrade_offers_from(
        &self,
        from: &MembershipTier,
        at: Timestamp,
    ) -> Result<Vec<UpgradeOffer>, CatalogError> {
        let mut offers = Vec::new();
        for candidate in self.tiers_active_at(at) {
            if candidate.name == from.name {
                continue;
            }
            if candidate.price.compare(from.price)? == std::cmp::Ordering::Less {
                continue;
            }
            offers.push(UpgradeOffer::between(from.clone(), candidate.clone())?);
        }
        Ok(offers)
    }

    /// Store-page offers for every currently purchasable tier.
    pub fn offers_at(&self, at: Timestamp) -> Vec<MembershipOffer> {
        self.tiers_active_at(at)
            .into_iter()
            .cloned()
            .map(MembershipOffer::new)
            .collect()
    }

    /// All rows, for persistence adapters.
    pub fn rows(&self) -> &[MembershipTier] {
        &self.tiers
    }
}

fn windows_overlap(a: &MembershipTier, b: &MembershipTier) -> bool {
    let a_end = a.active_to;
    let b_end = b.active_to;
    let a_starts_before_b_ends = match b_end {
        Some(end) => a.active_from < end,
        None => true,
    };
    let b_starts_before_a_ends = match a_end {
        Some(end) => b.active_from < end,
        None => true,
    };
    a_starts_before_b_ends && b_starts_before_a_ends
}

/// A purchasable tier as presented on the store page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MembershipOffer {
    pub tier: MembershipTier,
}

impl MembershipOffer {
    /// Wraps a tier for display.
    pub fn new(tier: MembershipTier) -> Self {
        Self { tier }
    }

    /// Price label, "free" for zero-priced tiers.
    pub fn formatted_price(&self) -> String {
        if self.tier.price.is_positive() {
            self.tier.price.format()
        } else {
            "free".to_string()
        }
    }
}

impl std::fmt::Display for MembershipOffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.tier.description.is_empty() {
            write!(f, "{} ({})", self.tier.name, self.formatted_price())
        } else {
            write!(
                f,
                "{} - {} ({})",
                self.tier.name, self.tier.description, self.formatted_price()
            )
        }
    }
}

/// Price table seeded into fresh deployments and tests.
///
/// (name, price in cents, rights)
static DEFAULT_PRICE_TABLE: Lazy<Vec<(&'static str, i64, TierRights)>> = Lazy::new(|| {
    vec![
        ("adult", 370_00, TierRights::full()),
        ("young_adult", 225_00, TierRights::full()),
        ("unwaged", 225_00, TierRights::full()),
        ("child", 105_00, TierRights::none()),
        ("kid_in_tow", 0, TierRights::none()),
        ("supporting", 75_00, TierRights::supporting()),
    ]
});

impl MembershipCatalog {
    /// The default tier line-up, open-ended from `from`.
    pub fn with_default_tiers(from: Timestamp) -> Self {
        let tiers = DEFAULT_PRICE_TABLE
            .iter()
            .map(|(name, cents, rights)| {
                MembershipTier::new(
                    TierName::new(*name).expect("default tier names are non-empty"),
                    Money::new(*cents, Currency::Nzd),
                    from,
                    *rights,
                )
            })
            .collect();
        Self { tiers }
    }
}
