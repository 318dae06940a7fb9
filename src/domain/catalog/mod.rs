//! Catalog domain module.
//!
//! Versioned, time-bounded price records for named membership tiers.
//!
//! # Module Structure
//!
//! - `tier` - MembershipTier rows, names and rights flags
//! - `catalog` - MembershipCatalog aggregate and store offers
//! - `upgrade_offer` - upgrade edges with price deltas

#[allow(clippy::module_inception)]
mod catalog;
mod tier;
mod upgrade_offer;

pub use catalog::{CatalogError, MembershipCatalog, MembershipOffer};
pub use tier::{MembershipTier, TierName, TierRights};
pub use upgrade_offer::UpgradeOffer;
