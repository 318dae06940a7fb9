//! Membership tier rows.
//!
//! A tier is a named product version with a price and a validity window.
//! Price changes never mutate a row: a successor row is appended and the
//! predecessor's window is closed, so historical price lookups stay exact.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{Money, TierId, Timestamp, ValidationError};

/// Non-empty tier name, e.g. "adult" or "supporting".
///
/// Several tier rows may share a name across different validity windows.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TierName(String);

impl TierName {
    /// Creates a tier name, returning error if empty.
    pub fn new(name: impl Into<String>) -> Result<Self, ValidationError> {
        let name = name.into();
        if name.is_empty() {
            return Err(ValidationError::empty_field("tier_name"));
        }
        Ok(Self(name))
    }

    /// Returns the inner string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for TierName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Rights a tier grants its holder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TierRights {
    /// Holder may attend the convention.
    pub can_attend: bool,

    /// Holder may vote on the award ballot.
    pub can_vote: bool,

    /// Holder may nominate for the award ballot.
    pub can_nominate: bool,
}

impl TierRights {
    /// Full rights: attend, vote, nominate.
    pub fn full() -> Self {
        Self {
            can_attend: true,
            can_vote: true,
            can_nominate: true,
        }
    }

    /// Supporting rights: vote and nominate without attending.
    pub fn supporting() -> Self {
        Self {
            can_attend: false,
            can_vote: true,
            can_nominate: true,
        }
    }

    /// No rights at all (e.g. kid-in-tow).
    pub fn none() -> Self {
        Self::default()
    }
}

/// One versioned row of the membership catalog.
///
/// Immutable once created. The validity window is half-open:
/// `active_from <= t` and (`active_to` is `None` or `t < active_to`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MembershipTier {
    /// Unique identifier for this row (not the name).
    pub id: TierId,

    /// Product name shared across price versions.
    pub name: TierName,

    /// Price of the tier during this window.
    pub price: Money,

    /// Start of the validity window.
    pub active_from: Timestamp,

    /// End of the validity window, `None` while open-ended.
    pub active_to: Option<Timestamp>,

    /// Rights the tier grants.
    pub rights: TierRights,

    /// Short store-page description, empty when there is none.
    pub description: String,
}

impl MembershipTier {
    /// Creates an open-ended tier row starting at `active_from`.
    pub fn new(
        name: TierName,
        price: Money,
        active_from: Timestamp,
        rights: TierRights,
    ) -> Self {
        Self {
            id: TierId::new(),
            name,
            price,
            active_from,
            active_to: None,
            rights,
            description: String::new(),
        }
    }

    /// Sets the store-page description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// True when the row's window covers `at`.
    pub fn active_at(&self, at: Timestamp) -> bool {
        if at < self.active_from {
            return false;
        }
        match self.active_to {
            Some(to) => at < to,
            None => true,
        }
    }

    /// True while the window is open-ended.
    pub fn is_open(&self) -> bool {
        self.active_to.is_none()
    }
}

impl std::fmt::Display for MembershipTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name)
    }
}
