//! Catalog repository port.
//!
//! The catalog is small (a handful of tier rows per convention), so the
//! port loads it whole and lets the domain aggregate answer queries.

use async_trait::async_trait;

use crate::domain::catalog::{MembershipCatalog, MembershipTier};
use crate::domain::foundation::{DomainError, TierId, Timestamp};

/// Repository port for the tier catalog.
#[async_trait]
pub trait CatalogRepository: Send + Sync {
    /// Loads every tier row, open and closed.
    async fn load(&self) -> Result<MembershipCatalog, DomainError>;

    /// Appends a tier row.
    async fn insert_tier(&self, tier: &MembershipTier) -> Result<(), DomainError>;

    /// Closes a tier row's validity window at `at`. The only mutation a
    /// tier row ever sees.
    async fn close_tier(&self, id: TierId, at: Timestamp) -> Result<(), DomainError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    // Trait object safety test
    #[test]
    fn catalog_repository_is_object_safe() {
        fn _accepts_dyn(_repo: &dyn CatalogRepository) {}
    }
}
