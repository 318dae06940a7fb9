//! In-memory implementation of the catalog port.

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::domain::catalog::{MembershipCatalog, MembershipTier, TierName};
use crate::domain::foundation::{DomainError, ErrorCode, Money, TierId, Timestamp};
use crate::ports::CatalogRepository;

/// Catalog stored behind a lock, seeded for tests and local development.
pub struct InMemoryCatalog {
    catalog: RwLock<MembershipCatalog>,
}

impl InMemoryCatalog {
    /// An empty catalog.
    pub fn new() -> Self {
        Self {
            catalog: RwLock::new(MembershipCatalog::default()),
        }
    }

    /// The default tier line-up, open-ended from `from`.
    pub fn with_default_tiers(from: Timestamp) -> Self {
        Self {
            catalog: RwLock::new(MembershipCatalog::with_default_tiers(from)),
        }
    }

    /// The currently open row for `name`, for tests.
    pub async fn tier_by_name(&self, name: &str) -> Option<MembershipTier> {
        let name = TierName::new(name).ok()?;
        let catalog = self.catalog.read().await;
        catalog
            .rows()
            .iter()
            .find(|t| t.name == name && t.is_open())
            .cloned()
    }

    /// Amends a tier's price through the domain aggregate.
    pub async fn amend_price(
        &self,
        name: &str,
        new_price: Money,
        at: Timestamp,
    ) -> Result<TierId, DomainError> {
        let name = TierName::new(name)
            .map_err(|e| DomainError::new(ErrorCode::ValidationFailed, e.to_string()))?;
        self.catalog
            .write()
            .await
            .amend_price(&name, new_price, at)
            .map_err(|e| DomainError::new(ErrorCode::ValidationFailed, e.to_string()))
    }
}

impl Default for InMemoryCatalog {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CatalogRepository for InMemoryCatalog {
    async fn load(&self) -> Result<MembershipCatalog, DomainError> {
        Ok(self.catalog.read().await.clone())
    }

    async fn insert_tier(&self, tier: &MembershipTier) -> Result<(), DomainError> {
        self.catalog
            .write()
            .await
            .add_tier(tier.clone())
            .map_err(|e| DomainError::new(ErrorCode::ValidationFailed, e.to_string()))
    }

    async fn close_tier(&self, id: TierId, at: Timestamp) -> Result<(), DomainError> {
        let mut catalog = self.catalog.write().await;
        let rows: Vec<MembershipTier> = catalog
            .rows()
            .iter()
            .map(|t| {
                let mut t = t.clone();
                if t.id == id {
                    t.active_to = Some(at);
                }
                t
            })
            .collect();
        *catalog = MembershipCatalog::new(rows)
            .map_err(|e| DomainError::new(ErrorCode::ValidationFailed, e.to_string()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::Currency;

    #[tokio::test]
    async fn default_catalog_resolves_tiers_by_name() {
        let catalog = InMemoryCatalog::with_default_tiers(Timestamp::from_unix_secs(0));
        let adult = catalog.tier_by_name("adult").await.unwrap();
        assert_eq!(adult.price, Money::new(370_00, Currency::Nzd));
    }

    #[tokio::test]
    async fn amend_price_is_visible_through_load() {
        let catalog = InMemoryCatalog::with_default_tiers(Timestamp::from_unix_secs(0));
        catalog
            .amend_price(
                "adult",
                Money::new(400_00, Currency::Nzd),
                Timestamp::from_unix_secs(1000),
            )
            .await
            .unwrap();

        let loaded = catalog.load().await.unwrap();
        let name = TierName::new("adult").unwrap();
        let current = loaded
            .active_at(&name, Timestamp::from_unix_secs(2000))
            .unwrap();
        assert_eq!(current.price, Money::new(400_00, Currency::Nzd));
    }
}
