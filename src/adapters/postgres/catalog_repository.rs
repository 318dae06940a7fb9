//! PostgreSQL implementation of CatalogRepository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::catalog::{MembershipCatalog, MembershipTier, TierName, TierRights};
use crate::domain::foundation::{
    Currency, DomainError, ErrorCode, Money, TierId, Timestamp,
};
use crate::ports::CatalogRepository;

/// PostgreSQL implementation of the CatalogRepository port.
pub struct PostgresCatalogRepository {
    pool: PgPool,
}

impl PostgresCatalogRepository {
    /// Creates a repository over the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Database row representation of a tier.
#[derive(Debug, sqlx::FromRow)]
struct TierRow {
    id: Uuid,
    name: String,
    price_minor_units: i64,
    currency: String,
    active_from: DateTime<Utc>,
    active_to: Option<DateTime<Utc>>,
    can_attend: bool,
    can_vote: bool,
    can_nominate: bool,
    description: String,
}

impl TryFrom<TierRow> for MembershipTier {
    type Error = DomainError;

    fn try_from(row: TierRow) -> Result<Self, Self::Error> {
        let currency = match row.currency.as_str() {
            "nzd" => Currency::Nzd,
            "usd" => Currency::Usd,
            "eur" => Currency::Eur,
            other => {
                return Err(DomainError::new(
                    ErrorCode::DatabaseError,
                    format!("Invalid currency: {}", other),
                ))
            }
        };
        Ok(MembershipTier {
            id: TierId::from_uuid(row.id),
            name: TierName::new(row.name)
                .map_err(|e| DomainError::new(ErrorCode::DatabaseError, e.to_string()))?,
            price: Money::new(row.price_minor_units, currency),
            active_from: Timestamp::from_datetime(row.active_from),
            active_to: row.active_to.map(Timestamp::from_datetime),
            rights: TierRights {
                can_attend: row.can_attend,
                can_vote: row.can_vote,
                can_nominate: row.can_nominate,
            },
            description: row.description,
        })
    }
}

fn db_err(e: sqlx::Error) -> DomainError {
    DomainError::new(ErrorCode::DatabaseError, e.to_string())
}

#[async_trait]
impl CatalogRepository for PostgresCatalogRepository {
    async fn load(&self) -> Result<MembershipCatalog, DomainError> {
        let rows: Vec<TierRow> = sqlx::query_as(
            r#"
            SELECT id, name, price_minor_units, currency, active_from, active_to,
                   can_attend, can_vote, can_nominate, description
            FROM membership_tiers ORDER BY active_from
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(db_err)?;

        let tiers = rows
            .into_iter()
            .map(MembershipTier::try_from)
            .collect::<Result<Vec<_>, _>>()?;
        MembershipCatalog::new(tiers)
            .map_err(|e| DomainError::new(ErrorCode::InvariantViolation, e.to_string()))
    }

    async fn insert_tier(&self, tier: &MembershipTier) -> Result<(), DomainError> {
        sqlx::query(
            r#"
            INSERT INTO membership_tiers (
                id, name, price_minor_units, currency, active_from, active_to,
                can_attend, can_vote, can_nominate, description
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            "#,
        )
        .bind(tier.id.as_uuid())
        .bind(tier.name.as_str())
        .bind(tier.price.minor_units())
        .bind(tier.price.currency().gateway_code())
        .bind(tier.active_from.as_datetime())
        .bind(tier.active_to.map(|t| *t.as_datetime()))
        .bind(tier.rights.can_attend)
        .bind(tier.rights.can_vote)
        .bind(tier.rights.can_nominate)
        .bind(tier.description.as_str())
        .execute(&self.pool)
        .await
        .map_err(db_err)?;
        Ok(())
    }

    async fn close_tier(&self, id: TierId, at: Timestamp) -> Result<(), DomainError> {
        sqlx::query("UPDATE membership_tiers SET active_to = $1 WHERE id = $2")
            .bind(at.as_datetime())
            .bind(id.as_uuid())
            .execute(&self.pool)
            .await
            .map_err(db_err)?;
        Ok(())
    }
}
