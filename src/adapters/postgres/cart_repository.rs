//! PostgreSQL implementation of CartRepository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::foundation::{
    CartId, CartItemId, Currency, DomainError, ErrorCode, Money, ReservationId, TierId,
    Timestamp, UserId,
};
use crate::domain::ledger::{Cart, CartItem};
use crate::ports::CartRepository;

/// PostgreSQL implementation of the CartRepository port.
pub struct PostgresCartRepository {
    pool: PgPool,
}

impl PostgresCartRepository {
    /// Creates a repository over the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct CartRow {
    id: Uuid,
    user_id: String,
    created_at: DateTime<Utc>,
}

impl TryFrom<CartRow> for Cart {
    type Error = DomainError;

    fn try_from(row: CartRow) -> Result<Self, Self::Error> {
        Ok(Cart {
            id: CartId::from_uuid(row.id),
            user_id: UserId::new(row.user_id)
                .map_err(|e| DomainError::new(ErrorCode::DatabaseError, e.to_string()))?,
            created_at: Timestamp::from_datetime(row.created_at),
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
struct CartItemRow {
    id: Uuid,
    cart_id: Uuid,
    reservation_id: Uuid,
    tier_id: Uuid,
    listed_price_minor_units: i64,
    currency: String,
    active_from: DateTime<Utc>,
    active_to: Option<DateTime<Utc>>,
}

impl TryFrom<CartItemRow> for CartItem {
    type Error = DomainError;

    fn try_from(row: CartItemRow) -> Result<Self, Self::Error> {
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
        Ok(CartItem {
            id: CartItemId::from_uuid(row.id),
            cart_id: CartId::from_uuid(row.cart_id),
            reservation_id: ReservationId::from_uuid(row.reservation_id),
            tier_id: TierId::from_uuid(row.tier_id),
            listed_price: Money::new(row.listed_price_minor_units, currency),
            active_from: Timestamp::from_datetime(row.active_from),
            active_to: row.active_to.map(Timestamp::from_datetime),
        })
    }
}

fn db_err(e: sqlx::Error) -> DomainError {
    DomainError::new(ErrorCode::DatabaseError, e.to_string())
}

const SELECT_ITEM: &str = r#"
    SELECT id, cart_id, reservation_id, tier_id, listed_price_minor_units,
           currency, active_from, active_to
    FROM cart_items
"#;

#[async_trait]
impl CartRepository for PostgresCartRepository {
    async fn find_cart(&self, id: CartId) -> Result<Option<Cart>, DomainError> {
        let row: Option<CartRow> =
            sqlx::query_as("SELECT id, user_id, created_at FROM carts WHERE id = $1")
                .bind(id.as_uuid())
                .fetch_optional(&self.pool)
                .await
                .map_err(db_err)?;
        row.map(Cart::try_from).transpose()
    }

    async fn items_for_cart(&self, id: CartId) -> Result<Vec<CartItem>, DomainError> {
        let rows: Vec<CartItemRow> = sqlx::query_as(&format!(
            "{} WHERE cart_id = $1 ORDER BY active_from",
            SELECT_ITEM
        ))
        .bind(id.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(db_err)?;
        rows.into_iter().map(CartItem::try_from).collect()
    }

    async fn items_for_reservation(
        &self,
        id: ReservationId,
    ) -> Result<Vec<CartItem>, DomainError> {
        let rows: Vec<CartItemRow> = sqlx::query_as(&format!(
            "{} WHERE reservation_id = $1 ORDER BY active_from",
            SELECT_ITEM
        ))
        .bind(id.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(db_err)?;
        rows.into_iter().map(CartItem::try_from).collect()
    }

    async fn insert_cart(&self, cart: &Cart) -> Result<(), DomainError> {
        sqlx::query("INSERT INTO carts (id, user_id, created_at) VALUES ($1, $2, $3)")
            .bind(cart.id.as_uuid())
            .bind(cart.user_id.as_str())
            .bind(cart.created_at.as_datetime())
            .execute(&self.pool)
            .await
            .map_err(db_err)?;
        Ok(())
    }

    async fn insert_item(&self, item: &CartItem) -> Result<(), DomainError> {
        sqlx::query(
            r#"
            INSERT INTO cart_items (
                id, cart_id, reservation_id, tier_id, listed_price_minor_units,
                currency, active_from, active_to
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(item.id.as_uuid())
        .bind(item.cart_id.as_uuid())
        .bind(item.reservation_id.as_uuid())
        .bind(item.tier_id.as_uuid())
        .bind(item.listed_price.minor_units())
        .bind(item.listed_price.currency().gateway_code())
        .bind(item.active_from.as_datetime())
        .bind(item.active_to.map(|t| *t.as_datetime()))
        .execute(&self.pool)
        .await
        .map_err(db_err)?;
        Ok(())
    }

    async fn close_item(&self, id: CartItemId, at: Timestamp) -> Result<(), DomainError> {
        sqlx::query("UPDATE cart_items SET active_to = $1 WHERE id = $2")
            .bind(at.as_datetime())
            .bind(id.as_uuid())
            .execute(&self.pool)
            .await
            .map_err(db_err)?;
        Ok(())
    }
}
