//! PostgreSQL implementation of ReservationRepository.
//!
//! Composite operations run in one transaction each; membership-number
//! issuance takes `FOR UPDATE` on the numbering row set so concurrent
//! purchases serialize on it.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use crate::domain::foundation::{
    ClaimId, DomainError, ErrorCode, MembershipNumber, OrderId, ReservationId, TierId, Timestamp,
    UserId,
};
use crate::domain::reservation::{
    Claim, ContactDetail, Order, Reservation, ReservationState,
};
use crate::ports::{NewReservation, ReservationRepository, TierChange};

/// PostgreSQL implementation of the ReservationRepository port.
pub struct PostgresReservationRepository {
    pool: PgPool,
}

impl PostgresReservationRepository {
    /// Creates a repository over the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Database row representation of a reservation.
#[derive(Debug, sqlx::FromRow)]
struct ReservationRow {
    id: Uuid,
    membership_number: i64,
    state: String,
    price_lock_date: Option<DateTime<Utc>>,
    last_fully_paid_tier_id: Option<Uuid>,
    last_fully_paid_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
}

impl TryFrom<ReservationRow> for Reservation {
    type Error = DomainError;

    fn try_from(row: ReservationRow) -> Result<Self, Self::Error> {
        Ok(Reservation {
            id: ReservationId::from_uuid(row.id),
            membership_number: MembershipNumber::new(row.membership_number),
            state: parse_state(&row.state)?,
            price_lock_date: row.price_lock_date.map(Timestamp::from_datetime),
            last_fully_paid_tier: row.last_fully_paid_tier_id.map(TierId::from_uuid),
            last_fully_paid_at: row.last_fully_paid_at.map(Timestamp::from_datetime),
            created_at: Timestamp::from_datetime(row.created_at),
        })
    }
}

/// Database row representation of an order.
#[derive(Debug, sqlx::FromRow)]
struct OrderRow {
    id: Uuid,
    reservation_id: Uuid,
    tier_id: Uuid,
    active_from: DateTime<Utc>,
    active_to: Option<DateTime<Utc>>,
}

impl From<OrderRow> for Order {
    fn from(row: OrderRow) -> Self {
        Order {
            id: OrderId::from_uuid(row.id),
            reservation_id: ReservationId::from_uuid(row.reservation_id),
            tier_id: TierId::from_uuid(row.tier_id),
            active_from: Timestamp::from_datetime(row.active_from),
            active_to: row.active_to.map(Timestamp::from_datetime),
        }
    }
}

/// Database row representation of a claim with optional contact.
#[derive(Debug, sqlx::FromRow)]
struct ClaimRow {
    id: Uuid,
    reservation_id: Uuid,
    user_id: String,
    active_from: DateTime<Utc>,
    active_to: Option<DateTime<Utc>>,
    contact_name: Option<String>,
    contact_email: Option<String>,
}

impl TryFrom<ClaimRow> for Claim {
    type Error = DomainError;

    fn try_from(row: ClaimRow) -> Result<Self, Self::Error> {
        let contact = match (row.contact_name, row.contact_email) {
            (Some(name), Some(email)) => Some(ContactDetail { name, email }),
            _ => None,
        };
        Ok(Claim {
            id: ClaimId::from_uuid(row.id),
            reservation_id: ReservationId::from_uuid(row.reservation_id),
            user_id: parse_user_id(&row.user_id)?,
            active_from: Timestamp::from_datetime(row.active_from),
            active_to: row.active_to.map(Timestamp::from_datetime),
            contact,
        })
    }
}

fn parse_state(s: &str) -> Result<ReservationState, DomainError> {
    match s {
        "instalment" => Ok(ReservationState::Instalment),
        "paid" => Ok(ReservationState::Paid),
        "disabled" => Ok(ReservationState::Disabled),
        _ => Err(DomainError::new(
            ErrorCode::DatabaseError,
            format!("Invalid reservation state: {}", s),
        )),
    }
}

fn state_to_string(state: ReservationState) -> &'static str {
    match state {
        ReservationState::Instalment => "instalment",
        ReservationState::Paid => "paid",
        ReservationState::Disabled => "disabled",
    }
}

fn parse_user_id(s: &str) -> Result<UserId, DomainError> {
    UserId::new(s).map_err(|e| DomainError::new(ErrorCode::DatabaseError, e.to_string()))
}

fn db_err(e: sqlx::Error) -> DomainError {
    DomainError::new(ErrorCode::DatabaseError, e.to_string())
}

async fn insert_order(
    tx: &mut Transaction<'_, Postgres>,
    order: &Order,
) -> Result<(), DomainError> {
    sqlx::query(
        r#"
        INSERT INTO orders (id, reservation_id, tier_id, active_from, active_to)
        VALUES ($1, $2, $3, $4, $5)
        "#,
    )
    .bind(order.id.as_uuid())
    .bind(order.reservation_id.as_uuid())
    .bind(order.tier_id.as_uuid())
    .bind(order.active_from.as_datetime())
    .bind(order.active_to.map(|t| *t.as_datetime()))
    .execute(&mut **tx)
    .await
    .map_err(db_err)?;
    Ok(())
}

async fn insert_claim(
    tx: &mut Transaction<'_, Postgres>,
    claim: &Claim,
) -> Result<(), DomainError> {
    sqlx::query(
        r#"
        INSERT INTO claims (
            id, reservation_id, user_id, active_from, active_to,
            contact_name, contact_email
        ) VALUES ($1, $2, $3, $4, $5, $6, $7)
        "#,
    )
    .bind(claim.id.as_uuid())
    .bind(claim.reservation_id.as_uuid())
    .bind(claim.user_id.as_str())
    .bind(claim.active_from.as_datetime())
    .bind(claim.active_to.map(|t| *t.as_datetime()))
    .bind(claim.contact.as_ref().map(|c| c.name.clone()))
    .bind(claim.contact.as_ref().map(|c| c.email.clone()))
    .execute(&mut **tx)
    .await
    .map_err(db_err)?;
    Ok(())
}

async fn set_number(
    tx: &mut Transaction<'_, Postgres>,
    id: ReservationId,
    number: MembershipNumber,
) -> Result<(), DomainError> {
    sqlx::query("UPDATE reservations SET membership_number = $1 WHERE id = $2")
        .bind(number.value())
        .bind(id.as_uuid())
        .execute(&mut **tx)
        .await
        .map_err(db_err)?;
    Ok(())
}

#[async_trait]
impl ReservationRepository for PostgresReservationRepository {
    async fn insert_new(&self, new: NewReservation) -> Result<Reservation, DomainError> {
        let mut tx = self.pool.begin().await.map_err(db_err)?;

        // Pessimistic lock on the numbering sequence: issuers serialize
        // on the table before reading the current maximum.
        sqlx::query("LOCK TABLE reservations IN SHARE ROW EXCLUSIVE MODE")
            .execute(&mut *tx)
            .await
            .map_err(db_err)?;
        let max: Option<i64> =
            sqlx::query_scalar("SELECT MAX(membership_number) FROM reservations")
                .fetch_one(&mut *tx)
                .await
                .map_err(db_err)?;

        let number = match new.membership_number {
            Some(explicit) => explicit,
            None => max
                .map(|n| MembershipNumber::new(n).next())
                .unwrap_or(MembershipNumber::FIRST),
        };

        let reservation = Reservation::new(
            ReservationId::new(),
            number,
            new.initial_state,
            new.at,
        );

        sqlx::query(
            r#"
            INSERT INTO reservations (
                id, membership_number, state, price_lock_date,
                last_fully_paid_tier_id, last_fully_paid_at, created_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(reservation.id.as_uuid())
        .bind(reservation.membership_number.value())
        .bind(state_to_string(reservation.state))
        .bind(reservation.price_lock_date.map(|t| *t.as_datetime()))
        .bind(reservation.last_fully_paid_tier.map(|t| *t.as_uuid()))
        .bind(reservation.last_fully_paid_at.map(|t| *t.as_datetime()))
        .bind(reservation.created_at.as_datetime())
        .execute(&mut *tx)
        .await
        .map_err(db_err)?;

        let order = Order::open(reservation.id, new.tier_id, new.at);
        insert_order(&mut tx, &order).await?;

        let mut claim = Claim::open(reservation.id, new.user_id, new.at);
        if let Some(contact) = new.contact {
            claim = claim.with_contact(contact);
        }
        insert_claim(&mut tx, &claim).await?;

        tx.commit().await.map_err(db_err)?;
        Ok(reservation)
    }

    async fn find(&self, id: ReservationId) -> Result<Option<Reservation>, DomainError> {
        let row: Option<ReservationRow> = sqlx::query_as(
            r#"
            SELECT id, membership_number, state, price_lock_date,
                   last_fully_paid_tier_id, last_fully_paid_at, created_at
            FROM reservations WHERE id = $1
            "#,
        )
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err)?;
        row.map(Reservation::try_from).transpose()
    }

    async fn active_order(&self, id: ReservationId) -> Result<Option<Order>, DomainError> {
        let row: Option<OrderRow> = sqlx::query_as(
            r#"
            SELECT id, reservation_id, tier_id, active_from, active_to
            FROM orders WHERE reservation_id = $1 AND active_to IS NULL
            "#,
        )
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err)?;
        Ok(row.map(Order::from))
    }

    async fn active_claim(&self, id: ReservationId) -> Result<Option<Claim>, DomainError> {
        let row: Option<ClaimRow> = sqlx::query_as(
            r#"
            SELECT id, reservation_id, user_id, active_from, active_to,
                   contact_name, contact_email
            FROM claims WHERE reservation_id = $1 AND active_to IS NULL
            "#,
        )
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err)?;
        row.map(Claim::try_from).transpose()
    }

    async fn order_history(&self, id: ReservationId) -> Result<Vec<Order>, DomainError> {
        let rows: Vec<OrderRow> = sqlx::query_as(
            r#"
            SELECT id, reservation_id, tier_id, active_from, active_to
            FROM orders WHERE reservation_id = $1 ORDER BY active_from
            "#,
        )
        .bind(id.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(db_err)?;
        Ok(rows.into_iter().map(Order::from).collect())
    }

    async fn update_state(
        &self,
        id: ReservationId,
        state: ReservationState,
    ) -> Result<(), DomainError> {
        sqlx::query("UPDATE reservations SET state = $1 WHERE id = $2")
            .bind(state_to_string(state))
            .bind(id.as_uuid())
            .execute(&self.pool)
            .await
            .map_err(db_err)?;
        Ok(())
    }

    async fn set_price_lock(&self, id: ReservationId, at: Timestamp) -> Result<(), DomainError> {
        sqlx::query("UPDATE reservations SET price_lock_date = $1 WHERE id = $2")
            .bind(at.as_datetime())
            .bind(id.as_uuid())
            .execute(&self.pool)
            .await
            .map_err(db_err)?;
        Ok(())
    }

    async fn apply_tier_change(
        &self,
        id: ReservationId,
        change: TierChange,
    ) -> Result<Order, DomainError> {
        let mut tx = self.pool.begin().await.map_err(db_err)?;

        let closed = sqlx::query(
            r#"
            UPDATE orders SET active_to = $1
            WHERE reservation_id = $2 AND active_to IS NULL
            "#,
        )
        .bind(change.at.as_datetime())
        .bind(id.as_uuid())
        .execute(&mut *tx)
        .await
        .map_err(db_err)?;
        if closed.rows_affected() == 0 {
            return Err(DomainError::new(
                ErrorCode::InvariantViolation,
                format!("reservation {} has no active order", id),
            ));
        }

        let new_order = Order::open(id, change.new_tier_id, change.at);
        insert_order(&mut tx, &new_order).await?;

        if let Some(tier) = change.record_fully_paid_tier {
            sqlx::query(
                r#"
                UPDATE reservations
                SET last_fully_paid_tier_id = $1, last_fully_paid_at = $2
                WHERE id = $3
                "#,
            )
            .bind(tier.as_uuid())
            .bind(change.at.as_datetime())
            .bind(id.as_uuid())
            .execute(&mut *tx)
            .await
            .map_err(db_err)?;
        }
        sqlx::query("UPDATE reservations SET state = $1 WHERE id = $2")
            .bind(state_to_string(change.new_state))
            .bind(id.as_uuid())
            .execute(&mut *tx)
            .await
            .map_err(db_err)?;

        tx.commit().await.map_err(db_err)?;
        Ok(new_order)
    }

    async fn swap_claim(
        &self,
        id: ReservationId,
        to_user: UserId,
        at: Timestamp,
        copy_contact: bool,
    ) -> Result<Claim, DomainError> {
        let mut tx = self.pool.begin().await.map_err(db_err)?;

        let old: Option<ClaimRow> = sqlx::query_as(
            r#"
            SELECT id, reservation_id, user_id, active_from, active_to,
                   contact_name, contact_email
            FROM claims WHERE reservation_id = $1 AND active_to IS NULL
            FOR UPDATE
            "#,
        )
        .bind(id.as_uuid())
        .fetch_optional(&mut *tx)
        .await
        .map_err(db_err)?;
        let old = old.ok_or_else(|| {
            DomainError::new(
                ErrorCode::InvariantViolation,
                format!("reservation {} has no active claim", id),
            )
        })?;

        sqlx::query("UPDATE claims SET active_to = $1 WHERE id = $2")
            .bind(at.as_datetime())
            .bind(old.id)
            .execute(&mut *tx)
            .await
            .map_err(db_err)?;

        let mut new_claim = Claim::open(id, to_user, at);
        if copy_contact {
            if let (Some(name), Some(email)) = (old.contact_name, old.contact_email) {
                new_claim = new_claim.with_contact(ContactDetail { name, email });
            }
        }
        insert_claim(&mut tx, &new_claim).await?;

        tx.commit().await.map_err(db_err)?;
        Ok(new_claim)
    }

    async fn merge_reservations(
        &self,
        keep: ReservationId,
        remove: ReservationId,
        at: Timestamp,
    ) -> Result<(), DomainError> {
        let mut tx = self.pool.begin().await.map_err(db_err)?;

        let numbers: Vec<(Uuid, i64)> = sqlx::query_as(
            "SELECT id, membership_number FROM reservations WHERE id = ANY($1) FOR UPDATE",
        )
        .bind(vec![*keep.as_uuid(), *remove.as_uuid()])
        .fetch_all(&mut *tx)
        .await
        .map_err(db_err)?;
        if numbers.len() != 2 {
            return Err(DomainError::new(
                ErrorCode::ReservationNotFound,
                "merge candidates missing",
            ));
        }
        let low = numbers.iter().map(|(_, n)| *n).min().unwrap_or_default();
        let high = numbers.iter().map(|(_, n)| *n).max().unwrap_or_default();

        sqlx::query(
            "UPDATE claims SET active_to = $1 WHERE reservation_id = $2 AND active_to IS NULL",
        )
        .bind(at.as_datetime())
        .bind(remove.as_uuid())
        .execute(&mut *tx)
        .await
        .map_err(db_err)?;

        // Sentinel dance around the unique constraint.
        set_number(&mut tx, remove, MembershipNumber::new(-1)).await?;
        set_number(&mut tx, keep, MembershipNumber::new(-2)).await?;
        set_number(&mut tx, remove, MembershipNumber::new(high)).await?;
        set_number(&mut tx, keep, MembershipNumber::new(low)).await?;

        tx.commit().await.map_err(db_err)?;
        Ok(())
    }
}
