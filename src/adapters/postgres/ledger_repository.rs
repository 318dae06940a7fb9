//! PostgreSQL implementation of LedgerRepository.
//!
//! Charge rows are insert-only. `append_with_states` pairs the insert
//! with the reservation state flips in one transaction, which is the
//! property the balance calculator's consistency rests on.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::foundation::{
    CartId, ChargeId, Currency, DomainError, ErrorCode, Money, ReservationId, Timestamp, UserId,
};
use crate::domain::ledger::{Charge, ChargeState, PaymentMethod, PaymentTarget};
use crate::domain::reservation::ReservationState;
use crate::ports::LedgerRepository;

/// PostgreSQL implementation of the LedgerRepository port.
pub struct PostgresLedgerRepository {
    pool: PgPool,
}

impl PostgresLedgerRepository {
    /// Creates a repository over the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Database row representation of a charge.
#[derive(Debug, sqlx::FromRow)]
struct ChargeRow {
    id: Uuid,
    reservation_id: Option<Uuid>,
    cart_id: Option<Uuid>,
    user_id: String,
    amount_minor_units: i64,
    currency: String,
    state: String,
    method: String,
    gateway_id: Option<String>,
    gateway_response: serde_json::Value,
    comment: String,
    created_at: DateTime<Utc>,
}

impl TryFrom<ChargeRow> for Charge {
    type Error = DomainError;

    fn try_from(row: ChargeRow) -> Result<Self, Self::Error> {
        let target = match (row.reservation_id, row.cart_id) {
            (Some(reservation), None) => {
                PaymentTarget::reservation(ReservationId::from_uuid(reservation))
            }
            (None, Some(cart)) => PaymentTarget::cart(CartId::from_uuid(cart)),
            _ => {
                return Err(DomainError::new(
                    ErrorCode::DatabaseError,
                    "charge row must target exactly one of reservation or cart",
                ))
            }
        };
        Ok(Charge {
            id: ChargeId::from_uuid(row.id),
            target,
            user_id: UserId::new(row.user_id)
                .map_err(|e| DomainError::new(ErrorCode::DatabaseError, e.to_string()))?,
            amount: Money::new(row.amount_minor_units, parse_currency(&row.currency)?),
            state: parse_charge_state(&row.state)?,
            method: parse_method(&row.method)?,
            gateway_id: row.gateway_id,
            gateway_response: row.gateway_response,
            comment: row.comment,
            created_at: Timestamp::from_datetime(row.created_at),
        })
    }
}

fn parse_currency(s: &str) -> Result<Currency, DomainError> {
    match s {
        "nzd" => Ok(Currency::Nzd),
        "usd" => Ok(Currency::Usd),
        "eur" => Ok(Currency::Eur),
        _ => Err(DomainError::new(
            ErrorCode::DatabaseError,
            format!("Invalid currency: {}", s),
        )),
    }
}

fn parse_charge_state(s: &str) -> Result<ChargeState, DomainError> {
    match s {
        "successful" => Ok(ChargeState::Successful),
        "failed" => Ok(ChargeState::Failed),
        _ => Err(DomainError::new(
            ErrorCode::DatabaseError,
            format!("Invalid charge state: {}", s),
        )),
    }
}

fn parse_method(s: &str) -> Result<PaymentMethod, DomainError> {
    match s {
        "card" => Ok(PaymentMethod::Card),
        "cash" => Ok(PaymentMethod::Cash),
        _ => Err(DomainError::new(
            ErrorCode::DatabaseError,
            format!("Invalid payment method: {}", s),
        )),
    }
}

fn charge_state_to_string(state: ChargeState) -> &'static str {
    match state {
        ChargeState::Successful => "successful",
        ChargeState::Failed => "failed",
    }
}

fn method_to_string(method: PaymentMethod) -> &'static str {
    match method {
        PaymentMethod::Card => "card",
        PaymentMethod::Cash => "cash",
    }
}

fn reservation_state_to_string(state: ReservationState) -> &'static str {
    match state {
        ReservationState::Instalment => "instalment",
        ReservationState::Paid => "paid",
        ReservationState::Disabled => "disabled",
    }
}

fn db_err(e: sqlx::Error) -> DomainError {
    DomainError::new(ErrorCode::DatabaseError, e.to_string())
}

fn bind_charge<'q>(
    query: sqlx::query::Query<'q, sqlx::Postgres, sqlx::postgres::PgArguments>,
    charge: &'q Charge,
) -> sqlx::query::Query<'q, sqlx::Postgres, sqlx::postgres::PgArguments> {
    let (reservation_id, cart_id) = match charge.target {
        PaymentTarget::Reservation { reservation_id } => (Some(*reservation_id.as_uuid()), None),
        PaymentTarget::Cart { cart_id } => (None, Some(*cart_id.as_uuid())),
    };
    query
        .bind(charge.id.as_uuid())
        .bind(reservation_id)
        .bind(cart_id)
        .bind(charge.user_id.as_str())
        .bind(charge.amount.minor_units())
        .bind(charge.amount.currency().gateway_code())
        .bind(charge_state_to_string(charge.state))
        .bind(method_to_string(charge.method))
        .bind(charge.gateway_id.as_deref())
        .bind(charge.gateway_response.clone())
        .bind(charge.comment.as_str())
        .bind(charge.created_at.as_datetime())
}

const INSERT_CHARGE: &str = r#"
    INSERT INTO charges (
        id, reservation_id, cart_id, user_id, amount_minor_units, currency,
        state, method, gateway_id, gateway_response, comment, created_at
    ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
"#;

const SELECT_CHARGE: &str = r#"
    SELECT id, reservation_id, cart_id, user_id, amount_minor_units, currency,
           state, method, gateway_id, gateway_response, comment, created_at
    FROM charges
"#;

#[async_trait]
impl LedgerRepository for PostgresLedgerRepository {
    async fn append(&self, charge: &Charge) -> Result<(), DomainError> {
        bind_charge(sqlx::query(INSERT_CHARGE), charge)
            .execute(&self.pool)
            .await
            .map_err(db_err)?;
        Ok(())
    }

    async fn append_with_states(
        &self,
        charge: &Charge,
        states: &[(ReservationId, ReservationState)],
    ) -> Result<(), DomainError> {
        let mut tx = self.pool.begin().await.map_err(db_err)?;

        bind_charge(sqlx::query(INSERT_CHARGE), charge)
            .execute(&mut *tx)
            .await
            .map_err(db_err)?;

        for (id, state) in states {
            sqlx::query("UPDATE reservations SET state = $1 WHERE id = $2")
                .bind(reservation_state_to_string(*state))
                .bind(id.as_uuid())
                .execute(&mut *tx)
                .await
                .map_err(db_err)?;
        }

        tx.commit().await.map_err(db_err)?;
        Ok(())
    }

    async fn charges_for_reservation(
        &self,
        id: ReservationId,
    ) -> Result<Vec<Charge>, DomainError> {
        let rows: Vec<ChargeRow> = sqlx::query_as(&format!(
            "{} WHERE reservation_id = $1 ORDER BY created_at",
            SELECT_CHARGE
        ))
        .bind(id.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(db_err)?;
        rows.into_iter().map(Charge::try_from).collect()
    }

    async fn charges_for_cart(&self, id: CartId) -> Result<Vec<Charge>, DomainError> {
        let rows: Vec<ChargeRow> = sqlx::query_as(&format!(
            "{} WHERE cart_id = $1 ORDER BY created_at",
            SELECT_CHARGE
        ))
        .bind(id.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(db_err)?;
        rows.into_iter().map(Charge::try_from).collect()
    }
}
