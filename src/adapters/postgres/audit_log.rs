//! PostgreSQL implementations of the AuditLog and CustomerDirectory
//! ports.

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::foundation::{DomainError, ErrorCode, UserId};
use crate::ports::{AuditLog, CustomerDirectory};

fn db_err(e: sqlx::Error) -> DomainError {
    DomainError::new(ErrorCode::DatabaseError, e.to_string())
}

/// Audit notes stored in the `notes` table.
pub struct PostgresAuditLog {
    pool: PgPool,
}

impl PostgresAuditLog {
    /// Creates a log over the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AuditLog for PostgresAuditLog {
    async fn record_note(&self, user_id: &UserId, text: &str) -> Result<(), DomainError> {
        sqlx::query(
            "INSERT INTO notes (id, user_id, content, created_at) VALUES ($1, $2, $3, NOW())",
        )
        .bind(Uuid::new_v4())
        .bind(user_id.as_str())
        .bind(text)
        .execute(&self.pool)
        .await
        .map_err(db_err)?;
        Ok(())
    }
}

/// Gateway customer ids stored on the `gateway_customers` table.
pub struct PostgresCustomerDirectory {
    pool: PgPool,
}

impl PostgresCustomerDirectory {
    /// Creates a directory over the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CustomerDirectory for PostgresCustomerDirectory {
    async fn gateway_customer_id(&self, user_id: &UserId) -> Result<Option<String>, DomainError> {
        let id: Option<String> = sqlx::query_scalar(
            "SELECT customer_id FROM gateway_customers WHERE user_id = $1",
        )
        .bind(user_id.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err)?;
        Ok(id)
    }

    async fn remember_gateway_customer(
        &self,
        user_id: &UserId,
        customer_id: &str,
    ) -> Result<(), DomainError> {
        sqlx::query(
            r#"
            INSERT INTO gateway_customers (user_id, customer_id)
            VALUES ($1, $2)
            ON CONFLICT (user_id) DO UPDATE SET customer_id = EXCLUDED.customer_id
            "#,
        )
        .bind(user_id.as_str())
        .bind(customer_id)
        .execute(&self.pool)
        .await
        .map_err(db_err)?;
        Ok(())
    }
}
