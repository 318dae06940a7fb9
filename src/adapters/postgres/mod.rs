//! PostgreSQL adapters.
//!
//! sqlx-backed implementations of the persistence ports. Composite
//! operations use one transaction each; see the port docs for which
//! sequences must be atomic.

mod audit_log;
mod cart_repository;
mod catalog_repository;
mod ledger_repository;
mod reservation_repository;

pub use audit_log::{PostgresAuditLog, PostgresCustomerDirectory};
pub use cart_repository::PostgresCartRepository;
pub use catalog_repository::PostgresCatalogRepository;
pub use ledger_repository::PostgresLedgerRepository;
pub use reservation_repository::PostgresReservationRepository;
