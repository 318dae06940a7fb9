//! Adapters - implementations of the ports.
//!
//! - `postgres` - sqlx repositories for durable storage
//! - `stripe` - the card gateway client and its scriptable mock
//! - `memory` - in-memory ports for tests and local development
//! - `notification` - receipt delivery placeholders

pub mod memory;
pub mod notification;
pub mod postgres;
pub mod stripe;
