//! Audit log port.
//!
//! Support actions (upgrades, transfers, merges) leave a note on the
//! affected users. Best-effort: the financial mutation does not depend on
//! the note landing.

use async_trait::async_trait;

use crate::domain::foundation::{DomainError, UserId};

/// Port for audit notes on users.
#[async_trait]
pub trait AuditLog: Send + Sync {
    /// Records a note against a user.
    async fn record_note(&self, user_id: &UserId, text: &str) -> Result<(), DomainError>;
}
