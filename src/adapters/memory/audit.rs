//! Recording audit log for tests.

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::domain::foundation::{DomainError, UserId};
use crate::ports::AuditLog;

/// Audit log that keeps every note in memory.
#[derive(Default)]
pub struct RecordingAuditLog {
    notes: Mutex<Vec<(UserId, String)>>,
}

impl RecordingAuditLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every note recorded so far.
    pub async fn notes(&self) -> Vec<(UserId, String)> {
        self.notes.lock().await.clone()
    }
}

#[async_trait]
impl AuditLog for RecordingAuditLog {
    async fn record_note(&self, user_id: &UserId, text: &str) -> Result<(), DomainError> {
        self.notes
            .lock()
            .await
            .push((user_id.clone(), text.to_string()));
        Ok(())
    }
}
