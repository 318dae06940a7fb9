//! Notification adapters.
//!
//! Delivery itself is out of scope; the adapters here either log the
//! receipt (production placeholder behind the mailer) or record it for
//! test assertions.

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::domain::foundation::DomainError;
use crate::ports::{PaymentNotifier, PaymentReceipt};

/// Notifier that emits receipts to the structured log.
#[derive(Default)]
pub struct LoggingNotifier;

impl LoggingNotifier {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl PaymentNotifier for LoggingNotifier {
    async fn payment_receipt(&self, receipt: PaymentReceipt) -> Result<(), DomainError> {
        tracing::info!(
            user = %receipt.user_id,
            email = %receipt.email,
            amount = %receipt.amount,
            outstanding = %receipt.outstanding,
            "payment receipt: {}",
            receipt.description
        );
        Ok(())
    }
}

/// Notifier that keeps receipts in memory for tests.
#[derive(Default)]
pub struct RecordingNotifier {
    receipts: Mutex<Vec<PaymentReceipt>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every receipt sent so far.
    pub async fn receipts(&self) -> Vec<PaymentReceipt> {
        self.receipts.lock().await.clone()
    }
}

#[async_trait]
impl PaymentNotifier for RecordingNotifier {
    async fn payment_receipt(&self, receipt: PaymentReceipt) -> Result<(), DomainError> {
        self.receipts.lock().await.push(receipt);
        Ok(())
    }
}
