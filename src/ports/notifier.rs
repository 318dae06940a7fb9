//! Payment notification port.
//!
//! Receipts are fire-and-forget from the orchestrator's perspective:
//! at-least-once delivery, and a delivery failure never rolls back the
//! charge it describes.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::foundation::{DomainError, Money, UserId};

/// Contents of a payment receipt.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentReceipt {
    /// Holder the receipt goes to.
    pub user_id: UserId,

    /// Address to deliver to.
    pub email: String,

    /// Receipt wording, from `ChargeDescription::for_users`.
    pub description: String,

    /// Amount taken.
    pub amount: Money,

    /// Balance still outstanding after this payment.
    pub outstanding: Money,
}

/// Port for outbound payment notifications.
#[async_trait]
pub trait PaymentNotifier: Send + Sync {
    /// Sends a payment receipt.
    async fn payment_receipt(&self, receipt: PaymentReceipt) -> Result<(), DomainError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    // Trait object safety test
    #[test]
    fn payment_notifier_is_object_safe() {
        fn _accepts_dyn(_notifier: &dyn PaymentNotifier) {}
    }
}
