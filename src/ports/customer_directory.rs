//! Customer directory port.
//!
//! Maps internal users to their gateway customer ids so a customer is
//! created in the gateway once and reused for every later payment.

use async_trait::async_trait;

use crate::domain::foundation::{DomainError, UserId};

/// Port for the user-to-gateway-customer mapping.
#[async_trait]
pub trait CustomerDirectory: Send + Sync {
    /// The gateway customer id previously remembered for `user_id`, if
    /// any.
    async fn gateway_customer_id(&self, user_id: &UserId) -> Result<Option<String>, DomainError>;

    /// Remembers `customer_id` as the gateway customer for `user_id`.
    async fn remember_gateway_customer(
        &self,
        user_id: &UserId,
        customer_id: &str,
    ) -> Result<(), DomainError>;
}
