//! Cart repository port.

use async_trait::async_trait;

use crate::domain::foundation::{CartId, CartItemId, DomainError, ReservationId, Timestamp};
use crate::domain::ledger::{Cart, CartItem};

/// Repository port for carts and their items.
#[async_trait]
pub trait CartRepository: Send + Sync {
    /// Find a cart by its id. Returns `None` if not found.
    async fn find_cart(&self, id: CartId) -> Result<Option<Cart>, DomainError>;

    /// Every item ever held in the cart, including closed ones; balance
    /// attribution needs the closed windows too.
    async fn items_for_cart(&self, id: CartId) -> Result<Vec<CartItem>, DomainError>;

    /// Every cart item that references the reservation, across all carts.
    async fn items_for_reservation(
        &self,
        id: ReservationId,
    ) -> Result<Vec<CartItem>, DomainError>;

    /// Persists a cart.
    async fn insert_cart(&self, cart: &Cart) -> Result<(), DomainError>;

    /// Persists an item.
    async fn insert_item(&self, item: &CartItem) -> Result<(), DomainError>;

    /// Closes an item's acquisition window at `at` (reassignment).
    async fn close_item(&self, id: CartItemId, at: Timestamp) -> Result<(), DomainError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    // Trait object safety test
    #[test]
    fn cart_repository_is_object_safe() {
        fn _accepts_dyn(_repo: &dyn CartRepository) {}
    }
}
