//! Ledger domain module.
//!
//! The append-only record of payment attempts, and the cart machinery
//! that lets one charge settle several memberships at once.
//!
//! # Module Structure
//!
//! - `charge` - immutable Charge entries
//! - `payment_target` - what a charge was made against
//! - `cart` - Cart, CartItem and charge attribution

mod cart;
mod charge;
mod payment_target;

pub use cart::{
    attribute_cart_charges, Cart, CartAttribution, CartCredit, CartItem,
};
pub use charge::{successful_total, Charge, ChargeState, PaymentMethod};
pub use payment_target::PaymentTarget;
