//! Stripe gateway adapters.

mod mock_gateway;
mod stripe_gateway;

pub use mock_gateway::{ChargeScript, MockPaymentGateway};
pub use stripe_gateway::{StripeConfig, StripeGateway};
