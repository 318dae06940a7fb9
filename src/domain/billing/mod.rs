//! Billing domain module.
//!
//! Pure balance arithmetic and its presentation helpers. Nothing in here
//! touches storage; the application layer assembles the inputs.
//!
//! # Module Structure
//!
//! - `balance` - the balance calculator
//! - `payment_options` - instalment amount menus
//! - `charge_description` - receipt wording
//! - `errors` - billing error taxonomy

mod balance;
mod charge_description;
mod errors;
mod payment_options;

pub use balance::{cart_amount_owed, BalanceSheet};
pub use charge_description::ChargeDescription;
pub use errors::BillingError;
pub use payment_options::{
    PaymentAmountOptions, MIN_PAYMENT_MINOR_UNITS, PAYMENT_STEP_MINOR_UNITS,
};
