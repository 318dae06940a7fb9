//! Billing handlers: balance queries and the payment orchestrator.

mod charge_customer;
mod get_balance;

pub use charge_customer::{ChargeCommand, ChargeCustomerHandler, ChargeOutcome};
pub use get_balance::BalanceQuery;
