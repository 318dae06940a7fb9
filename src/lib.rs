//! ConReg - Convention Membership Registration Service
//!
//! Sells memberships against a versioned tier catalog, tracks who holds
//! which reservation, takes full and instalment payments through a card
//! gateway, and keeps the money arithmetic exact across upgrades,
//! transfers and merges.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
