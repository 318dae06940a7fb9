//! Purchase handlers: issuing new reservations.

mod claim_membership;

pub use claim_membership::{PurchaseMembershipCommand, PurchaseMembershipHandler};
