//! Membership mutation handlers: upgrade, transfer, merge.

mod merge_reservations;
mod transfer_reservation;
mod upgrade_membership;

pub use merge_reservations::{MergeOutcome, MergeReservationsCommand, MergeReservationsHandler};
pub use transfer_reservation::{TransferReservationCommand, TransferReservationHandler};
pub use upgrade_membership::{
    UpgradeMembershipCommand, UpgradeMembershipHandler, UpgradeOutcome,
};
