//! Ports - interfaces to the outside world.
//!
//! Every dependency the application layer has on storage, the payment
//! gateway, notification or auditing goes through one of these traits.
//! Adapters implement them; handlers consume them as `Arc<dyn T>`.

mod audit_log;
mod cart_repository;
mod catalog_repository;
mod customer_directory;
mod ledger_repository;
mod notifier;
mod payment_gateway;
mod reservation_repository;

pub use audit_log::AuditLog;
pub use cart_repository::CartRepository;
pub use catalog_repository::CatalogRepository;
pub use customer_directory::CustomerDirectory;
pub use ledger_repository::LedgerRepository;
pub use notifier::{PaymentNotifier, PaymentReceipt};
pub use payment_gateway::{
    CreateChargeRequest, CreateCustomerRequest, GatewayCharge, GatewayCustomer, GatewayError,
    PaymentGateway,
};
pub use reservation_repository::{NewReservation, ReservationRepository, TierChange};
