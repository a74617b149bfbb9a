//! In-memory adapters for development and testing.

mod audit_log;
mod payment_store;

pub use audit_log::InMemoryAuditLog;
pub use payment_store::InMemoryPaymentStore;
