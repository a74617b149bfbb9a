//! PostgreSQL adapters - Database implementations for repository ports.
//!
//! - `PostgresPaymentRepository` - Orders and precedence-guarded payment upserts
//! - `PostgresEntitlementRepository` - Per-user e-book access
//! - `PostgresAuditLog` - Append-only `payment_logs` table

mod audit_log;
mod entitlement_repository;
mod payment_repository;

pub use audit_log::PostgresAuditLog;
pub use entitlement_repository::PostgresEntitlementRepository;
pub use payment_repository::PostgresPaymentRepository;
