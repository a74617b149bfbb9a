//! Audit log adapters that need no storage.

mod tracing_log;

pub use tracing_log::TracingAuditLog;
