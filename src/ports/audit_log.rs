//! Audit log port for payment events.

use async_trait::async_trait;

use crate::domain::foundation::DomainError;
use crate::domain::payment::AuditEntry;

/// Append-only sink for payment audit entries.
///
/// Callers treat failures as non-fatal: the request proceeds and the
/// failure is logged.
#[async_trait]
pub trait AuditLog: Send + Sync {
    async fn record(&self, entry: AuditEntry) -> Result<(), DomainError>;
}
