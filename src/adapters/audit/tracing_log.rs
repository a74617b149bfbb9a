//! Audit log that writes entries as structured log events.
//!
//! Used when no database is configured. Entries go to the `audit` target so
//! they can be routed separately with an `EnvFilter` directive.

use async_trait::async_trait;

use crate::domain::foundation::DomainError;
use crate::domain::payment::AuditEntry;
use crate::ports::AuditLog;

#[derive(Debug, Clone, Copy, Default)]
pub struct TracingAuditLog;

impl TracingAuditLog {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl AuditLog for TracingAuditLog {
    async fn record(&self, entry: AuditEntry) -> Result<(), DomainError> {
        let order_id = entry.order_id.as_ref().map(|id| id.as_str()).unwrap_or("-");
        let payment_id = entry.payment_id.as_ref().map(|id| id.as_str()).unwrap_or("-");
        let user_id = entry.user_id.as_ref().map(|id| id.as_str()).unwrap_or("-");

        if entry.event_type.is_security_event() {
            tracing::warn!(
                target: "audit",
                audit_id = %entry.id,
                event_type = %entry.event_type,
                order_id,
                payment_id,
                user_id,
                detail = %entry.detail,
                "payment audit"
            );
        } else {
            tracing::info!(
                target: "audit",
                audit_id = %entry.id,
                event_type = %entry.event_type,
                order_id,
                payment_id,
                user_id,
                detail = %entry.detail,
                "payment audit"
            );
        }
        Ok(())
    }
}
