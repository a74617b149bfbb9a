//! PostgreSQL audit log over the `payment_logs` table.

use async_trait::async_trait;
use sqlx::types::Json;
use sqlx::PgPool;

use crate::domain::foundation::{DomainError, OrderId, PaymentId, UserId};
use crate::domain::payment::AuditEntry;
use crate::ports::AuditLog;

pub struct PostgresAuditLog {
    pool: PgPool,
}

impl PostgresAuditLog {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AuditLog for PostgresAuditLog {
    async fn record(&self, entry: AuditEntry) -> Result<(), DomainError> {
        sqlx::query(
            r#"
            INSERT INTO payment_logs (id, event_type, order_id, payment_id, user_id, detail, occurred_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(entry.id)
        .bind(entry.event_type.as_str())
        .bind(entry.order_id.as_ref().map(OrderId::as_str))
        .bind(entry.payment_id.as_ref().map(PaymentId::as_str))
        .bind(entry.user_id.as_ref().map(UserId::as_str))
        .bind(Json(&entry.detail))
        .bind(entry.occurred_at.as_datetime())
        .execute(&self.pool)
        .await
        .map_err(|e| DomainError::database(format!("Failed to write audit entry: {}", e)))?;

        Ok(())
    }
}
