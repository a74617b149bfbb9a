//! PostgreSQL implementation of EntitlementRepository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::domain::foundation::{DomainError, Timestamp, UserId};
use crate::domain::payment::UserEntitlement;
use crate::ports::EntitlementRepository;

pub struct PostgresEntitlementRepository {
    pool: PgPool,
}

impl PostgresEntitlementRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct EntitlementRow {
    user_id: String,
    granted: bool,
    purchased_at: Option<DateTime<Utc>>,
}

impl TryFrom<EntitlementRow> for UserEntitlement {
    type Error = DomainError;

    fn try_from(row: EntitlementRow) -> Result<Self, Self::Error> {
        Ok(UserEntitlement {
            user_id: UserId::new(row.user_id)
                .map_err(|e| DomainError::database(format!("Invalid stored user id: {}", e)))?,
            granted: row.granted,
            purchased_at: row.purchased_at.map(Timestamp::from_datetime),
        })
    }
}

#[async_trait]
impl EntitlementRepository for PostgresEntitlementRepository {
    async fn set_entitlement(
        &self,
        user_id: &UserId,
        granted: bool,
        at: Timestamp,
    ) -> Result<(), DomainError> {
        // A re-grant keeps the original purchase time; a revoke clears it.
        sqlx::query(
            r#"
            INSERT INTO user_entitlements (user_id, granted, purchased_at, updated_at)
            VALUES ($1, $2, CASE WHEN $2 THEN $3 ELSE NULL END, $3)
            ON CONFLICT (user_id) DO UPDATE SET
                granted = EXCLUDED.granted,
                purchased_at = CASE
                    WHEN EXCLUDED.granted
                        THEN COALESCE(user_entitlements.purchased_at, EXCLUDED.purchased_at)
                    ELSE NULL
                END,
                updated_at = EXCLUDED.updated_at
            "#,
        )
        .bind(user_id.as_str())
        .bind(granted)
        .bind(at.as_datetime())
        .execute(&self.pool)
        .await
        .map_err(|e| DomainError::database(format!("Failed to set entitlement: {}", e)))?;

        Ok(())
    }

    async fn find_entitlement(
        &self,
        user_id: &UserId,
    ) -> Result<Option<UserEntitlement>, DomainError> {
        let row: Option<EntitlementRow> = sqlx::query_as(
            r#"
            SELECT user_id, granted, purchased_at
            FROM user_entitlements
            WHERE user_id = $1
            "#,
        )
        .bind(user_id.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| DomainError::database(format!("Failed to fetch entitlement: {}", e)))?;

        row.map(UserEntitlement::try_from).transpose()
    }
}
