//! PostgreSQL implementation of PaymentRepository.
//!
//! Payment writes are a single upsert guarded by `status_rank`, so two
//! concurrent writers for the same payment id resolve in the database.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::types::Json;
use sqlx::PgPool;

use crate::domain::foundation::{DomainError, OrderId, PaymentId, Timestamp, UserId};
use crate::domain::payment::{
    Amount, FailureReason, Order, OrderNotes, PaymentRecord, PaymentStatus, Receipt,
};
use crate::ports::{PaymentRepository, WriteOutcome};

pub struct PostgresPaymentRepository {
    pool: PgPool,
}

impl PostgresPaymentRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Database row representation of an order.
#[derive(Debug, sqlx::FromRow)]
struct OrderRow {
    order_id: String,
    user_id: String,
    amount: i64,
    currency: String,
    receipt: String,
    notes: Json<OrderNotes>,
    created_at: DateTime<Utc>,
}

impl TryFrom<OrderRow> for Order {
    type Error = DomainError;

    fn try_from(row: OrderRow) -> Result<Self, Self::Error> {
        Ok(Order {
            id: OrderId::new(row.order_id).map_err(invalid_column)?,
            amount: Amount::new(row.amount).map_err(invalid_column)?,
            currency: row.currency.parse().map_err(invalid_column)?,
            receipt: Receipt::new(row.receipt).map_err(invalid_column)?,
            user_id: UserId::new(row.user_id).map_err(invalid_column)?,
            notes: row.notes.0,
            created_at: Timestamp::from_datetime(row.created_at),
        })
    }
}

/// Database row representation of a payment.
#[derive(Debug, sqlx::FromRow)]
struct PaymentRow {
    payment_id: String,
    order_id: String,
    status: String,
    amount: i64,
    currency: String,
    email: Option<String>,
    user_id: Option<String>,
    method: Option<String>,
    error_code: Option<String>,
    error_description: Option<String>,
    recorded_at: DateTime<Utc>,
}

impl TryFrom<PaymentRow> for PaymentRecord {
    type Error = DomainError;

    fn try_from(row: PaymentRow) -> Result<Self, Self::Error> {
        let status: PaymentStatus = row.status.parse().map_err(invalid_column)?;
        let failure = match (row.error_code, row.error_description) {
            (None, None) => None,
            (code, description) => Some(FailureReason { code, description }),
        };

        Ok(PaymentRecord {
            payment_id: PaymentId::new(row.payment_id).map_err(invalid_column)?,
            order_id: OrderId::new(row.order_id).map_err(invalid_column)?,
            status,
            amount: u64::try_from(row.amount)
                .map_err(|_| DomainError::database(format!("negative amount {}", row.amount)))?,
            currency: row.currency,
            email: row.email,
            user_id: row.user_id.map(UserId::new).transpose().map_err(invalid_column)?,
            method: row.method,
            failure,
            recorded_at: Timestamp::from_datetime(row.recorded_at),
        })
    }
}

fn invalid_column(err: impl std::fmt::Display) -> DomainError {
    DomainError::database(format!("Invalid stored value: {}", err))
}

fn query_failed(action: &str, err: sqlx::Error) -> DomainError {
    DomainError::database(format!("Failed to {}: {}", action, err))
}

fn to_db_amount(amount: u64) -> Result<i64, DomainError> {
    i64::try_from(amount).map_err(|_| DomainError::database("amount exceeds BIGINT"))
}

#[async_trait]
impl PaymentRepository for PostgresPaymentRepository {
    async fn save_order(&self, order: &Order) -> Result<(), DomainError> {
        sqlx::query(
            r#"
            INSERT INTO orders (order_id, user_id, amount, currency, receipt, notes, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            ON CONFLICT (order_id) DO NOTHING
            "#,
        )
        .bind(order.id.as_str())
        .bind(order.user_id.as_str())
        .bind(to_db_amount(order.amount.minor_units())?)
        .bind(order.currency.as_str())
        .bind(order.receipt.as_str())
        .bind(Json(&order.notes))
        .bind(order.created_at.as_datetime())
        .execute(&self.pool)
        .await
        .map_err(|e| query_failed("save order", e))?;

        Ok(())
    }

    async fn find_order(&self, order_id: &OrderId) -> Result<Option<Order>, DomainError> {
        let row: Option<OrderRow> = sqlx::query_as(
            r#"
            SELECT order_id, user_id, amount, currency, receipt, notes, created_at
            FROM orders
            WHERE order_id = $1
            "#,
        )
        .bind(order_id.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| query_failed("fetch order", e))?;

        row.map(Order::try_from).transpose()
    }

    async fn write_payment(&self, record: &PaymentRecord) -> Result<WriteOutcome, DomainError> {
        let (error_code, error_description) = match &record.failure {
            Some(failure) => (failure.code.as_deref(), failure.description.as_deref()),
            None => (None, None),
        };

        // No row back means the guard rejected the update.
        let inserted: Option<(bool,)> = sqlx::query_as(
            r#"
            INSERT INTO payments (
                payment_id, order_id, status, status_rank, amount, currency,
                email, user_id, method, error_code, error_description, recorded_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            ON CONFLICT (payment_id) DO UPDATE SET
                order_id = EXCLUDED.order_id,
                status = EXCLUDED.status,
                status_rank = EXCLUDED.status_rank,
                amount = EXCLUDED.amount,
                currency = EXCLUDED.currency,
                email = COALESCE(EXCLUDED.email, payments.email),
                user_id = COALESCE(EXCLUDED.user_id, payments.user_id),
                method = COALESCE(EXCLUDED.method, payments.method),
                error_code = EXCLUDED.error_code,
                error_description = EXCLUDED.error_description,
                recorded_at = EXCLUDED.recorded_at
            WHERE EXCLUDED.status_rank >= payments.status_rank
            RETURNING (xmax = 0) AS inserted
            "#,
        )
        .bind(record.payment_id.as_str())
        .bind(record.order_id.as_str())
        .bind(record.status.as_str())
        .bind(i16::from(record.status.precedence()))
        .bind(to_db_amount(record.amount)?)
        .bind(&record.currency)
        .bind(&record.email)
        .bind(record.user_id.as_ref().map(UserId::as_str))
        .bind(&record.method)
        .bind(error_code)
        .bind(error_description)
        .bind(record.recorded_at.as_datetime())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| query_failed("write payment", e))?;

        Ok(match inserted {
            Some((true,)) => WriteOutcome::Inserted,
            Some((false,)) => WriteOutcome::Replaced,
            None => WriteOutcome::Kept,
        })
    }

    async fn find_payment(
        &self,
        payment_id: &PaymentId,
    ) -> Result<Option<PaymentRecord>, DomainError> {
        let row: Option<PaymentRow> = sqlx::query_as(
            r#"
            SELECT payment_id, order_id, status, amount, currency, email, user_id,
                   method, error_code, error_description, recorded_at
            FROM payments
            WHERE payment_id = $1
            "#,
        )
        .bind(payment_id.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| query_failed("fetch payment", e))?;

        row.map(PaymentRecord::try_from).transpose()
    }

    async fn read_user_payments(&self, user_id: &UserId) -> Result<Vec<PaymentRecord>, DomainError> {
        let rows: Vec<PaymentRow> = sqlx::query_as(
            r#"
            SELECT payment_id, order_id, status, amount, currency, email, user_id,
                   method, error_code, error_description, recorded_at
            FROM payments
            WHERE user_id = $1
            ORDER BY recorded_at DESC
            "#,
        )
        .bind(user_id.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| query_failed("list payments", e))?;

        rows.into_iter().map(PaymentRecord::try_from).collect()
    }
}
