//! Persistence port for orders and payment records.

use async_trait::async_trait;

use crate::domain::foundation::{DomainError, OrderId, PaymentId, UserId};
use crate::domain::payment::{Order, PaymentRecord};

/// Port for storing orders and payment records.
///
/// # Contract
///
/// - Orders are immutable: `save_order` for an existing id is a no-op.
/// - `write_payment` is an idempotent overwrite keyed by payment id. It must
///   apply `PaymentRecord::supersedes` atomically, so concurrent deliveries
///   converge on the highest-precedence status.
/// - `read_user_payments` returns newest first.
#[async_trait]
pub trait PaymentRepository: Send + Sync {
    async fn save_order(&self, order: &Order) -> Result<(), DomainError>;

    async fn find_order(&self, order_id: &OrderId) -> Result<Option<Order>, DomainError>;

    async fn write_payment(&self, record: &PaymentRecord) -> Result<WriteOutcome, DomainError>;

    async fn find_payment(&self, payment_id: &PaymentId)
        -> Result<Option<PaymentRecord>, DomainError>;

    async fn read_user_payments(&self, user_id: &UserId) -> Result<Vec<PaymentRecord>, DomainError>;
}

/// What `write_payment` did with the record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOutcome {
    /// First record for this payment id.
    Inserted,
    /// Overwrote an existing record of equal or lower precedence.
    Replaced,
    /// Existing record has higher precedence and was kept.
    Kept,
}

impl WriteOutcome {
    /// True unless the write was discarded.
    pub fn was_applied(&self) -> bool {
        !matches!(self, WriteOutcome::Kept)
    }
}
