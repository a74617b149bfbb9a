//! In-memory payment and entitlement store.
//!
//! Used when no database is configured and throughout the tests. State is
//! lost on restart, so single-instance development only.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::foundation::{DomainError, OrderId, PaymentId, Timestamp, UserId};
use crate::domain::payment::{Order, PaymentRecord, UserEntitlement};
use crate::ports::{EntitlementRepository, PaymentRepository, WriteOutcome};

#[derive(Debug, Default)]
struct StoreState {
    orders: HashMap<OrderId, Order>,
    payments: HashMap<PaymentId, PaymentRecord>,
    entitlements: HashMap<UserId, UserEntitlement>,
}

/// Implements both `PaymentRepository` and `EntitlementRepository` over one
/// lock, so a clone can be handed to each port.
#[derive(Debug, Clone, Default)]
pub struct InMemoryPaymentStore {
    state: Arc<RwLock<StoreState>>,
}

impl InMemoryPaymentStore {
    pub fn new() -> Self {
        Self::default()
    }

    // === Test Helpers ===

    pub async fn payment_count(&self) -> usize {
        self.state.read().await.payments.len()
    }

    pub async fn order_count(&self) -> usize {
        self.state.read().await.orders.len()
    }
}

#[async_trait]
impl PaymentRepository for InMemoryPaymentStore {
    async fn save_order(&self, order: &Order) -> Result<(), DomainError> {
        let mut state = self.state.write().await;
        state
            .orders
            .entry(order.id.clone())
            .or_insert_with(|| order.clone());
        Ok(())
    }

    async fn find_order(&self, order_id: &OrderId) -> Result<Option<Order>, DomainError> {
        Ok(self.state.read().await.orders.get(order_id).cloned())
    }

    async fn write_payment(&self, record: &PaymentRecord) -> Result<WriteOutcome, DomainError> {
        let mut state = self.state.write().await;
        let mut incoming = record.clone();
        let outcome = match state.payments.get(&record.payment_id) {
            None => WriteOutcome::Inserted,
            Some(existing) if record.supersedes(existing) => {
                // Fields the newer writer did not know are kept.
                incoming.email = incoming.email.or_else(|| existing.email.clone());
                incoming.user_id = incoming.user_id.or_else(|| existing.user_id.clone());
                incoming.method = incoming.method.or_else(|| existing.method.clone());
                WriteOutcome::Replaced
            }
            Some(_) => return Ok(WriteOutcome::Kept),
        };
        state.payments.insert(record.payment_id.clone(), incoming);
        Ok(outcome)
    }

    async fn find_payment(
        &self,
        payment_id: &PaymentId,
    ) -> Result<Option<PaymentRecord>, DomainError> {
        Ok(self.state.read().await.payments.get(payment_id).cloned())
    }

    async fn read_user_payments(&self, user_id: &UserId) -> Result<Vec<PaymentRecord>, DomainError> {
        let state = self.state.read().await;
        let mut records: Vec<PaymentRecord> = state
            .payments
            .values()
            .filter(|r| r.user_id.as_ref() == Some(user_id))
            .cloned()
            .collect();
        records.sort_by(|a, b| b.recorded_at.cmp(&a.recorded_at));
        Ok(records)
    }
}

#[async_trait]
impl EntitlementRepository for InMemoryPaymentStore {
    async fn set_entitlement(
        &self,
        user_id: &UserId,
        granted: bool,
        at: Timestamp,
    ) -> Result<(), DomainError> {
        let mut state = self.state.write().await;
        state
            .entitlements
            .entry(user_id.clone())
            .or_insert_with(|| UserEntitlement::none(user_id.clone()))
            .apply(granted, at);
        Ok(())
    }

    async fn find_entitlement(
        &self,
        user_id: &UserId,
    ) -> Result<Option<UserEntitlement>, DomainError> {
        Ok(self.state.read().await.entitlements.get(user_id).cloned())
    }
}
