//! CreateOrderHandler - Command handler for requesting a gateway order.

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::domain::foundation::{Timestamp, UserId};
use crate::domain::payment::{AuditEntry, AuditEventType, Order, OrderRequest, PaymentError};
use crate::ports::{AuditLog, PaymentGateway, PaymentRepository};

use super::record_audit;

/// Command to create an order for the authenticated user.
#[derive(Debug, Clone)]
pub struct CreateOrderCommand {
    pub user_id: UserId,
    /// Minor units. Signed so negative input is reported, not wrapped.
    pub amount: i64,
    pub currency: String,
    pub receipt: String,
    pub notes: Option<BTreeMap<String, String>>,
}

#[derive(Debug, Clone)]
pub struct CreateOrderResult {
    pub order: Order,
}

/// Validates the request, asks the gateway for an order, and stores it.
///
/// Invalid input never reaches the gateway. Gateway failures are not
/// retried.
pub struct CreateOrderHandler {
    gateway: Arc<dyn PaymentGateway>,
    repository: Arc<dyn PaymentRepository>,
    audit_log: Arc<dyn AuditLog>,
}

impl CreateOrderHandler {
    pub fn new(
        gateway: Arc<dyn PaymentGateway>,
        repository: Arc<dyn PaymentRepository>,
        audit_log: Arc<dyn AuditLog>,
    ) -> Self {
        Self {
            gateway,
            repository,
            audit_log,
        }
    }

    pub async fn handle(&self, cmd: CreateOrderCommand) -> Result<CreateOrderResult, PaymentError> {
        let request = match OrderRequest::new(
            cmd.user_id.clone(),
            cmd.amount,
            &cmd.currency,
            &cmd.receipt,
            cmd.notes,
        ) {
            Ok(request) => request,
            Err(err) => {
                tracing::debug!(user_id = %cmd.user_id, field = err.field(), "Order request rejected");
                record_audit(
                    self.audit_log.as_ref(),
                    AuditEntry::new(AuditEventType::OrderRejected)
                        .with_user(&cmd.user_id)
                        .with_detail("field", err.field()),
                )
                .await;
                return Err(err.into());
            }
        };

        let issued = match self.gateway.create_order(&request).await {
            Ok(issued) => issued,
            Err(err) => {
                tracing::error!(
                    user_id = %cmd.user_id,
                    receipt = %request.receipt.as_str(),
                    error = %err,
                    "Gateway order creation failed"
                );
                record_audit(
                    self.audit_log.as_ref(),
                    AuditEntry::new(AuditEventType::OrderCreationError)
                        .with_user(&cmd.user_id)
                        .with_detail("receipt", request.receipt.as_str())
                        .with_detail("error_code", format!("{:?}", err.code)),
                )
                .await;
                return Err(err.into());
            }
        };

        let created_at = Timestamp::from_unix_secs(issued.created_at).unwrap_or_else(Timestamp::now);
        let order = Order::issued(issued.id, request, created_at);

        self.repository.save_order(&order).await.map_err(|e| {
            tracing::error!(order_id = %order.id, error = %e, "Failed to store issued order");
            PaymentError::from(e)
        })?;

        record_audit(
            self.audit_log.as_ref(),
            AuditEntry::new(AuditEventType::OrderCreated)
                .with_order(&order.id)
                .with_user(&order.user_id)
                .with_detail("amount", order.amount.minor_units())
                .with_detail("currency", order.currency.as_str())
                .with_detail("receipt", order.receipt.as_str()),
        )
        .await;

        tracing::info!(
            order_id = %order.id,
            user_id = %order.user_id,
            amount = order.amount.minor_units(),
            currency = %order.currency,
            "Order created"
        );

        Ok(CreateOrderResult { order })
    }
}
