//! HandleWebhookHandler - Command handler for gateway webhooks.
//!
//! The authoritative reconciliation path: it runs even if the client never
//! returns from checkout.

use std::sync::Arc;

use crate::domain::foundation::{PaymentId, UserId};
use crate::domain::payment::{
    AuditEntry, AuditEventType, GatewayEvent, PaymentEntity, PaymentError, PaymentRecord,
    PaymentStatus, WebhookSignatureVerifier,
};
use crate::ports::{AuditLog, EntitlementRepository, PaymentRepository, WriteOutcome};

use super::record_audit;

#[derive(Debug, Clone)]
pub struct HandleWebhookCommand {
    /// Raw request body, exactly as received.
    pub body: Vec<u8>,
    /// Value of the `x-razorpay-signature` header.
    pub signature: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HandleWebhookResult {
    PaymentCaptured {
        payment_id: PaymentId,
        /// False when no user could be linked to the payment.
        entitlement_granted: bool,
    },
    PaymentFailed {
        payment_id: PaymentId,
    },
    PaymentAuthorized {
        payment_id: PaymentId,
        /// False when a higher-precedence status was already stored.
        recorded: bool,
    },
    /// Event type this service does not act on.
    Ignored {
        event: String,
    },
}

impl HandleWebhookResult {
    pub fn outcome(&self) -> &'static str {
        match self {
            HandleWebhookResult::PaymentCaptured { .. } => "payment_captured",
            HandleWebhookResult::PaymentFailed { .. } => "payment_failed",
            HandleWebhookResult::PaymentAuthorized { .. } => "payment_authorized",
            HandleWebhookResult::Ignored { .. } => "ignored",
        }
    }
}

pub struct HandleWebhookHandler {
    verifier: Arc<WebhookSignatureVerifier>,
    payments: Arc<dyn PaymentRepository>,
    entitlements: Arc<dyn EntitlementRepository>,
    audit_log: Arc<dyn AuditLog>,
}

impl HandleWebhookHandler {
    pub fn new(
        verifier: Arc<WebhookSignatureVerifier>,
        payments: Arc<dyn PaymentRepository>,
        entitlements: Arc<dyn EntitlementRepository>,
        audit_log: Arc<dyn AuditLog>,
    ) -> Self {
        Self {
            verifier,
            payments,
            entitlements,
            audit_log,
        }
    }

    /// # Errors
    ///
    /// - `MissingSignature` / `InvalidSignature`: payload is not processed
    /// - `MalformedPayload`: signed but unusable, not worth redelivering
    /// - `Infrastructure`: storage failed, the gateway should redeliver
    pub async fn handle(
        &self,
        cmd: HandleWebhookCommand,
    ) -> Result<HandleWebhookResult, PaymentError> {
        if let Err(err) = self.verifier.verify(&cmd.body, cmd.signature.as_deref()) {
            tracing::warn!(
                reason = err.code(),
                body_len = cmd.body.len(),
                "Webhook signature rejected"
            );
            record_audit(
                self.audit_log.as_ref(),
                AuditEntry::new(AuditEventType::WebhookSignatureRejected)
                    .with_detail("reason", err.code()),
            )
            .await;
            return Err(err);
        }

        let event = GatewayEvent::parse(&cmd.body).map_err(|err| {
            tracing::warn!(error = %err, "Signed webhook payload could not be parsed");
            err
        })?;

        tracing::debug!(event = event.event_type(), "Webhook verified");

        match event {
            GatewayEvent::PaymentCaptured(entity) => self.on_captured(&entity).await,
            GatewayEvent::PaymentFailed(entity) => self.on_failed(&entity).await,
            GatewayEvent::PaymentAuthorized(entity) => self.on_authorized(&entity).await,
            GatewayEvent::Unknown { event, .. } => {
                tracing::info!(event = %event, "Unhandled webhook event");
                record_audit(
                    self.audit_log.as_ref(),
                    AuditEntry::new(AuditEventType::WebhookEventIgnored)
                        .with_detail("event", event.as_str()),
                )
                .await;
                Ok(HandleWebhookResult::Ignored { event })
            }
        }
    }

    async fn on_captured(
        &self,
        entity: &PaymentEntity,
    ) -> Result<HandleWebhookResult, PaymentError> {
        let user_id = self.resolve_user(entity).await?;
        let record = entity.to_record(PaymentStatus::Completed, user_id.clone())?;
        let outcome = self.payments.write_payment(&record).await?;

        let entitlement_granted = match &user_id {
            Some(user_id) => {
                self.entitlements
                    .set_entitlement(user_id, true, record.recorded_at)
                    .await?;
                true
            }
            None => {
                tracing::warn!(
                    payment_id = %record.payment_id,
                    order_id = %record.order_id,
                    "Captured payment has no linked user; entitlement not granted"
                );
                false
            }
        };

        self.audit_write(AuditEventType::WebhookPaymentCaptured, &record, outcome)
            .await;
        tracing::info!(
            payment_id = %record.payment_id,
            order_id = %record.order_id,
            entitlement_granted,
            "Payment captured"
        );

        Ok(HandleWebhookResult::PaymentCaptured {
            payment_id: record.payment_id,
            entitlement_granted,
        })
    }

    async fn on_failed(&self, entity: &PaymentEntity) -> Result<HandleWebhookResult, PaymentError> {
        let user_id = self.resolve_user(entity).await?;
        let record = entity.to_record(PaymentStatus::Failed, user_id)?;
        let outcome = self.payments.write_payment(&record).await?;

        self.audit_write(AuditEventType::WebhookPaymentFailed, &record, outcome)
            .await;
        tracing::info!(
            payment_id = %record.payment_id,
            order_id = %record.order_id,
            error_code = entity.error_code.as_deref().unwrap_or("unknown"),
            "Payment failed"
        );

        Ok(HandleWebhookResult::PaymentFailed {
            payment_id: record.payment_id,
        })
    }

    async fn on_authorized(
        &self,
        entity: &PaymentEntity,
    ) -> Result<HandleWebhookResult, PaymentError> {
        let user_id = self.resolve_user(entity).await?;
        let record = entity.to_record(PaymentStatus::Authorized, user_id)?;
        let outcome = self.payments.write_payment(&record).await?;

        self.audit_write(AuditEventType::WebhookPaymentAuthorized, &record, outcome)
            .await;

        Ok(HandleWebhookResult::PaymentAuthorized {
            payment_id: record.payment_id,
            recorded: outcome.was_applied(),
        })
    }

    /// User from the order notes, falling back to the stored order's owner.
    async fn resolve_user(&self, entity: &PaymentEntity) -> Result<Option<UserId>, PaymentError> {
        if let Some(user_id) = entity.user_id() {
            return Ok(Some(user_id));
        }
        let order_id = entity.order_id()?;
        let order = self.payments.find_order(&order_id).await?;
        Ok(order.map(|o| o.user_id))
    }

    async fn audit_write(
        &self,
        event_type: AuditEventType,
        record: &PaymentRecord,
        outcome: WriteOutcome,
    ) {
        let mut entry = AuditEntry::new(event_type)
            .with_order(&record.order_id)
            .with_payment(&record.payment_id)
            .with_detail("amount", record.amount)
            .with_detail("write", format!("{:?}", outcome).to_lowercase());
        if let Some(user_id) = &record.user_id {
            entry = entry.with_user(user_id);
        }
        record_audit(self.audit_log.as_ref(), entry).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::{InMemoryAuditLog, InMemoryPaymentStore};
    use crate::domain::foundation::{DomainError, OrderId, Timestamp};
    use crate::domain::payment::{compute_signature, Order, OrderRequest};
    use async_trait::async_trait;
    use secrecy::SecretString;
    use serde_json::{json, Value};

    const WEBHOOK_SECRET: &str = "whsec_test_secret";

    // ════════════════════════════════════════════════════════════════════════════
    // Fixtures
    // ════════════════════════════════════════════════════════════════════════════

    struct Fixture {
        store: InMemoryPaymentStore,
        audit: InMemoryAuditLog,
        handler: HandleWebhookHandler,
    }

    fn verifier() -> Arc<WebhookSignatureVerifier> {
        Arc::new(WebhookSignatureVerifier::new(SecretString::new(
            WEBHOOK_SECRET.to_string(),
        )))
    }

    fn fixture() -> Fixture {
        let store = InMemoryPaymentStore::new();
        let audit = InMemoryAuditLog::new();
        let handler = HandleWebhookHandler::new(
            verifier(),
            Arc::new(store.clone()),
            Arc::new(store.clone()),
            Arc::new(audit.clone()),
        );
        Fixture {
            store,
            audit,
            handler,
        }
    }

    fn user() -> UserId {
        UserId::new("user-1").unwrap()
    }

    fn entity(notes: Value) -> Value {
        json!({
            "id": "pay_XYZ",
            "entity": "payment",
            "amount": 15100,
            "currency": "INR",
            "status": "captured",
            "order_id": "order_ABC",
            "method": "card",
            "email": "seeker@example.com",
            "notes": notes,
            "created_at": 1700000000
        })
    }

    fn body(event: &str, entity: Value) -> Vec<u8> {
        serde_json::to_vec(&json!({
            "entity": "event",
            "event": event,
            "payload": { "payment": { "entity": entity } }
        }))
        .unwrap()
    }

    fn signed(body: Vec<u8>) -> HandleWebhookCommand {
        let signature = compute_signature(WEBHOOK_SECRET.as_bytes(), &body);
        HandleWebhookCommand {
            body,
            signature: Some(signature),
        }
    }

    async fn status_of(store: &InMemoryPaymentStore) -> PaymentStatus {
        store
            .find_payment(&PaymentId::new("pay_XYZ").unwrap())
            .await
            .unwrap()
            .unwrap()
            .status
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Signature Tests
    // ════════════════════════════════════════════════════════════════════════════

    #[tokio::test]
    async fn missing_signature_is_rejected() {
        let f = fixture();
        let cmd = HandleWebhookCommand {
            body: body("payment.captured", entity(json!({"userId": "user-1"}))),
            signature: None,
        };

        assert!(matches!(
            f.handler.handle(cmd).await,
            Err(PaymentError::MissingSignature)
        ));
        assert_eq!(f.store.payment_count().await, 0);
    }

    #[tokio::test]
    async fn tampered_body_is_rejected() {
        let f = fixture();
        let mut cmd = signed(body("payment.captured", entity(json!({"userId": "user-1"}))));
        cmd.body = body("payment.captured", entity(json!({"userId": "attacker"})));

        assert!(matches!(
            f.handler.handle(cmd).await,
            Err(PaymentError::InvalidSignature)
        ));
        assert_eq!(f.store.payment_count().await, 0);
        assert_eq!(
            f.audit.count_of(AuditEventType::WebhookSignatureRejected).await,
            1
        );
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Captured Tests
    // ════════════════════════════════════════════════════════════════════════════

    #[tokio::test]
    async fn captured_grants_entitlement() {
        let f = fixture();

        let result = f
            .handler
            .handle(signed(body("payment.captured", entity(json!({"userId": "user-1"})))))
            .await
            .unwrap();

        assert_eq!(
            result,
            HandleWebhookResult::PaymentCaptured {
                payment_id: PaymentId::new("pay_XYZ").unwrap(),
                entitlement_granted: true,
            }
        );
        assert_eq!(status_of(&f.store).await, PaymentStatus::Completed);
        assert!(f.store.find_entitlement(&user()).await.unwrap().unwrap().granted);
    }

    #[tokio::test]
    async fn duplicate_delivery_yields_one_record() {
        let f = fixture();
        let cmd = signed(body("payment.captured", entity(json!({"userId": "user-1"}))));

        f.handler.handle(cmd.clone()).await.unwrap();
        f.handler.handle(cmd).await.unwrap();

        assert_eq!(f.store.payment_count().await, 1);
        assert_eq!(status_of(&f.store).await, PaymentStatus::Completed);
    }

    #[tokio::test]
    async fn captured_without_notes_uses_stored_order_owner() {
        let f = fixture();
        let request =
            OrderRequest::new(user(), 15100, "INR", "receipt_1700000000000", None).unwrap();
        f.store
            .save_order(&Order::issued(
                OrderId::new("order_ABC").unwrap(),
                request,
                Timestamp::now(),
            ))
            .await
            .unwrap();

        f.handler
            .handle(signed(body("payment.captured", entity(json!([])))))
            .await
            .unwrap();

        assert!(f.store.find_entitlement(&user()).await.unwrap().unwrap().granted);
    }

    #[tokio::test]
    async fn captured_without_any_user_records_payment_only() {
        let f = fixture();

        let result = f
            .handler
            .handle(signed(body("payment.captured", entity(json!([])))))
            .await
            .unwrap();

        assert!(matches!(
            result,
            HandleWebhookResult::PaymentCaptured {
                entitlement_granted: false,
                ..
            }
        ));
        assert_eq!(f.store.payment_count().await, 1);
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Failed / Authorized Tests
    // ════════════════════════════════════════════════════════════════════════════

    #[tokio::test]
    async fn failed_records_reason_and_leaves_entitlement_false() {
        let f = fixture();
        let mut failed = entity(json!({"userId": "user-1"}));
        failed["status"] = json!("failed");
        failed["error_code"] = json!("BAD_REQUEST_ERROR");
        failed["error_description"] = json!("Payment processing failed because of incorrect OTP");

        f.handler
            .handle(signed(body("payment.failed", failed)))
            .await
            .unwrap();

        let record = f
            .store
            .find_payment(&PaymentId::new("pay_XYZ").unwrap())
            .await
            .unwrap()
            .unwrap();
        let failure = record.failure.unwrap();
        assert_eq!(record.status, PaymentStatus::Failed);
        assert_eq!(failure.code.as_deref(), Some("BAD_REQUEST_ERROR"));
        assert_eq!(
            failure.description.as_deref(),
            Some("Payment processing failed because of incorrect OTP")
        );
        assert!(f.store.find_entitlement(&user()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn late_authorized_keeps_completed() {
        let f = fixture();
        f.handler
            .handle(signed(body("payment.captured", entity(json!({"userId": "user-1"})))))
            .await
            .unwrap();

        let result = f
            .handler
            .handle(signed(body("payment.authorized", entity(json!({"userId": "user-1"})))))
            .await
            .unwrap();

        assert!(matches!(
            result,
            HandleWebhookResult::PaymentAuthorized { recorded: false, .. }
        ));
        assert_eq!(status_of(&f.store).await, PaymentStatus::Completed);
    }

    #[tokio::test]
    async fn authorized_does_not_grant_entitlement() {
        let f = fixture();
        f.handler
            .handle(signed(body("payment.authorized", entity(json!({"userId": "user-1"})))))
            .await
            .unwrap();

        assert_eq!(status_of(&f.store).await, PaymentStatus::Authorized);
        assert!(f.store.find_entitlement(&user()).await.unwrap().is_none());
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Other Events
    // ════════════════════════════════════════════════════════════════════════════

    #[tokio::test]
    async fn unknown_event_is_ignored() {
        let f = fixture();
        let raw = serde_json::to_vec(&json!({"event": "order.paid", "payload": {}})).unwrap();

        let result = f.handler.handle(signed(raw)).await.unwrap();

        assert_eq!(
            result,
            HandleWebhookResult::Ignored {
                event: "order.paid".to_string()
            }
        );
        assert_eq!(f.store.payment_count().await, 0);
        assert_eq!(f.audit.count_of(AuditEventType::WebhookEventIgnored).await, 1);
    }

    #[tokio::test]
    async fn signed_garbage_is_malformed() {
        let f = fixture();
        let result = f.handler.handle(signed(b"not json".to_vec())).await;
        assert!(matches!(result, Err(PaymentError::MalformedPayload(_))));
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Storage Failure
    // ════════════════════════════════════════════════════════════════════════════

    struct FailingPayments;

    #[async_trait]
    impl PaymentRepository for FailingPayments {
        async fn save_order(&self, _order: &Order) -> Result<(), DomainError> {
            Err(DomainError::database("down"))
        }
        async fn find_order(&self, _id: &OrderId) -> Result<Option<Order>, DomainError> {
            Err(DomainError::database("down"))
        }
        async fn write_payment(&self, _r: &PaymentRecord) -> Result<WriteOutcome, DomainError> {
            Err(DomainError::database("down"))
        }
        async fn find_payment(&self, _id: &PaymentId) -> Result<Option<PaymentRecord>, DomainError> {
            Err(DomainError::database("down"))
        }
        async fn read_user_payments(&self, _u: &UserId) -> Result<Vec<PaymentRecord>, DomainError> {
            Err(DomainError::database("down"))
        }
    }

    #[tokio::test]
    async fn storage_failure_is_retryable() {
        let store = InMemoryPaymentStore::new();
        let handler = HandleWebhookHandler::new(
            verifier(),
            Arc::new(FailingPayments),
            Arc::new(store.clone()),
            Arc::new(InMemoryAuditLog::new()),
        );

        let err = handler
            .handle(signed(body("payment.captured", entity(json!({"userId": "user-1"})))))
            .await
            .unwrap_err();

        assert!(err.is_retryable());
        assert!(store.find_entitlement(&user()).await.unwrap().is_none());
    }
}
