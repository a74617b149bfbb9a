//! VerifyPaymentHandler - Command handler for the checkout callback.
//!
//! The client posts the ids and signature the checkout widget returned. A
//! matching signature marks the payment completed and grants access.

use std::sync::Arc;

use crate::domain::foundation::{OrderId, PaymentId, Timestamp, UserId};
use crate::domain::payment::{
    AuditEntry, AuditEventType, CheckoutSignatureVerifier, Order, PaymentError, PaymentRecord,
    PaymentStatus,
};
use crate::ports::{AuditLog, EntitlementRepository, PaymentRepository};

use super::record_audit;

#[derive(Debug, Clone)]
pub struct VerifyPaymentCommand {
    pub user_id: UserId,
    pub email: Option<String>,
    pub order_id: String,
    pub payment_id: String,
    pub signature: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifyPaymentResult {
    pub order_id: OrderId,
    pub payment_id: PaymentId,
    /// The payment was already completed before this call.
    pub already_verified: bool,
    /// Access was granted by this call.
    pub entitlement_granted: bool,
}

pub struct VerifyPaymentHandler {
    verifier: Arc<CheckoutSignatureVerifier>,
    payments: Arc<dyn PaymentRepository>,
    entitlements: Arc<dyn EntitlementRepository>,
    audit_log: Arc<dyn AuditLog>,
}

impl VerifyPaymentHandler {
    pub fn new(
        verifier: Arc<CheckoutSignatureVerifier>,
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

    /// Verifies the signature, then reconciles.
    ///
    /// Re-invocation with the same ids only re-confirms existing state.
    ///
    /// # Errors
    ///
    /// - `Validation` for malformed ids
    /// - `InvalidSignature` on mismatch; nothing is written
    /// - `NotFound` if the order is unknown or belongs to another user
    /// - `Infrastructure` on storage failure
    pub async fn handle(
        &self,
        cmd: VerifyPaymentCommand,
    ) -> Result<VerifyPaymentResult, PaymentError> {
        let order_id = OrderId::new(cmd.order_id)?;
        let payment_id = PaymentId::new(cmd.payment_id)?;

        if let Err(err) = self.verifier.verify(&order_id, &payment_id, &cmd.signature) {
            tracing::warn!(
                order_id = %order_id,
                payment_id = %payment_id,
                user_id = %cmd.user_id,
                "Checkout signature mismatch"
            );
            record_audit(
                self.audit_log.as_ref(),
                AuditEntry::new(AuditEventType::PaymentSignatureMismatch)
                    .with_order(&order_id)
                    .with_payment(&payment_id)
                    .with_user(&cmd.user_id),
            )
            .await;
            return Err(err);
        }

        let result = self
            .reconcile(&cmd.user_id, cmd.email, &order_id, &payment_id)
            .await;

        match &result {
            Ok(outcome) => {
                record_audit(
                    self.audit_log.as_ref(),
                    AuditEntry::new(AuditEventType::PaymentVerified)
                        .with_order(&order_id)
                        .with_payment(&payment_id)
                        .with_user(&cmd.user_id)
                        .with_detail("already_verified", outcome.already_verified),
                )
                .await;
                tracing::info!(
                    order_id = %order_id,
                    payment_id = %payment_id,
                    user_id = %cmd.user_id,
                    already_verified = outcome.already_verified,
                    "Payment verified"
                );
            }
            Err(err) => {
                tracing::error!(
                    order_id = %order_id,
                    payment_id = %payment_id,
                    error = %err,
                    "Payment verification failed after signature match"
                );
                record_audit(
                    self.audit_log.as_ref(),
                    AuditEntry::new(AuditEventType::PaymentVerificationError)
                        .with_order(&order_id)
                        .with_payment(&payment_id)
                        .with_user(&cmd.user_id)
                        .with_detail("error_code", err.code()),
                )
                .await;
            }
        }

        result
    }

    async fn reconcile(
        &self,
        user_id: &UserId,
        email: Option<String>,
        order_id: &OrderId,
        payment_id: &PaymentId,
    ) -> Result<VerifyPaymentResult, PaymentError> {
        let order = self.owned_order(user_id, order_id).await?;

        let existing = self.payments.find_payment(payment_id).await?;
        let already_verified = matches!(
            existing,
            Some(ref record) if record.status == PaymentStatus::Completed
        );

        if !already_verified {
            let record = PaymentRecord::completed_for_order(payment_id.clone(), &order, email);
            self.payments.write_payment(&record).await?;
        }

        let has_access = self
            .entitlements
            .find_entitlement(&order.user_id)
            .await?
            .map(|e| e.granted)
            .unwrap_or(false);

        if !has_access {
            self.entitlements
                .set_entitlement(&order.user_id, true, Timestamp::now())
                .await?;
        }

        Ok(VerifyPaymentResult {
            order_id: order_id.clone(),
            payment_id: payment_id.clone(),
            already_verified,
            entitlement_granted: !has_access,
        })
    }

    /// Another user's order is reported as missing.
    async fn owned_order(&self, user_id: &UserId, order_id: &OrderId) -> Result<Order, PaymentError> {
        self.payments
            .find_order(order_id)
            .await?
            .filter(|order| order.is_owned_by(user_id))
            .ok_or_else(|| PaymentError::not_found(format!("order {}", order_id)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::{InMemoryAuditLog, InMemoryPaymentStore};
    use crate::domain::payment::{compute_signature, OrderRequest};
    use secrecy::SecretString;

    const KEY_SECRET: &str = "test_key_secret";

    struct Fixture {
        store: InMemoryPaymentStore,
        audit: InMemoryAuditLog,
        handler: VerifyPaymentHandler,
    }

    fn user() -> UserId {
        UserId::new("user-1").unwrap()
    }

    async fn fixture_with_order(order_id: &str, owner: UserId) -> Fixture {
        let store = InMemoryPaymentStore::new();
        let request =
            OrderRequest::new(owner, 15100, "INR", "receipt_1700000000000", None).unwrap();
        store
            .save_order(&Order::issued(
                OrderId::new(order_id).unwrap(),
                request,
                Timestamp::now(),
            ))
            .await
            .unwrap();

        let audit = InMemoryAuditLog::new();
        let handler = VerifyPaymentHandler::new(
            Arc::new(CheckoutSignatureVerifier::new(SecretString::new(
                KEY_SECRET.to_string(),
            ))),
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

    fn command(order_id: &str, payment_id: &str, signature: String) -> VerifyPaymentCommand {
        VerifyPaymentCommand {
            user_id: user(),
            email: Some("seeker@example.com".to_string()),
            order_id: order_id.to_string(),
            payment_id: payment_id.to_string(),
            signature,
        }
    }

    fn sign(order_id: &str, payment_id: &str) -> String {
        compute_signature(
            KEY_SECRET.as_bytes(),
            format!("{}|{}", order_id, payment_id).as_bytes(),
        )
    }

    #[tokio::test]
    async fn valid_signature_completes_payment_and_grants_access() {
        let f = fixture_with_order("order_ABC", user()).await;

        let result = f
            .handler
            .handle(command("order_ABC", "pay_XYZ", sign("order_ABC", "pay_XYZ")))
            .await
            .unwrap();

        assert!(!result.already_verified);
        assert!(result.entitlement_granted);

        let payment = f
            .store
            .find_payment(&PaymentId::new("pay_XYZ").unwrap())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(payment.status, PaymentStatus::Completed);
        assert_eq!(payment.amount, 15100);

        let entitlement = f.store.find_entitlement(&user()).await.unwrap().unwrap();
        assert!(entitlement.granted);
        assert_eq!(f.audit.count_of(AuditEventType::PaymentVerified).await, 1);
    }

    #[tokio::test]
    async fn bad_signature_mutates_nothing() {
        let f = fixture_with_order("order_ABC", user()).await;

        let err = f
            .handler
            .handle(command("order_ABC", "pay_XYZ", sign("order_ABC", "pay_OTHER")))
            .await
            .unwrap_err();

        assert!(matches!(err, PaymentError::InvalidSignature));
        assert_eq!(f.store.payment_count().await, 0);
        assert!(f.store.find_entitlement(&user()).await.unwrap().is_none());
        assert_eq!(
            f.audit.count_of(AuditEventType::PaymentSignatureMismatch).await,
            1
        );
    }

    #[tokio::test]
    async fn repeat_verification_is_idempotent() {
        let f = fixture_with_order("order_ABC", user()).await;
        let cmd = command("order_ABC", "pay_XYZ", sign("order_ABC", "pay_XYZ"));

        f.handler.handle(cmd.clone()).await.unwrap();
        let second = f.handler.handle(cmd).await.unwrap();

        assert!(second.already_verified);
        assert!(!second.entitlement_granted);
        assert_eq!(f.store.payment_count().await, 1);
    }

    #[tokio::test]
    async fn unknown_order_is_not_found() {
        let f = fixture_with_order("order_ABC", user()).await;

        let err = f
            .handler
            .handle(command("order_NOPE", "pay_XYZ", sign("order_NOPE", "pay_XYZ")))
            .await
            .unwrap_err();

        assert!(matches!(err, PaymentError::NotFound(_)));
        assert_eq!(
            f.audit.count_of(AuditEventType::PaymentVerificationError).await,
            1
        );
    }

    #[tokio::test]
    async fn other_users_order_is_not_found() {
        let f = fixture_with_order("order_ABC", UserId::new("user-2").unwrap()).await;

        let err = f
            .handler
            .handle(command("order_ABC", "pay_XYZ", sign("order_ABC", "pay_XYZ")))
            .await
            .unwrap_err();

        assert!(matches!(err, PaymentError::NotFound(_)));
        assert_eq!(f.store.payment_count().await, 0);
    }

    #[tokio::test]
    async fn malformed_ids_are_validation_errors() {
        let f = fixture_with_order("order_ABC", user()).await;

        let err = f
            .handler
            .handle(command("", "pay_XYZ", "deadbeef".to_string()))
            .await
            .unwrap_err();

        assert!(matches!(err, PaymentError::Validation(_)));
    }
}
