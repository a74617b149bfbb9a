//! Payment audit trail entries.
//!
//! Entries carry identifiers and amounts only. Secrets and signatures are
//! never recorded.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use uuid::Uuid;

use crate::domain::foundation::{OrderId, PaymentId, Timestamp, UserId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AuditEventType {
    OrderCreated,
    OrderRejected,
    OrderCreationError,
    PaymentSignatureMismatch,
    PaymentVerified,
    PaymentVerificationError,
    WebhookSignatureRejected,
    WebhookPaymentCaptured,
    WebhookPaymentFailed,
    WebhookPaymentAuthorized,
    WebhookEventIgnored,
}

impl AuditEventType {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuditEventType::OrderCreated => "ORDER_CREATED",
            AuditEventType::OrderRejected => "ORDER_REJECTED",
            AuditEventType::OrderCreationError => "ORDER_CREATION_ERROR",
            AuditEventType::PaymentSignatureMismatch => "PAYMENT_SIGNATURE_MISMATCH",
            AuditEventType::PaymentVerified => "PAYMENT_VERIFIED",
            AuditEventType::PaymentVerificationError => "PAYMENT_VERIFICATION_ERROR",
            AuditEventType::WebhookSignatureRejected => "WEBHOOK_SIGNATURE_REJECTED",
            AuditEventType::WebhookPaymentCaptured => "WEBHOOK_PAYMENT_CAPTURED",
            AuditEventType::WebhookPaymentFailed => "WEBHOOK_PAYMENT_FAILED",
            AuditEventType::WebhookPaymentAuthorized => "WEBHOOK_PAYMENT_AUTHORIZED",
            AuditEventType::WebhookEventIgnored => "WEBHOOK_EVENT_IGNORED",
        }
    }

    /// Security-relevant events are logged at `warn`.
    pub fn is_security_event(&self) -> bool {
        matches!(
            self,
            AuditEventType::PaymentSignatureMismatch | AuditEventType::WebhookSignatureRejected
        )
    }
}

impl fmt::Display for AuditEventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditEntry {
    pub id: Uuid,
    pub event_type: AuditEventType,
    pub order_id: Option<OrderId>,
    pub payment_id: Option<PaymentId>,
    pub user_id: Option<UserId>,
    pub detail: Value,
    pub occurred_at: Timestamp,
}

impl AuditEntry {
    pub fn new(event_type: AuditEventType) -> Self {
        Self {
            id: Uuid::new_v4(),
            event_type,
            order_id: None,
            payment_id: None,
            user_id: None,
            detail: Value::Object(Map::new()),
            occurred_at: Timestamp::now(),
        }
    }

    pub fn with_order(mut self, order_id: &OrderId) -> Self {
        self.order_id = Some(order_id.clone());
        self
    }

    pub fn with_payment(mut self, payment_id: &PaymentId) -> Self {
        self.payment_id = Some(payment_id.clone());
        self
    }

    pub fn with_user(mut self, user_id: &UserId) -> Self {
        self.user_id = Some(user_id.clone());
        self
    }

    pub fn with_detail(mut self, key: &str, value: impl Into<Value>) -> Self {
        if let Value::Object(map) = &mut self.detail {
            map.insert(key.to_string(), value.into());
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn event_type_serializes_as_screaming_snake() {
        assert_eq!(
            serde_json::to_string(&AuditEventType::PaymentSignatureMismatch).unwrap(),
            "\"PAYMENT_SIGNATURE_MISMATCH\""
        );
        assert_eq!(AuditEventType::OrderCreationError.as_str(), "ORDER_CREATION_ERROR");
    }

    #[test]
    fn builder_collects_ids_and_detail() {
        let entry = AuditEntry::new(AuditEventType::OrderCreated)
            .with_order(&OrderId::new("order_ABC").unwrap())
            .with_user(&UserId::new("user-1").unwrap())
            .with_detail("amount", 15100)
            .with_detail("currency", "INR");

        assert_eq!(entry.order_id.unwrap().as_str(), "order_ABC");
        assert_eq!(entry.detail["amount"], 15100);
        assert_eq!(entry.detail["currency"], "INR");
        assert!(entry.payment_id.is_none());
    }

    #[test]
    fn only_signature_events_are_security_events() {
        assert!(AuditEventType::WebhookSignatureRejected.is_security_event());
        assert!(!AuditEventType::PaymentVerified.is_security_event());
    }
}
