//! Webhook events delivered by the payment gateway.
//!
//! Only parsed after the signature has been verified. Event types this
//! service does not act on become `GatewayEvent::Unknown`, which is
//! acknowledged rather than rejected.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

use crate::domain::foundation::{OrderId, PaymentId, Timestamp, UserId};

use super::errors::PaymentError;
use super::order::USER_ID_NOTE;
use super::payment_record::{FailureReason, PaymentRecord, PaymentStatus};

pub const PAYMENT_CAPTURED: &str = "payment.captured";
pub const PAYMENT_FAILED: &str = "payment.failed";
pub const PAYMENT_AUTHORIZED: &str = "payment.authorized";

/// Payment entity as the gateway reports it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentEntity {
    pub id: String,
    #[serde(default)]
    pub order_id: Option<String>,
    pub amount: u64,
    pub currency: String,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub method: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default, deserialize_with = "notes_from_object_or_array")]
    pub notes: BTreeMap<String, String>,
    #[serde(default)]
    pub error_code: Option<String>,
    #[serde(default)]
    pub error_description: Option<String>,
    #[serde(default)]
    pub created_at: Option<i64>,
}

impl PaymentEntity {
    pub fn payment_id(&self) -> Result<PaymentId, PaymentError> {
        PaymentId::new(self.id.clone()).map_err(|e| PaymentError::malformed(e.to_string()))
    }

    pub fn order_id(&self) -> Result<OrderId, PaymentError> {
        let raw = self
            .order_id
            .clone()
            .ok_or_else(|| PaymentError::malformed("payment entity has no order_id"))?;
        OrderId::new(raw).map_err(|e| PaymentError::malformed(e.to_string()))
    }

    /// User id the order was created for, from the order notes.
    pub fn user_id(&self) -> Option<UserId> {
        self.notes
            .get(USER_ID_NOTE)
            .and_then(|id| UserId::new(id.clone()).ok())
    }

    /// Builds the record to persist for this entity in the given status.
    ///
    /// `user_id` is passed separately because it may be resolved from the
    /// stored order when the notes lack it.
    pub fn to_record(
        &self,
        status: PaymentStatus,
        user_id: Option<UserId>,
    ) -> Result<PaymentRecord, PaymentError> {
        let failure = match status {
            PaymentStatus::Failed => Some(FailureReason {
                code: self.error_code.clone(),
                description: self.error_description.clone(),
            }),
            _ => None,
        };

        Ok(PaymentRecord {
            payment_id: self.payment_id()?,
            order_id: self.order_id()?,
            status,
            amount: self.amount,
            currency: self.currency.to_ascii_uppercase(),
            email: self.email.clone(),
            user_id,
            method: self.method.clone(),
            failure,
            recorded_at: Timestamp::now(),
        })
    }
}

/// The gateway sends `"notes": []` when an order has no notes.
fn notes_from_object_or_array<'de, D>(deserializer: D) -> Result<BTreeMap<String, String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    let notes = match value {
        Value::Object(map) => map
            .into_iter()
            .map(|(k, v)| {
                let v = match v {
                    Value::String(s) => s,
                    other => other.to_string(),
                };
                (k, v)
            })
            .collect(),
        _ => BTreeMap::new(),
    };
    Ok(notes)
}

#[derive(Debug, Deserialize)]
struct Envelope {
    event: String,
    #[serde(default)]
    payload: Value,
}

#[derive(Debug, Deserialize)]
struct PaymentWrapper {
    entity: PaymentEntity,
}

#[derive(Debug, Clone, PartialEq)]
pub enum GatewayEvent {
    PaymentCaptured(PaymentEntity),
    PaymentFailed(PaymentEntity),
    PaymentAuthorized(PaymentEntity),
    /// Any other event type. Acknowledged and ignored.
    Unknown { event: String, raw: Value },
}

impl GatewayEvent {
    /// Parses a verified webhook body.
    ///
    /// # Errors
    ///
    /// `MalformedPayload` if the body is not JSON, has no `event`, or is a
    /// payment event without `payload.payment.entity`.
    pub fn parse(body: &[u8]) -> Result<Self, PaymentError> {
        let raw: Value =
            serde_json::from_slice(body).map_err(|e| PaymentError::malformed(e.to_string()))?;
        let envelope: Envelope = serde_json::from_value(raw.clone())
            .map_err(|e| PaymentError::malformed(e.to_string()))?;

        let entity = || -> Result<PaymentEntity, PaymentError> {
            let payment = envelope
                .payload
                .get("payment")
                .cloned()
                .ok_or_else(|| PaymentError::malformed("missing payload.payment"))?;
            let wrapper: PaymentWrapper = serde_json::from_value(payment)
                .map_err(|e| PaymentError::malformed(format!("payment entity: {}", e)))?;
            Ok(wrapper.entity)
        };

        match envelope.event.as_str() {
            PAYMENT_CAPTURED => Ok(GatewayEvent::PaymentCaptured(entity()?)),
            PAYMENT_FAILED => Ok(GatewayEvent::PaymentFailed(entity()?)),
            PAYMENT_AUTHORIZED => Ok(GatewayEvent::PaymentAuthorized(entity()?)),
            _ => Ok(GatewayEvent::Unknown {
                event: envelope.event.clone(),
                raw,
            }),
        }
    }

    pub fn event_type(&self) -> &str {
        match self {
            GatewayEvent::PaymentCaptured(_) => PAYMENT_CAPTURED,
            GatewayEvent::PaymentFailed(_) => PAYMENT_FAILED,
            GatewayEvent::PaymentAuthorized(_) => PAYMENT_AUTHORIZED,
            GatewayEvent::Unknown { event, .. } => event,
        }
    }
}
