//! Razorpay REST API request and response bodies.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Body of `POST /orders`.
#[derive(Debug, Clone, Serialize)]
pub struct CreateOrderBody<'a> {
    pub amount: u64,
    pub currency: &'a str,
    pub receipt: &'a str,
    pub notes: &'a BTreeMap<String, String>,
}

/// Order object returned by the orders API.
#[derive(Debug, Clone, Deserialize)]
pub struct RazorpayOrder {
    pub id: String,
    pub amount: u64,
    pub currency: String,
    #[serde(default)]
    pub receipt: Option<String>,
    pub status: String,
    #[serde(default)]
    pub created_at: i64,
}

/// Error envelope: `{"error": {"code": ..., "description": ...}}`.
#[derive(Debug, Clone, Deserialize)]
pub struct RazorpayErrorEnvelope {
    pub error: RazorpayErrorBody,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RazorpayErrorBody {
    pub code: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub field: Option<String>,
    #[serde(default)]
    pub reason: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn create_order_body_serializes_gateway_fields() {
        let mut notes = BTreeMap::new();
        notes.insert("userId".to_string(), "user-1".to_string());

        let body = CreateOrderBody {
            amount: 15100,
            currency: "INR",
            receipt: "receipt_1700000000000",
            notes: &notes,
        };

        assert_eq!(
            serde_json::to_value(&body).unwrap(),
            json!({
                "amount": 15100,
                "currency": "INR",
                "receipt": "receipt_1700000000000",
                "notes": { "userId": "user-1" }
            })
        );
    }

    #[test]
    fn order_response_tolerates_extra_fields() {
        let order: RazorpayOrder = serde_json::from_value(json!({
            "id": "order_ABC",
            "entity": "order",
            "amount": 15100,
            "amount_paid": 0,
            "amount_due": 15100,
            "currency": "INR",
            "receipt": "receipt_1700000000000",
            "status": "created",
            "attempts": 0,
            "notes": [],
            "created_at": 1700000000
        }))
        .unwrap();

        assert_eq!(order.id, "order_ABC");
        assert_eq!(order.status, "created");
    }

    #[test]
    fn error_envelope_parses() {
        let envelope: RazorpayErrorEnvelope = serde_json::from_value(json!({
            "error": {
                "code": "BAD_REQUEST_ERROR",
                "description": "Order amount less than minimum amount allowed",
                "source": "business",
                "step": "payment_initiation",
                "reason": "input_validation_failed",
                "field": "amount"
            }
        }))
        .unwrap();

        assert_eq!(envelope.error.code, "BAD_REQUEST_ERROR");
        assert_eq!(envelope.error.field.as_deref(), Some("amount"));
    }
}
