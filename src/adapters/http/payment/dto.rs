//! Data Transfer Objects for the payment API.
//!
//! Gateway callback fields keep the gateway's `razorpay_*` names so the
//! checkout widget's handler payload can be posted through unchanged.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::application::{GetEntitlementResult, HandleWebhookResult, VerifyPaymentResult};
use crate::domain::payment::{Order, PaymentRecord};

// ════════════════════════════════════════════════════════════════════════════════
// Request DTOs
// ════════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Deserialize)]
pub struct CreateOrderRequest {
    /// Minor units (paise/cents).
    pub amount: i64,
    #[serde(default = "default_currency")]
    pub currency: String,
    /// Generated from the current time when omitted.
    pub receipt: Option<String>,
    #[serde(default)]
    pub notes: Option<BTreeMap<String, String>>,
}

fn default_currency() -> String {
    "INR".to_string()
}

#[derive(Debug, Clone, Deserialize)]
pub struct VerifyPaymentRequest {
    pub razorpay_order_id: String,
    pub razorpay_payment_id: String,
    pub razorpay_signature: String,
}

// ════════════════════════════════════════════════════════════════════════════════
// Response DTOs
// ════════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Serialize)]
pub struct CreateOrderResponse {
    pub order_id: String,
    pub amount: u64,
    pub currency: String,
    /// Public key id for the checkout widget.
    pub key_id: String,
}

impl CreateOrderResponse {
    pub fn new(order: &Order, key_id: &str) -> Self {
        Self {
            order_id: order.id.to_string(),
            amount: order.amount.minor_units(),
            currency: order.currency.as_str().to_string(),
            key_id: key_id.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct VerifyPaymentResponse {
    pub status: &'static str,
    pub order_id: String,
    pub payment_id: String,
    pub already_verified: bool,
    pub entitlement_granted: bool,
}

impl From<VerifyPaymentResult> for VerifyPaymentResponse {
    fn from(result: VerifyPaymentResult) -> Self {
        Self {
            status: "success",
            order_id: result.order_id.to_string(),
            payment_id: result.payment_id.to_string(),
            already_verified: result.already_verified,
            entitlement_granted: result.entitlement_granted,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct WebhookResponse {
    pub status: &'static str,
    pub outcome: &'static str,
}

impl From<&HandleWebhookResult> for WebhookResponse {
    fn from(result: &HandleWebhookResult) -> Self {
        Self {
            status: "ok",
            outcome: result.outcome(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PaymentSummary {
    pub payment_id: String,
    pub order_id: String,
    pub status: String,
    pub amount: u64,
    pub currency: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub method: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure_description: Option<String>,
    pub recorded_at: DateTime<Utc>,
}

impl From<PaymentRecord> for PaymentSummary {
    fn from(record: PaymentRecord) -> Self {
        let (failure_code, failure_description) = match record.failure {
            Some(failure) => (failure.code, failure.description),
            None => (None, None),
        };
        Self {
            payment_id: record.payment_id.to_string(),
            order_id: record.order_id.to_string(),
            status: record.status.as_str().to_string(),
            amount: record.amount,
            currency: record.currency,
            method: record.method,
            failure_code,
            failure_description,
            recorded_at: *record.recorded_at.as_datetime(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct EntitlementResponse {
    pub has_ebook_access: bool,
    pub purchased_at: Option<DateTime<Utc>>,
    pub payments: Vec<PaymentSummary>,
}

impl From<GetEntitlementResult> for EntitlementResponse {
    fn from(result: GetEntitlementResult) -> Self {
        Self {
            has_ebook_access: result.entitlement.granted,
            purchased_at: result.entitlement.purchased_at.map(|t| *t.as_datetime()),
            payments: result.payments.into_iter().map(PaymentSummary::from).collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: &'static str,
    pub version: &'static str,
}

impl Default for HealthResponse {
    fn default() -> Self {
        Self {
            status: "ok",
            service: env!("CARGO_PKG_NAME"),
            version: env!("CARGO_PKG_VERSION"),
        }
    }
}
