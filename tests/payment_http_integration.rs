//! Integration tests for the payment HTTP API.
//!
//! Drives the full router (auth middleware, handlers, in-memory store) with
//! real HMAC signatures:
//! 1. Checkout: create order, verify callback, read entitlement
//! 2. Webhooks: dedupe, failure, precedence, unknown events, tampering

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;

use zenith_payments::adapters::auth::MockSessionValidator;
use zenith_payments::adapters::http::{build_router, PaymentAppState};
use zenith_payments::adapters::memory::{InMemoryAuditLog, InMemoryPaymentStore};
use zenith_payments::adapters::razorpay::MockPaymentGateway;
use zenith_payments::config::{EbookConfig, PaymentConfig, ServerConfig};
use zenith_payments::domain::payment::{compute_signature, AuditEventType};

const KEY_SECRET: &str = "test_key_secret";
const WEBHOOK_SECRET: &str = "test_webhook_secret";

// =============================================================================
// Test Infrastructure
// =============================================================================

struct TestApp {
    router: Router,
    store: Arc<InMemoryPaymentStore>,
    audit: Arc<InMemoryAuditLog>,
}

impl TestApp {
    fn new() -> Self {
        Self::with_ebook(EbookConfig::default())
    }

    fn with_ebook(ebook: EbookConfig) -> Self {
        let store = Arc::new(InMemoryPaymentStore::new());
        let audit = Arc::new(InMemoryAuditLog::new());
        let state = PaymentAppState::new(
            Arc::new(MockPaymentGateway::new().with_order_id("order_ABC")),
            store.clone(),
            store.clone(),
            audit.clone(),
            &PaymentConfig::new("rzp_test_zenith", KEY_SECRET, WEBHOOK_SECRET),
            &ebook,
        );
        let validator = MockSessionValidator::new()
            .with_test_user("token-1", "user-1")
            .with_test_user("token-2", "user-2");

        Self {
            router: build_router(state, Arc::new(validator), None, &ServerConfig::default()),
            store,
            audit,
        }
    }

    async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        (status, body)
    }

    async fn post_json(&self, uri: &str, token: Option<&str>, body: Value) -> (StatusCode, Value) {
        let mut builder = Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json");
        if let Some(token) = token {
            builder = builder.header("authorization", format!("Bearer {}", token));
        }
        self.send(builder.body(Body::from(body.to_string())).unwrap())
            .await
    }

    async fn get(&self, uri: &str, token: &str) -> (StatusCode, Value) {
        let request = Request::builder()
            .uri(uri)
            .header("authorization", format!("Bearer {}", token))
            .body(Body::empty())
            .unwrap();
        self.send(request).await
    }

    async fn webhook(&self, payload: &Value, signature: Option<String>) -> (StatusCode, Value) {
        let mut builder = Request::builder()
            .method("POST")
            .uri("/api/webhook")
            .header("content-type", "application/json");
        if let Some(signature) = signature {
            builder = builder.header("x-razorpay-signature", signature);
        }
        self.send(builder.body(Body::from(payload.to_string())).unwrap())
            .await
    }

    async fn signed_webhook(&self, payload: &Value) -> (StatusCode, Value) {
        let signature = compute_signature(WEBHOOK_SECRET.as_bytes(), payload.to_string().as_bytes());
        self.webhook(payload, Some(signature)).await
    }
}

fn payment_event(event: &str, payment_id: &str, order_id: &str, user_id: &str) -> Value {
    let mut entity = json!({
        "id": payment_id,
        "order_id": order_id,
        "amount": 15100,
        "currency": "INR",
        "method": "upi",
        "email": format!("{}@example.com", user_id),
        "notes": { "userId": user_id },
        "created_at": 1_700_000_000
    });
    if event == "payment.failed" {
        entity["error_code"] = json!("BAD_REQUEST_ERROR");
        entity["error_description"] = json!("Payment was declined by the bank");
    }
    json!({
        "entity": "event",
        "event": event,
        "payload": { "payment": { "entity": entity } },
        "created_at": 1_700_000_000
    })
}

fn checkout_signature(order_id: &str, payment_id: &str) -> String {
    compute_signature(
        KEY_SECRET.as_bytes(),
        format!("{}|{}", order_id, payment_id).as_bytes(),
    )
}

// =============================================================================
// Checkout Flow
// =============================================================================

#[tokio::test]
async fn checkout_flow_grants_entitlement() {
    let app = TestApp::new();

    let (status, order) = app
        .post_json(
            "/api/payments/create-order",
            Some("token-1"),
            json!({ "amount": 15100, "currency": "INR" }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(order["order_id"], "order_ABC");
    assert_eq!(order["amount"], 15100);
    assert_eq!(order["currency"], "INR");
    assert_eq!(order["key_id"], "rzp_test_zenith");

    let (status, verified) = app
        .post_json(
            "/api/payments/verify",
            Some("token-1"),
            json!({
                "razorpay_order_id": "order_ABC",
                "razorpay_payment_id": "pay_XYZ",
                "razorpay_signature": checkout_signature("order_ABC", "pay_XYZ"),
            }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(verified["status"], "success");
    assert_eq!(verified["entitlement_granted"], true);
    assert_eq!(verified["already_verified"], false);

    let (status, entitlement) = app.get("/api/payments/entitlement", "token-1").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(entitlement["has_ebook_access"], true);
    assert!(entitlement["purchased_at"].is_string());
    assert_eq!(entitlement["payments"][0]["payment_id"], "pay_XYZ");
    assert_eq!(entitlement["payments"][0]["status"], "completed");

    assert_eq!(app.audit.count_of(AuditEventType::OrderCreated).await, 1);
    assert_eq!(app.audit.count_of(AuditEventType::PaymentVerified).await, 1);
}

#[tokio::test]
async fn repeated_verify_is_idempotent() {
    let app = TestApp::new();
    app.post_json(
        "/api/payments/create-order",
        Some("token-1"),
        json!({ "amount": 15100 }),
    )
    .await;

    let body = json!({
        "razorpay_order_id": "order_ABC",
        "razorpay_payment_id": "pay_XYZ",
        "razorpay_signature": checkout_signature("order_ABC", "pay_XYZ"),
    });
    let (first, _) = app
        .post_json("/api/payments/verify", Some("token-1"), body.clone())
        .await;
    let (second, again) = app
        .post_json("/api/payments/verify", Some("token-1"), body)
        .await;

    assert_eq!(first, StatusCode::OK);
    assert_eq!(second, StatusCode::OK);
    assert_eq!(again["already_verified"], true);
    assert_eq!(app.store.payment_count().await, 1);
}

#[tokio::test]
async fn create_order_requires_session() {
    let app = TestApp::new();

    let (status, body) = app
        .post_json("/api/payments/create-order", None, json!({ "amount": 15100 }))
        .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], "UNAUTHENTICATED");
    assert_eq!(app.store.order_count().await, 0);
}

#[tokio::test]
async fn invalid_amount_names_the_field() {
    let app = TestApp::new();

    let (status, body) = app
        .post_json(
            "/api/payments/create-order",
            Some("token-1"),
            json!({ "amount": 0, "currency": "INR" }),
        )
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION_FAILED");
    assert_eq!(body["field"], "amount");
    assert_eq!(app.store.order_count().await, 0);
}

#[tokio::test]
async fn malformed_body_is_a_validation_error() {
    let app = TestApp::new();

    let (status, body) = app
        .post_json(
            "/api/payments/create-order",
            Some("token-1"),
            json!({ "amount": "a lot" }),
        )
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION_FAILED");
}

#[tokio::test]
async fn forged_checkout_signature_is_rejected() {
    let app = TestApp::new();
    app.post_json(
        "/api/payments/create-order",
        Some("token-1"),
        json!({ "amount": 15100 }),
    )
    .await;

    let (status, body) = app
        .post_json(
            "/api/payments/verify",
            Some("token-1"),
            json!({
                "razorpay_order_id": "order_ABC",
                "razorpay_payment_id": "pay_XYZ",
                "razorpay_signature": checkout_signature("order_ABC", "pay_OTHER"),
            }),
        )
        .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], "INVALID_SIGNATURE");
    assert_eq!(app.store.payment_count().await, 0);

    let (_, entitlement) = app.get("/api/payments/entitlement", "token-1").await;
    assert_eq!(entitlement["has_ebook_access"], false);
}

#[tokio::test]
async fn verify_for_another_users_order_is_not_found() {
    let app = TestApp::new();
    app.post_json(
        "/api/payments/create-order",
        Some("token-1"),
        json!({ "amount": 15100 }),
    )
    .await;

    let (status, _) = app
        .post_json(
            "/api/payments/verify",
            Some("token-2"),
            json!({
                "razorpay_order_id": "order_ABC",
                "razorpay_payment_id": "pay_XYZ",
                "razorpay_signature": checkout_signature("order_ABC", "pay_XYZ"),
            }),
        )
        .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    let (_, entitlement) = app.get("/api/payments/entitlement", "token-2").await;
    assert_eq!(entitlement["has_ebook_access"], false);
}

// =============================================================================
// Webhook Reconciliation
// =============================================================================

#[tokio::test]
async fn duplicate_captured_webhook_records_once() {
    let app = TestApp::new();
    let payload = payment_event("payment.captured", "pay_XYZ", "order_ABC", "user-1");

    let (first, body) = app.signed_webhook(&payload).await;
    let (second, _) = app.signed_webhook(&payload).await;

    assert_eq!(first, StatusCode::OK);
    assert_eq!(second, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["outcome"], "payment_captured");
    assert_eq!(app.store.payment_count().await, 1);

    let (_, entitlement) = app.get("/api/payments/entitlement", "token-1").await;
    assert_eq!(entitlement["has_ebook_access"], true);
}

#[tokio::test]
async fn failed_payment_does_not_grant_access() {
    let app = TestApp::new();
    let payload = payment_event("payment.failed", "pay_FAIL", "order_F1", "user-2");

    let (status, body) = app.signed_webhook(&payload).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["outcome"], "payment_failed");

    let (_, entitlement) = app.get("/api/payments/entitlement", "token-2").await;
    assert_eq!(entitlement["has_ebook_access"], false);
    assert_eq!(entitlement["payments"][0]["status"], "failed");
    assert_eq!(entitlement["payments"][0]["failure_code"], "BAD_REQUEST_ERROR");
}

#[tokio::test]
async fn late_authorized_event_keeps_completed_status() {
    let app = TestApp::new();

    app.signed_webhook(&payment_event("payment.captured", "pay_XYZ", "order_ABC", "user-1"))
        .await;
    let (status, _) = app
        .signed_webhook(&payment_event("payment.authorized", "pay_XYZ", "order_ABC", "user-1"))
        .await;
    assert_eq!(status, StatusCode::OK);

    let (_, entitlement) = app.get("/api/payments/entitlement", "token-1").await;
    assert_eq!(entitlement["has_ebook_access"], true);
    assert_eq!(entitlement["payments"][0]["status"], "completed");
    assert_eq!(app.store.payment_count().await, 1);
}

#[tokio::test]
async fn unknown_event_is_acknowledged() {
    let app = TestApp::new();
    let payload = json!({
        "entity": "event",
        "event": "refund.processed",
        "payload": { "refund": { "entity": { "id": "rfnd_1" } } }
    });

    let (status, body) = app.signed_webhook(&payload).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["outcome"], "ignored");
    assert_eq!(app.store.payment_count().await, 0);
    assert_eq!(app.audit.count_of(AuditEventType::WebhookEventIgnored).await, 1);
}

#[tokio::test]
async fn tampered_webhook_body_is_rejected() {
    let app = TestApp::new();
    let original = payment_event("payment.captured", "pay_XYZ", "order_ABC", "user-1");
    let signature = compute_signature(WEBHOOK_SECRET.as_bytes(), original.to_string().as_bytes());

    let mut tampered = original.clone();
    tampered["payload"]["payment"]["entity"]["amount"] = json!(100);

    let (status, body) = app.webhook(&tampered, Some(signature)).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], "INVALID_SIGNATURE");
    assert_eq!(app.store.payment_count().await, 0);
    assert_eq!(
        app.audit.count_of(AuditEventType::WebhookSignatureRejected).await,
        1
    );
}

#[tokio::test]
async fn unsigned_webhook_is_rejected() {
    let app = TestApp::new();
    let payload = payment_event("payment.captured", "pay_XYZ", "order_ABC", "user-1");

    let (status, body) = app.webhook(&payload, None).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], "MISSING_SIGNATURE");
}

// =============================================================================
// E-book Download
// =============================================================================

#[tokio::test]
async fn download_requires_purchase() {
    let app = TestApp::new();

    let (status, body) = app.get("/api/payments/download-ebook", "token-1").await;

    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["code"], "NOT_ENTITLED");
}

#[tokio::test]
async fn download_serves_pdf_after_purchase() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("guide.pdf");
    std::fs::write(&path, b"%PDF-1.4 zenith").unwrap();

    let app = TestApp::with_ebook(EbookConfig {
        path: path.clone(),
        file_name: "zenith-guide.pdf".to_string(),
    });
    app.signed_webhook(&payment_event("payment.captured", "pay_XYZ", "order_ABC", "user-1"))
        .await;

    let request = Request::builder()
        .uri("/api/payments/download-ebook")
        .header("authorization", "Bearer token-1")
        .body(Body::empty())
        .unwrap();
    let response = app.router.clone().oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()["content-type"], "application/pdf");
    assert_eq!(
        response.headers()["content-disposition"],
        "attachment; filename=\"zenith-guide.pdf\""
    );
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    assert_eq!(&bytes[..], b"%PDF-1.4 zenith");
}
