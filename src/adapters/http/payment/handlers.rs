//! HTTP handlers for payment endpoints.
//!
//! These handlers connect Axum routes to the payment command/query handlers.

use std::path::PathBuf;
use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Json, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::IntoResponse;

use crate::application::{
    CreateOrderCommand, CreateOrderHandler, DownloadEbookHandler, DownloadEbookQuery,
    GetEntitlementHandler, GetEntitlementQuery, HandleWebhookCommand, HandleWebhookHandler,
    VerifyPaymentCommand, VerifyPaymentHandler,
};
use crate::config::{EbookConfig, PaymentConfig};
use crate::domain::foundation::{Timestamp, ValidationError};
use crate::domain::payment::{
    CheckoutSignatureVerifier, PaymentError, Receipt, WebhookSignatureVerifier,
};
use crate::ports::{AuditLog, EntitlementRepository, PaymentGateway, PaymentRepository};

use super::super::error::PaymentApiError;
use super::super::middleware::RequireAuth;
use super::dto::{
    CreateOrderRequest, CreateOrderResponse, EntitlementResponse, HealthResponse,
    VerifyPaymentRequest, VerifyPaymentResponse, WebhookResponse,
};

/// Header carrying the webhook body's HMAC.
pub const WEBHOOK_SIGNATURE_HEADER: &str = "x-razorpay-signature";

// ════════════════════════════════════════════════════════════════════════════════
// Application State
// ════════════════════════════════════════════════════════════════════════════════

/// Shared state for the payment routes.
///
/// Cloned per request. Handlers are built on demand from the Arc-wrapped
/// ports, so the state itself stays cheap to clone.
#[derive(Clone)]
pub struct PaymentAppState {
    pub gateway: Arc<dyn PaymentGateway>,
    pub payments: Arc<dyn PaymentRepository>,
    pub entitlements: Arc<dyn EntitlementRepository>,
    pub audit_log: Arc<dyn AuditLog>,
    pub checkout_verifier: Arc<CheckoutSignatureVerifier>,
    pub webhook_verifier: Arc<WebhookSignatureVerifier>,
    /// Public key id returned to the checkout widget.
    pub key_id: String,
    pub ebook_path: PathBuf,
    pub ebook_file_name: String,
}

impl PaymentAppState {
    pub fn new(
        gateway: Arc<dyn PaymentGateway>,
        payments: Arc<dyn PaymentRepository>,
        entitlements: Arc<dyn EntitlementRepository>,
        audit_log: Arc<dyn AuditLog>,
        payment_config: &PaymentConfig,
        ebook_config: &EbookConfig,
    ) -> Self {
        Self {
            gateway,
            payments,
            entitlements,
            audit_log,
            checkout_verifier: Arc::new(CheckoutSignatureVerifier::new(
                payment_config.razorpay_key_secret.clone(),
            )),
            webhook_verifier: Arc::new(WebhookSignatureVerifier::new(
                payment_config.razorpay_webhook_secret.clone(),
            )),
            key_id: payment_config.razorpay_key_id.clone(),
            ebook_path: ebook_config.path.clone(),
            ebook_file_name: ebook_config.file_name.clone(),
        }
    }

    pub fn create_order_handler(&self) -> CreateOrderHandler {
        CreateOrderHandler::new(
            self.gateway.clone(),
            self.payments.clone(),
            self.audit_log.clone(),
        )
    }

    pub fn verify_payment_handler(&self) -> VerifyPaymentHandler {
        VerifyPaymentHandler::new(
            self.checkout_verifier.clone(),
            self.payments.clone(),
            self.entitlements.clone(),
            self.audit_log.clone(),
        )
    }

    pub fn webhook_handler(&self) -> HandleWebhookHandler {
        HandleWebhookHandler::new(
            self.webhook_verifier.clone(),
            self.payments.clone(),
            self.entitlements.clone(),
            self.audit_log.clone(),
        )
    }

    pub fn entitlement_handler(&self) -> GetEntitlementHandler {
        GetEntitlementHandler::new(self.payments.clone(), self.entitlements.clone())
    }

    pub fn download_handler(&self) -> DownloadEbookHandler {
        DownloadEbookHandler::new(
            self.entitlements.clone(),
            self.ebook_path.clone(),
            self.ebook_file_name.clone(),
        )
    }
}

/// Body rejections surface as validation errors in the standard error shape.
fn body_rejected(rejection: JsonRejection) -> PaymentApiError {
    PaymentApiError(PaymentError::Validation(ValidationError::invalid_format(
        "body",
        rejection.body_text(),
    )))
}

// ════════════════════════════════════════════════════════════════════════════════
// Command Handlers (POST endpoints)
// ════════════════════════════════════════════════════════════════════════════════

/// POST /api/payments/create-order - Create a gateway order for checkout
pub async fn create_order(
    State(state): State<PaymentAppState>,
    RequireAuth(user): RequireAuth,
    payload: Result<Json<CreateOrderRequest>, JsonRejection>,
) -> Result<impl IntoResponse, PaymentApiError> {
    let Json(request) = payload.map_err(body_rejected)?;

    let receipt = request
        .receipt
        .unwrap_or_else(|| Receipt::for_timestamp(Timestamp::now()).as_str().to_string());

    let cmd = CreateOrderCommand {
        user_id: user.id,
        amount: request.amount,
        currency: request.currency,
        receipt,
        notes: request.notes,
    };

    let result = state.create_order_handler().handle(cmd).await?;
    let response = CreateOrderResponse::new(&result.order, &state.key_id);

    Ok((StatusCode::CREATED, Json(response)))
}

/// POST /api/payments/verify - Confirm the checkout callback
pub async fn verify_payment(
    State(state): State<PaymentAppState>,
    RequireAuth(user): RequireAuth,
    payload: Result<Json<VerifyPaymentRequest>, JsonRejection>,
) -> Result<impl IntoResponse, PaymentApiError> {
    let Json(request) = payload.map_err(body_rejected)?;

    let email = Some(user.email).filter(|email| !email.is_empty());
    let cmd = VerifyPaymentCommand {
        user_id: user.id,
        email,
        order_id: request.razorpay_order_id,
        payment_id: request.razorpay_payment_id,
        signature: request.razorpay_signature,
    };

    let result = state.verify_payment_handler().handle(cmd).await?;

    Ok(Json(VerifyPaymentResponse::from(result)))
}

/// POST /api/webhook - Gateway event delivery
///
/// The raw body is verified before it is parsed, so it is taken as bytes.
/// Non-2xx answers make the gateway redeliver.
pub async fn handle_webhook(
    State(state): State<PaymentAppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<impl IntoResponse, PaymentApiError> {
    let signature = headers
        .get(WEBHOOK_SIGNATURE_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string);

    let cmd = HandleWebhookCommand {
        body: body.to_vec(),
        signature,
    };

    let result = state.webhook_handler().handle(cmd).await?;

    Ok(Json(WebhookResponse::from(&result)))
}

// ════════════════════════════════════════════════════════════════════════════════
// Query Handlers (GET endpoints)
// ════════════════════════════════════════════════════════════════════════════════

/// GET /api/payments/entitlement - Current user's access and payment history
pub async fn get_entitlement(
    State(state): State<PaymentAppState>,
    RequireAuth(user): RequireAuth,
) -> Result<impl IntoResponse, PaymentApiError> {
    let query = GetEntitlementQuery { user_id: user.id };
    let result = state.entitlement_handler().handle(query).await?;

    Ok(Json(EntitlementResponse::from(result)))
}

/// GET /api/payments/download-ebook - Stream the purchased e-book
pub async fn download_ebook(
    State(state): State<PaymentAppState>,
    RequireAuth(user): RequireAuth,
) -> Result<impl IntoResponse, PaymentApiError> {
    let query = DownloadEbookQuery { user_id: user.id };
    let file = state.download_handler().handle(query).await?;

    let disposition = format!("attachment; filename=\"{}\"", file.file_name);
    Ok((
        [
            (header::CONTENT_TYPE, "application/pdf".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        file.content,
    ))
}

/// GET /health - Liveness check
pub async fn health() -> impl IntoResponse {
    Json(HealthResponse::default())
}
