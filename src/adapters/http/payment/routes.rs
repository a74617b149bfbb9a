//! Axum router configuration for payment endpoints.

use axum::{
    middleware,
    routing::{get, post},
    Router,
};

use super::super::middleware::{rate_limit_middleware, RateLimiterState};

use super::handlers::{
    create_order, download_ebook, get_entitlement, handle_webhook, verify_payment,
    PaymentAppState,
};

/// Create the payment API router.
///
/// # Routes (require authentication)
/// - `POST /create-order` - Create a gateway order
/// - `POST /verify` - Verify the checkout callback
/// - `GET /entitlement` - Current user's access and payment history
/// - `GET /download-ebook` - Download the purchased e-book
pub fn payment_routes() -> Router<PaymentAppState> {
    Router::new()
        .route("/create-order", post(create_order))
        .route("/verify", post(verify_payment))
        .route("/entitlement", get(get_entitlement))
        .route("/download-ebook", get(download_ebook))
}

/// Create the gateway webhook router.
///
/// Separate from the payment routes because webhooks carry no user session;
/// they are authenticated by the body signature.
///
/// # Routes
/// - `POST /` - Handle gateway events
pub fn webhook_routes() -> Router<PaymentAppState> {
    Router::new().route("/", post(handle_webhook))
}

/// Create the complete payment module router, mounted under `/api`.
///
/// The rate limiter guards the user-facing routes only. Webhook deliveries
/// all come from the gateway's address pool and must not share a bucket.
pub fn payment_router(rate_limiter: Option<RateLimiterState>) -> Router<PaymentAppState> {
    let mut payments = payment_routes();
    if let Some(limiter) = rate_limiter {
        payments = payments.layer(middleware::from_fn_with_state(limiter, rate_limit_middleware));
    }

    Router::new()
        .nest("/payments", payments)
        .nest("/webhook", webhook_routes())
}
