//! HTTP adapter for payment endpoints.
//!
//! - `POST /api/payments/create-order` - Create a gateway order
//! - `POST /api/payments/verify` - Verify the checkout callback
//! - `GET /api/payments/entitlement` - Current user's access
//! - `GET /api/payments/download-ebook` - Download the purchased e-book
//! - `POST /api/webhook` - Gateway webhooks (signature verified, no session)

pub mod dto;
pub mod handlers;
pub mod routes;

pub use handlers::{health, PaymentAppState, WEBHOOK_SIGNATURE_HEADER};
pub use routes::{payment_router, payment_routes, webhook_routes};
