//! HTTP adapters - REST API implementations.
//!
//! - `payment` - Payment endpoints and the gateway webhook
//! - `middleware` - Session authentication and rate limiting
//! - `error` - Error body shape and `PaymentError` mapping
//! - `router` - Application assembly with cross-cutting layers

pub mod error;
pub mod middleware;
pub mod payment;
pub mod router;

pub use error::{ErrorResponse, PaymentApiError};
pub use payment::PaymentAppState;
pub use router::build_router;
