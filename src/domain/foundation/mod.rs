//! Foundation module - Shared domain primitives.
//!
//! Identifiers, timestamps, authentication types, and error types
//! that the payment domain is built from.

mod auth;
mod errors;
mod ids;
mod timestamp;

pub use auth::{AuthError, AuthenticatedUser};
pub use errors::{DomainError, ErrorCode, ValidationError};
pub use ids::{OrderId, PaymentId, UserId, SIGNATURE_SEPARATOR};
pub use timestamp::Timestamp;
