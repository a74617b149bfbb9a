//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the domain and the outside world. Adapters implement these ports.
//!
//! ## Payment Ports
//!
//! - `PaymentGateway` - Order creation with the hosted payment provider
//! - `PaymentRepository` - Orders and idempotent payment records
//! - `EntitlementRepository` - Per-user e-book access
//! - `AuditLog` - Append-only payment audit trail
//!
//! ## Request Ports
//!
//! - `SessionValidator` - Bearer token validation
//! - `RateLimiter` - Fixed-window request limiting

mod audit_log;
mod entitlement_repository;
mod payment_gateway;
mod payment_repository;
mod rate_limiter;
mod session_validator;

pub use audit_log::AuditLog;
pub use entitlement_repository::EntitlementRepository;
pub use payment_gateway::{GatewayError, GatewayErrorCode, GatewayOrder, PaymentGateway};
pub use payment_repository::{PaymentRepository, WriteOutcome};
pub use rate_limiter::{
    RateLimitDenied, RateLimitError, RateLimitKey, RateLimitResult, RateLimitScope,
    RateLimitStatus, RateLimiter,
};
pub use session_validator::SessionValidator;
