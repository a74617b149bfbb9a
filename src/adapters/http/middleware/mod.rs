//! HTTP middleware for axum.
//!
//! - `auth` - Bearer token validation and the `RequireAuth` extractor
//! - `rate_limit` - Global and per-IP fixed-window limits

pub mod auth;
pub mod rate_limit;

pub use auth::{auth_middleware, AuthRejection, AuthState, RequireAuth};
pub use rate_limit::{rate_limit_middleware, RateLimiterState};
