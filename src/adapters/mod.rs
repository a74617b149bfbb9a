//! Adapters - Implementations of port interfaces.
//!
//! Adapters connect the domain to external systems:
//! - `razorpay` - Payment gateway (orders API) and a mock for tests
//! - `postgres` - Durable orders, payments, entitlements, and audit log
//! - `memory` - In-process store for development and tests
//! - `audit` - Audit trail written to the tracing pipeline
//! - `auth` - Session token validation
//! - `rate_limiter` - Fixed-window request limiting
//! - `http` - Axum routes and middleware

pub mod audit;
pub mod auth;
pub mod http;
pub mod memory;
pub mod postgres;
pub mod razorpay;
pub mod rate_limiter;
