//! Domain layer containing business logic and domain types.
//!
//! # Module Organization
//!
//! - `foundation` - Shared domain primitives (IDs, timestamps, auth, errors)
//! - `payment` - Orders, payment records, entitlements, and signature rules

pub mod foundation;
pub mod payment;
