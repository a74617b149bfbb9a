//! Payment domain module.
//!
//! Order validation, signature verification, webhook event parsing, and
//! the records that reconciliation writes.
//!
//! # Module Structure
//!
//! - `order` - Amount, currency, receipt, notes, and the validated order request
//! - `payment_record` - Payment records and the status precedence rule
//! - `entitlement` - Per-user access to the purchased e-book
//! - `signature` - HMAC-SHA256 checkout and webhook verifiers
//! - `gateway_event` - Tagged union over webhook event types
//! - `audit` - Audit trail entries
//! - `errors` - Payment error taxonomy

mod audit;
mod entitlement;
mod errors;
mod gateway_event;
mod order;
mod payment_record;
mod signature;

pub use audit::{AuditEntry, AuditEventType};
pub use entitlement::UserEntitlement;
pub use errors::PaymentError;
pub use gateway_event::{
    GatewayEvent, PaymentEntity, PAYMENT_AUTHORIZED, PAYMENT_CAPTURED, PAYMENT_FAILED,
};
pub use order::{
    Amount, Currency, Order, OrderNotes, OrderRequest, Receipt, MAX_AMOUNT, MAX_NOTES,
    MAX_NOTE_LENGTH, MIN_AMOUNT, USER_ID_NOTE,
};
pub use payment_record::{FailureReason, PaymentRecord, PaymentStatus};
pub use signature::{
    checkout_payload, compute_signature, CheckoutSignatureVerifier, WebhookSignatureVerifier,
};
