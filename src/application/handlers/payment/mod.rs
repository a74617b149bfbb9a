//! Payment handlers.
//!
//! ## Commands
//! - Creating gateway orders
//! - Verifying the checkout callback signature
//! - Reconciling gateway webhooks
//!
//! ## Queries
//! - Get a user's entitlement and payment history
//! - Download the purchased e-book

mod create_order;
mod download_ebook;
mod get_entitlement;
mod handle_webhook;
mod verify_payment;

// Commands
pub use create_order::{CreateOrderCommand, CreateOrderHandler, CreateOrderResult};
pub use handle_webhook::{HandleWebhookCommand, HandleWebhookHandler, HandleWebhookResult};
pub use verify_payment::{VerifyPaymentCommand, VerifyPaymentHandler, VerifyPaymentResult};

// Queries
pub use download_ebook::{DownloadEbookHandler, DownloadEbookQuery, EbookFile};
pub use get_entitlement::{GetEntitlementHandler, GetEntitlementQuery, GetEntitlementResult};

use crate::domain::payment::AuditEntry;
use crate::ports::AuditLog;

/// Writes an audit entry. A failed write is logged and otherwise ignored.
async fn record_audit(audit_log: &dyn AuditLog, entry: AuditEntry) {
    let event_type = entry.event_type;
    if let Err(err) = audit_log.record(entry).await {
        tracing::warn!(event_type = %event_type, error = %err, "Payment audit write failed");
    }
}
