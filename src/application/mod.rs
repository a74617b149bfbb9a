//! Application layer - Commands, Queries, and Handlers.
//!
//! This layer orchestrates domain operations and coordinates between ports.
//! Command handlers (write) are kept apart from query handlers (read).

pub mod handlers;

pub use handlers::payment::{
    CreateOrderCommand, CreateOrderHandler, CreateOrderResult, DownloadEbookHandler,
    DownloadEbookQuery, EbookFile, GetEntitlementHandler, GetEntitlementQuery,
    GetEntitlementResult, HandleWebhookCommand, HandleWebhookHandler, HandleWebhookResult,
    VerifyPaymentCommand, VerifyPaymentHandler, VerifyPaymentResult,
};
