//! Payment error taxonomy.
//!
//! Every failure on the order, verification, and webhook paths is one of
//! these variants. Each variant carries its HTTP status, a stable code, and
//! whether the caller (or the gateway, for webhooks) should retry.

use axum::http::StatusCode;
use thiserror::Error;

use crate::domain::foundation::{DomainError, ErrorCode, ValidationError};

#[derive(Debug, Error)]
pub enum PaymentError {
    /// User-correctable input problem. Names the offending field.
    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationError),

    /// HMAC mismatch on the checkout callback or a webhook.
    #[error("Invalid signature")]
    InvalidSignature,

    /// Webhook arrived without a signature header.
    #[error("Missing signature")]
    MissingSignature,

    /// Signed body that could not be interpreted.
    #[error("Malformed payload: {0}")]
    MalformedPayload(String),

    /// The payment gateway failed or timed out.
    #[error("Payment gateway unavailable: {0}")]
    UpstreamUnavailable(String),

    #[error("Not found: {0}")]
    NotFound(String),

    /// Caller has no purchase on record.
    #[error("No purchase on record for this user")]
    NotEntitled,

    /// Persistence or file system failure.
    #[error("Infrastructure error: {0}")]
    Infrastructure(String),
}

impl PaymentError {
    pub fn malformed(reason: impl Into<String>) -> Self {
        Self::MalformedPayload(reason.into())
    }

    pub fn upstream(reason: impl Into<String>) -> Self {
        Self::UpstreamUnavailable(reason.into())
    }

    pub fn not_found(what: impl Into<String>) -> Self {
        Self::NotFound(what.into())
    }

    pub fn infrastructure(reason: impl Into<String>) -> Self {
        Self::Infrastructure(reason.into())
    }

    /// Returns true if the same request may succeed later.
    ///
    /// Validation and signature failures are never retried.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            PaymentError::UpstreamUnavailable(_) | PaymentError::Infrastructure(_)
        )
    }

    /// Maps the error to an HTTP status code.
    ///
    /// For webhooks the status drives gateway redelivery: 4xx stops it,
    /// 5xx triggers it.
    pub fn status_code(&self) -> StatusCode {
        match self {
            PaymentError::Validation(_) | PaymentError::MalformedPayload(_) => {
                StatusCode::BAD_REQUEST
            }
            PaymentError::InvalidSignature | PaymentError::MissingSignature => {
                StatusCode::UNAUTHORIZED
            }
            PaymentError::NotEntitled => StatusCode::FORBIDDEN,
            PaymentError::NotFound(_) => StatusCode::NOT_FOUND,
            PaymentError::UpstreamUnavailable(_) => StatusCode::BAD_GATEWAY,
            PaymentError::Infrastructure(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Stable machine-readable code for API responses.
    pub fn code(&self) -> &'static str {
        match self {
            PaymentError::Validation(_) => "VALIDATION_FAILED",
            PaymentError::InvalidSignature => "INVALID_SIGNATURE",
            PaymentError::MissingSignature => "MISSING_SIGNATURE",
            PaymentError::MalformedPayload(_) => "MALFORMED_PAYLOAD",
            PaymentError::UpstreamUnavailable(_) => "UPSTREAM_UNAVAILABLE",
            PaymentError::NotFound(_) => "NOT_FOUND",
            PaymentError::NotEntitled => "NOT_ENTITLED",
            PaymentError::Infrastructure(_) => "INTERNAL_ERROR",
        }
    }

    /// Message safe to return to the caller.
    ///
    /// Upstream and infrastructure details stay in the logs.
    pub fn public_message(&self) -> String {
        match self {
            PaymentError::UpstreamUnavailable(_) => {
                "Payment service is temporarily unavailable".to_string()
            }
            PaymentError::Infrastructure(_) => "An internal error occurred".to_string(),
            other => other.to_string(),
        }
    }
}

impl From<DomainError> for PaymentError {
    fn from(err: DomainError) -> Self {
        match err.code {
            ErrorCode::OrderNotFound | ErrorCode::PaymentNotFound => {
                PaymentError::NotFound(err.message)
            }
            _ => PaymentError::Infrastructure(err.to_string()),
        }
    }
}
