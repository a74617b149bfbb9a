//! Payment gateway port.
//!
//! Abstracts the hosted payment provider that issues orders. Signature
//! verification does not go through this port: it is pure computation over
//! server-held secrets.

use async_trait::async_trait;
use std::fmt;

use crate::domain::foundation::OrderId;
use crate::domain::payment::{OrderRequest, PaymentError};

/// Port for creating orders with the payment gateway.
///
/// # Contract
///
/// Implementations must:
/// - Send amount, currency, receipt, and notes unchanged
/// - Authenticate with the merchant key pair, never exposing the secret
/// - Bound every call with a timeout and report it as `GatewayErrorCode::Timeout`
/// - Not retry on their own
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    async fn create_order(&self, request: &OrderRequest) -> Result<GatewayOrder, GatewayError>;
}

/// Order as acknowledged by the gateway.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GatewayOrder {
    pub id: OrderId,
    pub amount: u64,
    pub currency: String,
    pub receipt: Option<String>,
    pub status: String,
    /// Unix seconds.
    pub created_at: i64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GatewayError {
    pub code: GatewayErrorCode,
    pub message: String,
    /// Error code reported by the provider, if any.
    pub provider_code: Option<String>,
}

impl GatewayError {
    pub fn new(code: GatewayErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            provider_code: None,
        }
    }

    pub fn network(message: impl Into<String>) -> Self {
        Self::new(GatewayErrorCode::Network, message)
    }

    pub fn timeout(message: impl Into<String>) -> Self {
        Self::new(GatewayErrorCode::Timeout, message)
    }

    pub fn invalid_response(message: impl Into<String>) -> Self {
        Self::new(GatewayErrorCode::InvalidResponse, message)
    }

    pub fn with_provider_code(mut self, code: impl Into<String>) -> Self {
        self.provider_code = Some(code.into());
        self
    }
}

impl fmt::Display for GatewayError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.provider_code {
            Some(code) => write!(f, "[{:?}/{}] {}", self.code, code, self.message),
            None => write!(f, "[{:?}] {}", self.code, self.message),
        }
    }
}

impl std::error::Error for GatewayError {}

impl From<GatewayError> for PaymentError {
    fn from(err: GatewayError) -> Self {
        PaymentError::UpstreamUnavailable(err.to_string())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GatewayErrorCode {
    /// Connection failure before a response arrived.
    Network,
    Timeout,
    /// Merchant credentials rejected (HTTP 401).
    Authentication,
    /// Gateway rejected the request contents (other 4xx).
    BadRequest,
    /// Gateway-side failure (5xx).
    Provider,
    /// Response body did not match the expected shape.
    InvalidResponse,
}

impl GatewayErrorCode {
    /// Whether a fresh attempt could succeed.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            GatewayErrorCode::Network | GatewayErrorCode::Timeout | GatewayErrorCode::Provider
        )
    }
}
