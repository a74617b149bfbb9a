//! Mock payment gateway for testing.
//!
//! Issues predictable order ids, records every request, and can be
//! configured to fail.

use async_trait::async_trait;
use std::sync::atomic::{AtomicU32, Ordering};
use tokio::sync::Mutex;

use crate::domain::foundation::{OrderId, Timestamp};
use crate::domain::payment::OrderRequest;
use crate::ports::{GatewayError, GatewayOrder, PaymentGateway};

/// # Example
///
/// ```ignore
/// let gateway = MockPaymentGateway::new().with_order_id("order_ABC");
/// let order = gateway.create_order(&request).await?;
/// assert_eq!(gateway.call_count(), 1);
/// ```
#[derive(Debug, Default)]
pub struct MockPaymentGateway {
    fixed_order_id: Option<String>,
    error: Option<GatewayError>,
    sequence: AtomicU32,
    requests: Mutex<Vec<OrderRequest>>,
}

impl MockPaymentGateway {
    /// Issues `order_mock_1`, `order_mock_2`, ...
    pub fn new() -> Self {
        Self::default()
    }

    /// Issues the same order id on every call.
    pub fn with_order_id(mut self, order_id: impl Into<String>) -> Self {
        self.fixed_order_id = Some(order_id.into());
        self
    }

    /// Fails every call with the given error.
    pub fn failing(error: GatewayError) -> Self {
        Self {
            error: Some(error),
            ..Self::default()
        }
    }

    // === Call Tracking ===

    pub fn call_count(&self) -> u32 {
        self.sequence.load(Ordering::SeqCst)
    }

    pub async fn requests(&self) -> Vec<OrderRequest> {
        self.requests.lock().await.clone()
    }
}

#[async_trait]
impl PaymentGateway for MockPaymentGateway {
    async fn create_order(&self, request: &OrderRequest) -> Result<GatewayOrder, GatewayError> {
        let n = self.sequence.fetch_add(1, Ordering::SeqCst) + 1;
        self.requests.lock().await.push(request.clone());

        if let Some(error) = &self.error {
            return Err(error.clone());
        }

        let raw_id = self
            .fixed_order_id
            .clone()
            .unwrap_or_else(|| format!("order_mock_{}", n));
        let id = OrderId::new(raw_id).map_err(|e| GatewayError::invalid_response(e.to_string()))?;

        Ok(GatewayOrder {
            id,
            amount: request.amount.minor_units(),
            currency: request.currency.as_str().to_string(),
            receipt: Some(request.receipt.as_str().to_string()),
            status: "created".to_string(),
            created_at: Timestamp::now().as_unix_secs(),
        })
    }
}
