//! Razorpay payment gateway adapter.
//!
//! Implements `PaymentGateway` over the Razorpay REST API with HTTP basic
//! auth (key id, key secret). Every call is bounded by the configured
//! timeout and never retried here.

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use std::time::Duration;

use crate::domain::foundation::OrderId;
use crate::domain::payment::OrderRequest;
use crate::ports::{GatewayError, GatewayErrorCode, GatewayOrder, PaymentGateway};

use super::wire_types::{CreateOrderBody, RazorpayErrorEnvelope, RazorpayOrder};

pub const DEFAULT_API_BASE_URL: &str = "https://api.razorpay.com/v1";

#[derive(Clone)]
pub struct RazorpayConfig {
    key_id: String,
    key_secret: SecretString,
    api_base_url: String,
    timeout: Duration,
}

impl RazorpayConfig {
    pub fn new(key_id: impl Into<String>, key_secret: SecretString) -> Self {
        Self {
            key_id: key_id.into(),
            key_secret,
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            timeout: Duration::from_secs(30),
        }
    }

    /// Set a custom API base URL (for testing).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

pub struct RazorpayGateway {
    config: RazorpayConfig,
    http_client: reqwest::Client,
}

impl RazorpayGateway {
    pub fn new(config: RazorpayConfig) -> Result<Self, GatewayError> {
        let http_client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| GatewayError::network(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            config,
            http_client,
        })
    }

    fn orders_url(&self) -> String {
        format!("{}/orders", self.config.api_base_url)
    }
}

fn map_transport_error(err: reqwest::Error) -> GatewayError {
    if err.is_timeout() {
        GatewayError::timeout(err.to_string())
    } else {
        GatewayError::network(err.to_string())
    }
}

/// Maps a non-success response to a gateway error.
fn map_error_response(status: u16, body: &str) -> GatewayError {
    let code = match status {
        401 => GatewayErrorCode::Authentication,
        400..=499 => GatewayErrorCode::BadRequest,
        _ => GatewayErrorCode::Provider,
    };

    match serde_json::from_str::<RazorpayErrorEnvelope>(body) {
        Ok(envelope) => {
            let description = envelope
                .error
                .description
                .unwrap_or_else(|| format!("HTTP {}", status));
            GatewayError::new(code, description).with_provider_code(envelope.error.code)
        }
        Err(_) => GatewayError::new(code, format!("HTTP {}", status)),
    }
}

#[async_trait]
impl PaymentGateway for RazorpayGateway {
    async fn create_order(&self, request: &OrderRequest) -> Result<GatewayOrder, GatewayError> {
        let body = CreateOrderBody {
            amount: request.amount.minor_units(),
            currency: request.currency.as_str(),
            receipt: request.receipt.as_str(),
            notes: request.notes.as_map(),
        };

        let response = self
            .http_client
            .post(self.orders_url())
            .basic_auth(&self.config.key_id, Some(self.config.key_secret.expose_secret()))
            .json(&body)
            .send()
            .await
            .map_err(map_transport_error)?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            let err = map_error_response(status.as_u16(), &error_text);
            tracing::error!(
                status = status.as_u16(),
                receipt = %request.receipt.as_str(),
                error = %err,
                "Razorpay create_order failed"
            );
            return Err(err);
        }

        let order: RazorpayOrder = response.json().await.map_err(|e| {
            GatewayError::invalid_response(format!("Failed to parse Razorpay order: {}", e))
        })?;

        let id = OrderId::new(order.id)
            .map_err(|e| GatewayError::invalid_response(format!("Bad order id: {}", e)))?;

        Ok(GatewayOrder {
            id,
            amount: order.amount,
            currency: order.currency,
            receipt: order.receipt,
            status: order.status,
            created_at: order.created_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gateway() -> RazorpayGateway {
        let config = RazorpayConfig::new("rzp_test_key", SecretString::new("secret".to_string()))
            .with_base_url("http://localhost:9999/v1/");
        RazorpayGateway::new(config).unwrap()
    }

    #[test]
    fn base_url_trailing_slash_is_trimmed() {
        assert_eq!(gateway().orders_url(), "http://localhost:9999/v1/orders");
    }

    #[test]
    fn default_base_url_is_v1() {
        let config = RazorpayConfig::new("rzp_test_key", SecretString::new("s".to_string()));
        assert_eq!(config.api_base_url, "https://api.razorpay.com/v1");
        assert_eq!(config.timeout, Duration::from_secs(30));
    }

    #[test]
    fn unauthorized_maps_to_authentication() {
        let body = r#"{"error":{"code":"BAD_REQUEST_ERROR","description":"Authentication failed"}}"#;
        let err = map_error_response(401, body);

        assert_eq!(err.code, GatewayErrorCode::Authentication);
        assert_eq!(err.provider_code.as_deref(), Some("BAD_REQUEST_ERROR"));
        assert_eq!(err.message, "Authentication failed");
    }

    #[test]
    fn client_error_maps_to_bad_request() {
        let err = map_error_response(400, r#"{"error":{"code":"BAD_REQUEST_ERROR"}}"#);
        assert_eq!(err.code, GatewayErrorCode::BadRequest);
        assert_eq!(err.message, "HTTP 400");
    }

    #[test]
    fn server_error_with_html_body_maps_to_provider() {
        let err = map_error_response(503, "<html>Service Unavailable</html>");
        assert_eq!(err.code, GatewayErrorCode::Provider);
        assert!(err.provider_code.is_none());
    }
}
