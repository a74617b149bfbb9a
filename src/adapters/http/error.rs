//! JSON error bodies and the `PaymentError` to HTTP mapping.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::domain::payment::PaymentError;

/// Standard error response for API errors: `{code, message}`.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    /// Error code for programmatic handling.
    pub code: String,
    /// Human-readable error message.
    pub message: String,
    /// Offending field for validation failures.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
}

impl ErrorResponse {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            field: None,
        }
    }

    pub fn with_field(mut self, field: impl Into<String>) -> Self {
        self.field = Some(field.into());
        self
    }
}

/// Wraps `PaymentError` so handlers can return it with `?`.
#[derive(Debug)]
pub struct PaymentApiError(pub PaymentError);

impl From<PaymentError> for PaymentApiError {
    fn from(err: PaymentError) -> Self {
        Self(err)
    }
}

impl IntoResponse for PaymentApiError {
    fn into_response(self) -> Response {
        let error = self.0;
        let status = error.status_code();

        match &error {
            PaymentError::UpstreamUnavailable(detail) | PaymentError::Infrastructure(detail) => {
                tracing::error!(code = error.code(), detail = %detail, "Payment request failed");
            }
            PaymentError::InvalidSignature | PaymentError::MissingSignature => {
                tracing::warn!(code = error.code(), "Payment request rejected");
            }
            _ => tracing::debug!(code = error.code(), error = %error, "Payment request rejected"),
        }

        let mut body = ErrorResponse::new(error.code(), error.public_message());
        if let PaymentError::Validation(validation) = &error {
            body = body.with_field(validation.field());
        }

        (status, Json(body)).into_response()
    }
}

/// 404 for unmatched routes, in the same body shape.
pub async fn fallback_not_found() -> Response {
    (
        StatusCode::NOT_FOUND,
        Json(ErrorResponse::new("NOT_FOUND", "Route not found")),
    )
        .into_response()
}
