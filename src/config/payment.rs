//! Payment configuration (Razorpay)

use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;

use super::error::ValidationError;
use super::server::Environment;

/// Gateway credentials and client settings.
///
/// The key id is public and is handed to the checkout widget. Both secrets
/// stay on the server.
#[derive(Debug, Clone, Deserialize)]
pub struct PaymentConfig {
    pub razorpay_key_id: String,

    /// Basic-auth secret for the Orders API and checkout signatures
    pub razorpay_key_secret: SecretString,

    /// Secret configured on the dashboard webhook
    pub razorpay_webhook_secret: SecretString,

    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,

    #[serde(default = "default_gateway_timeout")]
    pub gateway_timeout_secs: u64,
}

impl PaymentConfig {
    pub fn new(
        key_id: impl Into<String>,
        key_secret: impl Into<String>,
        webhook_secret: impl Into<String>,
    ) -> Self {
        Self {
            razorpay_key_id: key_id.into(),
            razorpay_key_secret: SecretString::new(key_secret.into()),
            razorpay_webhook_secret: SecretString::new(webhook_secret.into()),
            api_base_url: default_api_base_url(),
            gateway_timeout_secs: default_gateway_timeout(),
        }
    }

    /// Check if using Razorpay test mode
    pub fn is_test_mode(&self) -> bool {
        self.razorpay_key_id.starts_with("rzp_test_")
    }

    /// Check if using Razorpay live mode
    pub fn is_live_mode(&self) -> bool {
        self.razorpay_key_id.starts_with("rzp_live_")
    }

    /// Validate payment configuration
    pub fn validate(&self, environment: &Environment) -> Result<(), ValidationError> {
        if self.razorpay_key_id.is_empty() {
            return Err(ValidationError::MissingRequired("ZENITH__PAYMENT__RAZORPAY_KEY_ID"));
        }
        if self.razorpay_key_secret.expose_secret().is_empty() {
            return Err(ValidationError::MissingRequired(
                "ZENITH__PAYMENT__RAZORPAY_KEY_SECRET",
            ));
        }
        if self.razorpay_webhook_secret.expose_secret().is_empty() {
            return Err(ValidationError::MissingRequired(
                "ZENITH__PAYMENT__RAZORPAY_WEBHOOK_SECRET",
            ));
        }

        if !self.razorpay_key_id.starts_with("rzp_") {
            return Err(ValidationError::InvalidRazorpayKeyId);
        }
        if *environment == Environment::Production && self.is_test_mode() {
            return Err(ValidationError::TestKeyInProduction);
        }
        if self.razorpay_webhook_secret.expose_secret() == self.razorpay_key_secret.expose_secret()
        {
            return Err(ValidationError::WebhookSecretReusesKeySecret);
        }
        if self.gateway_timeout_secs == 0 {
            return Err(ValidationError::InvalidTimeout);
        }

        Ok(())
    }
}

fn default_api_base_url() -> String {
    "https://api.razorpay.com/v1".to_string()
}

fn default_gateway_timeout() -> u64 {
    30
}
