//! HMAC-SHA256 signature verification for the checkout callback and webhooks.
//!
//! Two secrets, two inputs:
//!
//! - checkout callback: HMAC(key secret, `"{order_id}|{payment_id}"`)
//! - webhook: HMAC(webhook secret, raw request body bytes)
//!
//! Signatures are lowercase hex. Comparison is constant-time over the hex
//! text, so any altered character (including case) is a mismatch.

use hmac::{Hmac, Mac};
use secrecy::{ExposeSecret, SecretString};
use sha2::Sha256;
use subtle::ConstantTimeEq;

use crate::domain::foundation::{OrderId, PaymentId, SIGNATURE_SEPARATOR};

use super::errors::PaymentError;

type HmacSha256 = Hmac<Sha256>;

/// Computes the lowercase hex HMAC-SHA256 of `message` under `secret`.
pub fn compute_signature(secret: &[u8], message: &[u8]) -> String {
    let mut mac = HmacSha256::new_from_slice(secret).expect("HMAC can take key of any size");
    mac.update(message);
    hex::encode(mac.finalize().into_bytes())
}

/// Canonical checkout signature input.
pub fn checkout_payload(order_id: &OrderId, payment_id: &PaymentId) -> String {
    format!("{}{}{}", order_id, SIGNATURE_SEPARATOR, payment_id)
}

fn constant_time_compare(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.ct_eq(b).into()
}

/// Verifies the signature the checkout widget returns to the client.
pub struct CheckoutSignatureVerifier {
    key_secret: SecretString,
}

impl CheckoutSignatureVerifier {
    pub fn new(key_secret: SecretString) -> Self {
        Self { key_secret }
    }

    pub fn expected_signature(&self, order_id: &OrderId, payment_id: &PaymentId) -> String {
        compute_signature(
            self.key_secret.expose_secret().as_bytes(),
            checkout_payload(order_id, payment_id).as_bytes(),
        )
    }

    /// # Errors
    ///
    /// `InvalidSignature` on any mismatch.
    pub fn verify(
        &self,
        order_id: &OrderId,
        payment_id: &PaymentId,
        signature: &str,
    ) -> Result<(), PaymentError> {
        let expected = self.expected_signature(order_id, payment_id);
        if constant_time_compare(expected.as_bytes(), signature.trim().as_bytes()) {
            Ok(())
        } else {
            Err(PaymentError::InvalidSignature)
        }
    }
}

/// Verifies the signature header on gateway webhooks.
pub struct WebhookSignatureVerifier {
    webhook_secret: SecretString,
}

impl WebhookSignatureVerifier {
    pub fn new(webhook_secret: SecretString) -> Self {
        Self { webhook_secret }
    }

    /// Verifies against the exact bytes received. Never re-serialize the
    /// body before calling this.
    ///
    /// # Errors
    ///
    /// - `MissingSignature` if no header value was supplied
    /// - `InvalidSignature` on mismatch
    pub fn verify(&self, body: &[u8], signature: Option<&str>) -> Result<(), PaymentError> {
        let signature = signature
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .ok_or(PaymentError::MissingSignature)?;

        let expected = compute_signature(self.webhook_secret.expose_secret().as_bytes(), body);
        if constant_time_compare(expected.as_bytes(), signature.as_bytes()) {
            Ok(())
        } else {
            Err(PaymentError::InvalidSignature)
        }
    }
}
