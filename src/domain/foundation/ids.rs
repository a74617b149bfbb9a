//! Strongly-typed identifier value objects.
//!
//! Order and payment identifiers are issued by the payment gateway, so they
//! are opaque strings rather than UUIDs. They are joined with `|` when the
//! checkout signature is computed, which is why that character is rejected.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::ValidationError;

/// Separator used in the canonical `"{order_id}|{payment_id}"` signature input.
pub const SIGNATURE_SEPARATOR: char = '|';

fn validate_gateway_id(field: &str, value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::empty_field(field));
    }
    if value.contains(SIGNATURE_SEPARATOR) {
        return Err(ValidationError::invalid_format(
            field,
            "must not contain '|'",
        ));
    }
    if value.chars().any(char::is_whitespace) {
        return Err(ValidationError::invalid_format(
            field,
            "must not contain whitespace",
        ));
    }
    Ok(())
}

/// Gateway-issued order identifier (e.g. `order_ABC`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrderId(String);

impl OrderId {
    pub fn new(id: impl Into<String>) -> Result<Self, ValidationError> {
        let id = id.into();
        validate_gateway_id("order_id", &id)?;
        Ok(Self(id))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for OrderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for OrderId {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

/// Gateway-issued payment identifier (e.g. `pay_XYZ`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PaymentId(String);

impl PaymentId {
    pub fn new(id: impl Into<String>) -> Result<Self, ValidationError> {
        let id = id.into();
        validate_gateway_id("payment_id", &id)?;
        Ok(Self(id))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PaymentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for PaymentId {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

/// User identifier from the identity provider's `sub` claim.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(String);

impl UserId {
    /// Creates a new UserId, rejecting empty strings.
    pub fn new(id: impl Into<String>) -> Result<Self, ValidationError> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err(ValidationError::empty_field("user_id"));
        }
        Ok(Self(id))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn order_id_accepts_gateway_format() {
        let id = OrderId::new("order_ABC").unwrap();
        assert_eq!(id.as_str(), "order_ABC");
        assert_eq!(id.to_string(), "order_ABC");
    }

    #[test]
    fn order_id_rejects_empty() {
        assert_eq!(
            OrderId::new("  ").unwrap_err(),
            ValidationError::empty_field("order_id")
        );
    }

    #[test]
    fn payment_id_rejects_separator() {
        let err = PaymentId::new("pay_1|order_2").unwrap_err();
        assert_eq!(err.field(), "payment_id");
    }

    #[test]
    fn payment_id_rejects_whitespace() {
        assert!(PaymentId::new("pay XYZ").is_err());
    }

    #[test]
    fn payment_id_parses_from_str() {
        let id: PaymentId = "pay_XYZ".parse().unwrap();
        assert_eq!(id.as_str(), "pay_XYZ");
    }

    #[test]
    fn user_id_rejects_empty() {
        assert!(UserId::new("").is_err());
        assert_eq!(UserId::new("user-123").unwrap().as_str(), "user-123");
    }

    #[test]
    fn ids_serialize_transparently() {
        let id = OrderId::new("order_ABC").unwrap();
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"order_ABC\"");
    }
}
