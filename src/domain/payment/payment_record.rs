//! Payment records and the status precedence rule.
//!
//! There is one record per payment id. Writes overwrite, but a record never
//! moves to a lower-precedence status: a late `authorized` cannot demote a
//! `completed` payment.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::domain::foundation::{OrderId, PaymentId, Timestamp, UserId, ValidationError};

use super::order::Order;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    Authorized,
    Completed,
    Failed,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Authorized => "authorized",
            PaymentStatus::Completed => "completed",
            PaymentStatus::Failed => "failed",
        }
    }

    /// Ordering used when two writes race for the same payment id.
    pub fn precedence(&self) -> u8 {
        match self {
            PaymentStatus::Authorized => 0,
            PaymentStatus::Failed => 1,
            PaymentStatus::Completed => 2,
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, PaymentStatus::Authorized)
    }
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PaymentStatus {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "authorized" => Ok(PaymentStatus::Authorized),
            "completed" => Ok(PaymentStatus::Completed),
            "failed" => Ok(PaymentStatus::Failed),
            other => Err(ValidationError::invalid_format(
                "status",
                format!("unknown payment status '{}'", other),
            )),
        }
    }
}

/// Gateway-reported failure, kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailureReason {
    pub code: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentRecord {
    pub payment_id: PaymentId,
    pub order_id: OrderId,
    pub status: PaymentStatus,
    /// Minor units.
    pub amount: u64,
    pub currency: String,
    pub email: Option<String>,
    pub user_id: Option<UserId>,
    pub method: Option<String>,
    pub failure: Option<FailureReason>,
    pub recorded_at: Timestamp,
}

impl PaymentRecord {
    /// Completed record built from a locally stored order, for the
    /// checkout callback path where the gateway sends only ids.
    pub fn completed_for_order(payment_id: PaymentId, order: &Order, email: Option<String>) -> Self {
        Self {
            payment_id,
            order_id: order.id.clone(),
            status: PaymentStatus::Completed,
            amount: order.amount.minor_units(),
            currency: order.currency.as_str().to_string(),
            email,
            user_id: Some(order.user_id.clone()),
            method: None,
            failure: None,
            recorded_at: Timestamp::now(),
        }
    }

    /// True if writing `self` over `existing` is allowed.
    ///
    /// Equal precedence overwrites, so reapplying a terminal state is a no-op
    /// in effect.
    pub fn supersedes(&self, existing: &PaymentRecord) -> bool {
        self.status.precedence() >= existing.status.precedence()
    }
}
