//! Order value objects and the validated order request.
//!
//! An `OrderRequest` can only be built from input that the gateway would
//! accept. Amounts are integers in the currency's minor unit (paise, cents).

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::domain::foundation::{OrderId, Timestamp, UserId, ValidationError};

/// Smallest chargeable amount in minor units.
pub const MIN_AMOUNT: u64 = 100;

/// Largest chargeable amount in minor units.
pub const MAX_AMOUNT: u64 = 1_000_000;

/// Gateway limit on the number of note entries per order.
pub const MAX_NOTES: usize = 15;

/// Gateway limit on the length of a single note value.
pub const MAX_NOTE_LENGTH: usize = 256;

/// Note key under which the purchasing user id travels through the gateway.
pub const USER_ID_NOTE: &str = "userId";

static RECEIPT_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^receipt_[0-9]{13,}$").expect("receipt pattern is valid"));

/// Order amount in minor currency units, bounded to `MIN_AMOUNT..=MAX_AMOUNT`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Amount(u64);

impl Amount {
    pub fn new(minor_units: i64) -> Result<Self, ValidationError> {
        if minor_units < MIN_AMOUNT as i64 || minor_units > MAX_AMOUNT as i64 {
            return Err(ValidationError::out_of_range(
                "amount",
                MIN_AMOUNT as i64,
                MAX_AMOUNT as i64,
                minor_units,
            ));
        }
        Ok(Self(minor_units as u64))
    }

    pub fn minor_units(&self) -> u64 {
        self.0
    }
}

/// Currencies the store sells in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    Inr,
    Usd,
}

impl Currency {
    pub fn as_str(&self) -> &'static str {
        match self {
            Currency::Inr => "INR",
            Currency::Usd => "USD",
        }
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Currency {
    type Err = ValidationError;

    /// Parses case-insensitively, so `"inr"` and `"INR"` are the same.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "INR" => Ok(Currency::Inr),
            "USD" => Ok(Currency::Usd),
            "" => Err(ValidationError::empty_field("currency")),
            other => Err(ValidationError::invalid_format(
                "currency",
                format!("unsupported currency '{}', expected INR or USD", other),
            )),
        }
    }
}

/// Merchant receipt token: `receipt_` followed by a millisecond timestamp.
///
/// Unique per creation attempt.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Receipt(String);

impl Receipt {
    pub fn new(token: impl Into<String>) -> Result<Self, ValidationError> {
        let token = token.into();
        if token.is_empty() {
            return Err(ValidationError::empty_field("receipt"));
        }
        if !RECEIPT_PATTERN.is_match(&token) {
            return Err(ValidationError::invalid_format(
                "receipt",
                "expected receipt_<millisecond timestamp>",
            ));
        }
        Ok(Self(token))
    }

    /// Receipt for the given instant.
    pub fn for_timestamp(at: Timestamp) -> Self {
        Self(format!("receipt_{:013}", at.as_unix_millis()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Free-form order notes, sent to the gateway and echoed back on webhooks.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrderNotes(BTreeMap<String, String>);

impl OrderNotes {
    /// Validates client-supplied notes against the gateway limits.
    ///
    /// The `userId` entry is reserved; any client value is dropped.
    pub fn new(entries: BTreeMap<String, String>) -> Result<Self, ValidationError> {
        let mut entries = entries;
        entries.remove(USER_ID_NOTE);

        // One slot is reserved for the user id.
        if entries.len() >= MAX_NOTES {
            return Err(ValidationError::out_of_range(
                "notes",
                0,
                (MAX_NOTES - 1) as i64,
                entries.len() as i64,
            ));
        }
        for (key, value) in &entries {
            if key.trim().is_empty() {
                return Err(ValidationError::empty_field("notes.key"));
            }
            if value.chars().count() > MAX_NOTE_LENGTH {
                return Err(ValidationError::invalid_format(
                    format!("notes.{}", key),
                    format!("longer than {} characters", MAX_NOTE_LENGTH),
                ));
            }
        }
        Ok(Self(entries))
    }

    /// Writes the purchasing user into the notes.
    pub fn with_user(mut self, user_id: &UserId) -> Self {
        self.0.insert(USER_ID_NOTE.to_string(), user_id.to_string());
        self
    }

    pub fn user_id(&self) -> Option<UserId> {
        self.0.get(USER_ID_NOTE).and_then(|id| UserId::new(id.clone()).ok())
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    pub fn as_map(&self) -> &BTreeMap<String, String> {
        &self.0
    }

    pub fn into_map(self) -> BTreeMap<String, String> {
        self.0
    }
}

/// Input accepted for order creation, fully validated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderRequest {
    pub amount: Amount,
    pub currency: Currency,
    pub receipt: Receipt,
    pub notes: OrderNotes,
    pub user_id: UserId,
}

impl OrderRequest {
    /// Validates raw input. Fails on the first offending field.
    pub fn new(
        user_id: UserId,
        amount: i64,
        currency: &str,
        receipt: &str,
        notes: Option<BTreeMap<String, String>>,
    ) -> Result<Self, ValidationError> {
        let amount = Amount::new(amount)?;
        let currency = currency.parse::<Currency>()?;
        let receipt = Receipt::new(receipt)?;
        let notes = OrderNotes::new(notes.unwrap_or_default())?.with_user(&user_id);

        Ok(Self {
            amount,
            currency,
            receipt,
            notes,
            user_id,
        })
    }
}

/// An order issued by the gateway. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub amount: Amount,
    pub currency: Currency,
    pub receipt: Receipt,
    pub user_id: UserId,
    pub notes: OrderNotes,
    pub created_at: Timestamp,
}

impl Order {
    /// Binds a gateway order id to the request that produced it.
    pub fn issued(id: OrderId, request: OrderRequest, created_at: Timestamp) -> Self {
        Self {
            id,
            amount: request.amount,
            currency: request.currency,
            receipt: request.receipt,
            user_id: request.user_id,
            notes: request.notes,
            created_at,
        }
    }

    pub fn is_owned_by(&self, user_id: &UserId) -> bool {
        &self.user_id == user_id
    }
}
