//! User entitlement to the purchased e-book.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{Timestamp, UserId};

/// Whether a user has purchased access, and since when.
///
/// Only reconciliation of a signature-verified payment grants access.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserEntitlement {
    pub user_id: UserId,
    pub granted: bool,
    pub purchased_at: Option<Timestamp>,
}

impl UserEntitlement {
    pub fn none(user_id: UserId) -> Self {
        Self {
            user_id,
            granted: false,
            purchased_at: None,
        }
    }

    /// Applies a grant or revoke.
    ///
    /// Granting twice keeps the first purchase time.
    pub fn apply(&mut self, granted: bool, at: Timestamp) {
        if granted {
            self.purchased_at = Some(self.purchased_at.unwrap_or(at));
        } else {
            self.purchased_at = None;
        }
        self.granted = granted;
    }
}
