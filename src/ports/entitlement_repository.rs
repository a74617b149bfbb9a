//! Persistence port for user entitlements.

use async_trait::async_trait;

use crate::domain::foundation::{DomainError, Timestamp, UserId};
use crate::domain::payment::UserEntitlement;

/// Port for reading and setting e-book access.
///
/// # Contract
///
/// Setting `granted = true` on a user who already has access keeps the
/// original purchase timestamp. Callers must only grant after a verified
/// signature.
#[async_trait]
pub trait EntitlementRepository: Send + Sync {
    async fn set_entitlement(
        &self,
        user_id: &UserId,
        granted: bool,
        at: Timestamp,
    ) -> Result<(), DomainError>;

    async fn find_entitlement(&self, user_id: &UserId)
        -> Result<Option<UserEntitlement>, DomainError>;
}
