//! GetEntitlementHandler - Query handler for a user's purchase state.

use std::sync::Arc;

use crate::domain::foundation::UserId;
use crate::domain::payment::{PaymentError, PaymentRecord, UserEntitlement};
use crate::ports::{EntitlementRepository, PaymentRepository};

#[derive(Debug, Clone)]
pub struct GetEntitlementQuery {
    pub user_id: UserId,
}

#[derive(Debug, Clone)]
pub struct GetEntitlementResult {
    pub entitlement: UserEntitlement,
    /// Newest first.
    pub payments: Vec<PaymentRecord>,
}

pub struct GetEntitlementHandler {
    payments: Arc<dyn PaymentRepository>,
    entitlements: Arc<dyn EntitlementRepository>,
}

impl GetEntitlementHandler {
    pub fn new(
        payments: Arc<dyn PaymentRepository>,
        entitlements: Arc<dyn EntitlementRepository>,
    ) -> Self {
        Self {
            payments,
            entitlements,
        }
    }

    pub async fn handle(
        &self,
        query: GetEntitlementQuery,
    ) -> Result<GetEntitlementResult, PaymentError> {
        let entitlement = self
            .entitlements
            .find_entitlement(&query.user_id)
            .await?
            .unwrap_or_else(|| UserEntitlement::none(query.user_id.clone()));
        let payments = self.payments.read_user_payments(&query.user_id).await?;

        Ok(GetEntitlementResult {
            entitlement,
            payments,
        })
    }
}
