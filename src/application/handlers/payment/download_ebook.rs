//! DownloadEbookHandler - Query handler for the purchased e-book.

use std::path::PathBuf;
use std::sync::Arc;

use crate::domain::foundation::UserId;
use crate::domain::payment::PaymentError;
use crate::ports::EntitlementRepository;

#[derive(Debug, Clone)]
pub struct DownloadEbookQuery {
    pub user_id: UserId,
}

#[derive(Debug, Clone)]
pub struct EbookFile {
    pub file_name: String,
    pub content: Vec<u8>,
}

/// Serves the e-book file to users with a granted entitlement.
pub struct DownloadEbookHandler {
    entitlements: Arc<dyn EntitlementRepository>,
    path: PathBuf,
    file_name: String,
}

impl DownloadEbookHandler {
    pub fn new(
        entitlements: Arc<dyn EntitlementRepository>,
        path: impl Into<PathBuf>,
        file_name: impl Into<String>,
    ) -> Self {
        Self {
            entitlements,
            path: path.into(),
            file_name: file_name.into(),
        }
    }

    /// # Errors
    ///
    /// - `NotEntitled` if the user has not purchased
    /// - `Infrastructure` if the file cannot be read
    pub async fn handle(&self, query: DownloadEbookQuery) -> Result<EbookFile, PaymentError> {
        let granted = self
            .entitlements
            .find_entitlement(&query.user_id)
            .await?
            .map(|e| e.granted)
            .unwrap_or(false);

        if !granted {
            tracing::info!(user_id = %query.user_id, "E-book download refused: no purchase");
            return Err(PaymentError::NotEntitled);
        }

        let content = tokio::fs::read(&self.path).await.map_err(|e| {
            tracing::error!(path = %self.path.display(), error = %e, "E-book file unreadable");
            PaymentError::infrastructure(format!("e-book file unreadable: {}", e))
        })?;

        tracing::info!(user_id = %query.user_id, bytes = content.len(), "E-book downloaded");

        Ok(EbookFile {
            file_name: self.file_name.clone(),
            content,
        })
    }
}
