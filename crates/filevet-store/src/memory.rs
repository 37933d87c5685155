//! In-memory status store for local deployments and tests.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use filevet_core::models::{RequestStatus, StatusKind};
use filevet_core::AppError;

use crate::traits::StatusStore;

/// `HashMap` behind an async `RwLock`. Creation times are merged on save the
/// same way the PostgreSQL upsert does, so both backends behave identically
/// under resubmission.
#[derive(Default)]
pub struct InMemoryStatusStore {
    records: RwLock<HashMap<String, RequestStatus>>,
}

impl InMemoryStatusStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl StatusStore for InMemoryStatusStore {
    async fn find_by_id(&self, file_id: &str) -> Result<Option<RequestStatus>, AppError> {
        Ok(self.records.read().await.get(file_id).cloned())
    }

    async fn save(&self, status: &RequestStatus) -> Result<(), AppError> {
        let mut records = self.records.write().await;
        let mut record = status.clone();
        if let Some(existing) = records.get(&record.file_id) {
            record.created_at = existing.created_at;
        }
        records.insert(record.file_id.clone(), record);
        Ok(())
    }

    async fn delete_by_id(&self, file_id: &str) -> Result<(), AppError> {
        self.records.write().await.remove(file_id);
        Ok(())
    }

    async fn find_by_status_updated_before(
        &self,
        status: StatusKind,
        threshold: DateTime<Utc>,
    ) -> Result<Vec<RequestStatus>, AppError> {
        Ok(self
            .records
            .read()
            .await
            .values()
            .filter(|r| r.status == status && r.updated_at < threshold)
            .cloned()
            .collect())
    }

    async fn find_missing_created(&self) -> Result<Vec<String>, AppError> {
        // Records are always constructed with a creation time
        Ok(Vec::new())
    }
}
