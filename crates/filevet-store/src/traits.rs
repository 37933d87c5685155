//! Status store abstraction trait.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use filevet_core::models::{RequestStatus, StatusKind};
use filevet_core::AppError;

/// Keyed store of [`RequestStatus`] records.
///
/// `save` is an upsert keyed by file id: resubmitting a file overwrites its
/// status and result without creating a duplicate record. Implementations
/// must keep per-key writes safe under concurrency; no cross-key coordination
/// is required.
#[async_trait]
pub trait StatusStore: Send + Sync {
    async fn find_by_id(&self, file_id: &str) -> Result<Option<RequestStatus>, AppError>;

    /// Insert or replace the record for `status.file_id`, preserving any
    /// creation time already stored for that id.
    async fn save(&self, status: &RequestStatus) -> Result<(), AppError>;

    async fn delete_by_id(&self, file_id: &str) -> Result<(), AppError>;

    /// Records in `status` whose `updated_at` is strictly before `threshold`.
    /// Drives retention sweeping.
    async fn find_by_status_updated_before(
        &self,
        status: StatusKind,
        threshold: DateTime<Utc>,
    ) -> Result<Vec<RequestStatus>, AppError>;

    /// Ids of legacy rows persisted without a creation time. Backends that
    /// cannot hold such rows return an empty list.
    async fn find_missing_created(&self) -> Result<Vec<String>, AppError>;
}
