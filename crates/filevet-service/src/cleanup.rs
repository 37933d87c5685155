//! Retention sweeping of finished validation requests.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use serde::Serialize;
use tokio::time::interval;

use filevet_core::models::StatusKind;
use filevet_core::AppError;
use filevet_store::StatusStore;
use filevet_transfer::FileRetriever;

#[derive(Debug, Clone, Copy, Serialize)]
pub struct SweepSummary {
    pub deleted: usize,
}

/// Deletes terminal (COMPLETE/ERROR) requests older than the retention
/// window, together with their backing files, plus legacy rows persisted
/// without a creation time.
///
/// Any failure mid-sweep aborts the run and propagates; records purged
/// before the fault stay deleted. The periodic driver logs the error and
/// tries again on the next tick.
pub struct RetentionSweeper {
    store: Arc<dyn StatusStore>,
    retriever: FileRetriever,
    retention: chrono::Duration,
    sweep_interval: Duration,
}

impl RetentionSweeper {
    pub fn new(
        store: Arc<dyn StatusStore>,
        retriever: FileRetriever,
        retention_days: i64,
        sweep_interval: Duration,
    ) -> Self {
        Self {
            store,
            retriever,
            retention: chrono::Duration::days(retention_days),
            sweep_interval,
        }
    }

    /// Start the background sweep task. Returns a JoinHandle for shutdown.
    pub fn start(self: Arc<Self>) -> tokio::task::JoinHandle<()> {
        tokio::spawn(async move {
            let mut sweep_interval = interval(self.sweep_interval);

            loop {
                sweep_interval.tick().await;

                tracing::info!("Starting scheduled retention sweep");
                match self.run().await {
                    Ok(summary) => {
                        tracing::info!(deleted = summary.deleted, "Retention sweep completed");
                    }
                    Err(e) => {
                        tracing::error!(error = %e, "Retention sweep failed");
                    }
                }
            }
        })
    }

    /// Run one sweep.
    #[tracing::instrument(skip(self))]
    pub async fn run(&self) -> Result<SweepSummary, AppError> {
        let threshold = Utc::now() - self.retention;

        let mut candidates = self
            .store
            .find_by_status_updated_before(StatusKind::Complete, threshold)
            .await?;
        candidates.extend(
            self.store
                .find_by_status_updated_before(StatusKind::Error, threshold)
                .await?,
        );
        let legacy = self.store.find_missing_created().await?;

        let mut deleted = 0;
        for record in &candidates {
            tracing::info!(
                file_id = %record.file_id,
                status = %record.status,
                updated_at = %record.updated_at,
                "Deleting expired request"
            );
            self.purge(&record.file_id).await?;
            deleted += 1;
        }

        for file_id in &legacy {
            tracing::warn!(file_id = %file_id, "Deleting legacy request without creation time");
            self.purge(file_id).await?;
            deleted += 1;
        }

        Ok(SweepSummary { deleted })
    }

    /// File first: a crash between the two deletes leaves an orphaned status
    /// record that the next sweep re-collects, never an unreferenced file.
    async fn purge(&self, file_id: &str) -> Result<(), AppError> {
        self.retriever.delete(file_id).await?;
        self.store.delete_by_id(file_id).await?;
        Ok(())
    }
}
