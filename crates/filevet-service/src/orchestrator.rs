//! Validation orchestration: fetch file, dispatch a validator strategy,
//! persist the resulting status.
//!
//! Inline validation runs on a single background worker so `submit` can
//! return a PENDING record immediately. The PENDING write happens before the
//! job is enqueued and the worker is the only background writer, so for a
//! given file id a poller never observes a state older than PENDING.
//! Concurrent writes to the same file id remain last-write-wins; the store
//! upsert keeps the creation time either way.

use std::sync::Arc;

use chrono::Utc;
use tokio::sync::mpsc;

use filevet_core::models::{File, OutcomeCode, RequestStatus, ValidationOutcome};
use filevet_core::AppError;
use filevet_store::StatusStore;
use filevet_transfer::FileRetriever;

use crate::validator::{ValidationStarter, Validator};

/// Which validator a deployment dispatches to.
pub enum ValidationStrategy {
    /// Validate on the background worker and persist the result in-process.
    Inline(Arc<dyn Validator>),
    /// Hand off to a remote validator; the outcome arrives later through
    /// [`ValidationOrchestrator::save_results`].
    Callback(Arc<dyn ValidationStarter>),
}

struct ValidationJob {
    file: File,
}

pub struct ValidationOrchestrator {
    store: Arc<dyn StatusStore>,
    retriever: FileRetriever,
    strategy: ValidationStrategy,
    job_tx: mpsc::Sender<ValidationJob>,
    shutdown_tx: mpsc::Sender<()>,
}

impl ValidationOrchestrator {
    /// Create the orchestrator. In inline mode this spawns the single
    /// validation worker; in callback mode the queue is never used.
    pub fn new(
        store: Arc<dyn StatusStore>,
        retriever: FileRetriever,
        strategy: ValidationStrategy,
    ) -> Self {
        let (job_tx, job_rx) = mpsc::channel(64);
        let (shutdown_tx, shutdown_rx) = mpsc::channel(1);

        if let ValidationStrategy::Inline(validator) = &strategy {
            let store = store.clone();
            let validator = validator.clone();
            tokio::spawn(async move {
                Self::worker_loop(store, validator, job_rx, shutdown_rx).await;
            });
        }

        Self {
            store,
            retriever,
            strategy,
            job_tx,
            shutdown_tx,
        }
    }

    /// Submit a file for validation.
    ///
    /// Returns `None` when the file store does not know the id. Otherwise a
    /// PENDING record is persisted (creation time preserved on resubmission)
    /// and returned immediately; validation itself happens in the background
    /// or at the external validator.
    #[tracing::instrument(skip(self))]
    pub async fn submit(&self, file_id: &str) -> Result<Option<RequestStatus>, AppError> {
        let Some(file) = self.retriever.get(file_id).await? else {
            tracing::info!(file_id, "Submission for unknown file");
            return Ok(None);
        };

        let existing = self.store.find_by_id(file_id).await?;
        let pending = RequestStatus::pending(file_id, &file.name, existing.as_ref(), Utc::now());
        self.store.save(&pending).await?;

        match &self.strategy {
            ValidationStrategy::Callback(client) => {
                // Failure to reach the validator propagates loudly; retrying
                // is the caller's responsibility.
                client.start_validation(file_id).await?;
            }
            ValidationStrategy::Inline(_) => {
                self.job_tx
                    .send(ValidationJob { file })
                    .await
                    .map_err(|_| {
                        AppError::Internal("Validation worker is not running".to_string())
                    })?;
            }
        }

        tracing::info!(file_id, "Submission accepted");
        Ok(Some(pending))
    }

    /// Apply a validator outcome for a file id and persist the derived
    /// status. This is the inbound half of the callback strategy and is also
    /// used by the inline worker.
    #[tracing::instrument(skip(self, outcome), fields(code = %outcome.code))]
    pub async fn save_results(
        &self,
        file_id: &str,
        outcome: ValidationOutcome,
    ) -> Result<RequestStatus, AppError> {
        Self::persist_outcome(&self.store, file_id, outcome, None).await
    }

    pub async fn get_status(&self, file_id: &str) -> Result<Option<RequestStatus>, AppError> {
        self.store.find_by_id(file_id).await
    }

    /// Signal the background worker to stop. In-flight work finishes first.
    pub async fn shutdown(&self) {
        let _ = self.shutdown_tx.send(()).await;
    }

    async fn worker_loop(
        store: Arc<dyn StatusStore>,
        validator: Arc<dyn Validator>,
        mut job_rx: mpsc::Receiver<ValidationJob>,
        mut shutdown_rx: mpsc::Receiver<()>,
    ) {
        tracing::info!("Validation worker started");
        loop {
            tokio::select! {
                job = job_rx.recv() => match job {
                    Some(job) => Self::run_job(&store, &validator, job).await,
                    None => break,
                },
                _ = shutdown_rx.recv() => {
                    tracing::info!("Validation worker shutting down");
                    break;
                }
            }
        }
    }

    async fn run_job(
        store: &Arc<dyn StatusStore>,
        validator: &Arc<dyn Validator>,
        job: ValidationJob,
    ) {
        let file_id = job.file.id.clone();
        let file_name = job.file.name.clone();

        // A validator fault becomes an ERROR status, it is not thrown
        let outcome = match validator.validate(&job.file).await {
            Ok(outcome) => outcome,
            Err(e) => {
                tracing::error!(file_id = %file_id, error = %e, "Validator fault");
                ValidationOutcome::with_errors(OutcomeCode::Error, vec![e.to_string()])
            }
        };

        if let Err(e) = Self::persist_outcome(store, &file_id, outcome, Some(&file_name)).await {
            tracing::error!(file_id = %file_id, error = %e, "Failed to persist validation result");
        }
    }

    async fn persist_outcome(
        store: &Arc<dyn StatusStore>,
        file_id: &str,
        outcome: ValidationOutcome,
        file_name: Option<&str>,
    ) -> Result<RequestStatus, AppError> {
        let existing = store.find_by_id(file_id).await?;
        let name = file_name
            .map(str::to_string)
            .or_else(|| existing.as_ref().map(|e| e.file_name.clone()))
            .unwrap_or_default();

        let status =
            RequestStatus::from_outcome(file_id, outcome, &name, existing.as_ref(), Utc::now());
        store.save(&status).await?;

        tracing::info!(file_id, status = %status.status, "Request status updated");
        Ok(status)
    }
}
