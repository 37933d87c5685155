//! Antivirus-aware file retrieval.

use std::sync::Arc;

use filevet_core::models::{AvStatus, File, FileMetadata};
use filevet_core::{AttemptFailure, RetryPolicy};

use crate::client::FileStoreApi;
use crate::error::TransferError;

/// Fetches files from the remote store, waiting out the asynchronous
/// antivirus scan.
///
/// Each retrieval re-fetches metadata through [`RetryPolicy`]: a
/// `not-scanned` state backs off and polls again, `infected` aborts
/// immediately, and only a `clean` state proceeds to the content download.
/// A caller can never receive bytes for a file whose scan is not clean.
#[derive(Clone)]
pub struct FileRetriever {
    api: Arc<dyn FileStoreApi>,
    retry: RetryPolicy,
}

impl FileRetriever {
    pub fn new(api: Arc<dyn FileStoreApi>, retry: RetryPolicy) -> Self {
        Self { api, retry }
    }

    /// Fetch a file's content once its scan completes.
    ///
    /// Returns `None` when the store does not know the id. Exceeding the
    /// retry budget surfaces as [`TransferError::Timeout`], never as a
    /// silent `None`.
    #[tracing::instrument(skip(self))]
    pub async fn get(&self, file_id: &str) -> Result<Option<File>, TransferError> {
        let api = self.api.clone();
        let id = file_id.to_string();

        let result = self
            .retry
            .attempt(move || {
                let api = api.clone();
                let id = id.clone();
                async move {
                    let metadata = match api.metadata(&id).await {
                        Ok(Some(metadata)) => metadata,
                        Ok(None) => return Ok(None),
                        Err(e) => return Err(classify(e)),
                    };

                    match metadata.av_status {
                        AvStatus::Infected => {
                            tracing::warn!(file_id = %id, "File failed antivirus scan");
                            Err(AttemptFailure::Fatal(TransferError::Infected(id.clone())))
                        }
                        AvStatus::NotScanned => {
                            Err(AttemptFailure::Retryable(TransferError::ScanPending(
                                id.clone(),
                            )))
                        }
                        AvStatus::Clean => {
                            let data = api
                                .content(&metadata.download_location)
                                .await
                                .map_err(classify)?;
                            tracing::debug!(
                                file_id = %id,
                                size = data.len(),
                                "File content downloaded"
                            );
                            Ok(Some(File {
                                id: metadata.id,
                                name: metadata.name,
                                data,
                            }))
                        }
                    }
                }
            })
            .await;

        result.map_err(TransferError::from)
    }

    /// Fetch a file's descriptor without waiting for the scan; only transport
    /// faults are retried, so callers can observe scan progress.
    #[tracing::instrument(skip(self))]
    pub async fn get_details(&self, file_id: &str) -> Result<Option<FileMetadata>, TransferError> {
        let api = self.api.clone();
        let id = file_id.to_string();

        let result = self
            .retry
            .attempt(move || {
                let api = api.clone();
                let id = id.clone();
                async move { api.metadata(&id).await.map_err(classify) }
            })
            .await;

        result.map_err(TransferError::from)
    }

    /// Delete the remote file. Not retried here; the remote delete is
    /// idempotent.
    #[tracing::instrument(skip(self))]
    pub async fn delete(&self, file_id: &str) -> Result<(), TransferError> {
        self.api.delete(file_id).await
    }
}

/// Transport faults may clear on a later poll; everything else is a terminal
/// condition for the whole retrieval.
fn classify(err: TransferError) -> AttemptFailure<TransferError> {
    match err {
        TransferError::Transport(_) => AttemptFailure::Retryable(err),
        _ => AttemptFailure::Fatal(err),
    }
}
