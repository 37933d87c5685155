//! Remote file store client.

use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::{Client, RequestBuilder, StatusCode};

use filevet_core::models::FileMetadata;

use crate::error::TransferError;

/// Outbound surface of the remote file store.
///
/// Behind a trait so the retriever can be exercised against scripted
/// responses in tests.
#[async_trait]
pub trait FileStoreApi: Send + Sync {
    /// Fetch the descriptor for a file. `None` means the store does not know
    /// the id (terminal, not a transport fault).
    async fn metadata(&self, file_id: &str) -> Result<Option<FileMetadata>, TransferError>;

    /// Download content from the location named in the metadata.
    async fn content(&self, location: &str) -> Result<Bytes, TransferError>;

    /// Delete a file. Idempotent at the remote end; a missing file is not an
    /// error.
    async fn delete(&self, file_id: &str) -> Result<(), TransferError>;
}

/// reqwest implementation against the file store's HTTP API.
pub struct HttpFileStore {
    client: Client,
    base_url: String,
    api_key: Option<String>,
}

impl HttpFileStore {
    pub fn new(base_url: String, api_key: Option<String>) -> Result<Self, TransferError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| {
                TransferError::Transport(format!("Failed to create HTTP client: {}", e))
            })?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
        })
    }

    fn authorized(&self, builder: RequestBuilder) -> RequestBuilder {
        match &self.api_key {
            Some(key) => builder.header("Authorization", key),
            None => builder,
        }
    }

    /// Download locations in metadata may be absolute or store-relative.
    fn resolve(&self, location: &str) -> String {
        if location.starts_with("http://") || location.starts_with("https://") {
            location.to_string()
        } else {
            format!("{}/{}", self.base_url, location.trim_start_matches('/'))
        }
    }
}

#[async_trait]
impl FileStoreApi for HttpFileStore {
    async fn metadata(&self, file_id: &str) -> Result<Option<FileMetadata>, TransferError> {
        let url = format!("{}/files/{}", self.base_url, file_id);
        let response = self
            .authorized(self.client.get(&url))
            .send()
            .await
            .map_err(|e| TransferError::Transport(format!("Metadata request failed: {}", e)))?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(TransferError::Transport(format!(
                "Metadata request returned {}: {}",
                status, body
            )));
        }

        let metadata: FileMetadata = response.json().await.map_err(|e| {
            TransferError::UnexpectedResponse(format!("Undecodable metadata body: {}", e))
        })?;

        Ok(Some(metadata))
    }

    async fn content(&self, location: &str) -> Result<Bytes, TransferError> {
        let url = self.resolve(location);
        let response = self
            .authorized(self.client.get(&url))
            .send()
            .await
            .map_err(|e| TransferError::Transport(format!("Content request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(TransferError::Transport(format!(
                "Content request returned {}: {}",
                status, body
            )));
        }

        response
            .bytes()
            .await
            .map_err(|e| TransferError::Transport(format!("Content read failed: {}", e)))
    }

    async fn delete(&self, file_id: &str) -> Result<(), TransferError> {
        let url = format!("{}/files/{}", self.base_url, file_id);
        let response = self
            .authorized(self.client.delete(&url))
            .send()
            .await
            .map_err(|e| TransferError::Transport(format!("Delete request failed: {}", e)))?;

        let status = response.status();
        if status.is_success() || status == StatusCode::NOT_FOUND {
            Ok(())
        } else {
            let body = response.text().await.unwrap_or_default();
            Err(TransferError::Transport(format!(
                "Delete request returned {}: {}",
                status, body
            )))
        }
    }
}
