//! PDF rendering of retrieved accounts documents.

use std::time::Duration;

use bytes::Bytes;
use reqwest::Client;

use filevet_core::AppError;
use filevet_transfer::FileRetriever;

/// Renders a stored document as PDF by posting its content to the configured
/// render endpoint. The file goes through the retriever first, so rendering
/// is gated on a clean antivirus scan like any other read.
pub struct RenderService {
    retriever: FileRetriever,
    client: Client,
    render_url: Option<String>,
}

impl RenderService {
    pub fn new(retriever: FileRetriever, render_url: Option<String>) -> Result<Self, AppError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(60))
            .build()
            .map_err(|e| AppError::Internal(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            retriever,
            client,
            render_url,
        })
    }

    /// Render a file as PDF. `None` when the file store does not know the
    /// id; a missing render endpoint is a configuration fault at first use.
    #[tracing::instrument(skip(self))]
    pub async fn render_pdf(&self, file_id: &str) -> Result<Option<Bytes>, AppError> {
        let url = self
            .render_url
            .as_deref()
            .ok_or_else(|| AppError::Config("RENDER_SERVICE_URL not configured".to_string()))?;

        let Some(file) = self.retriever.get(file_id).await? else {
            return Ok(None);
        };

        let response = self
            .client
            .post(url)
            .header("Content-Type", "application/xhtml+xml")
            .header("Accept", "application/pdf")
            .body(file.data)
            .send()
            .await
            .map_err(|e| AppError::External(format!("Render service unreachable: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::External(format!(
                "Render service returned {}: {}",
                status, body
            )));
        }

        let pdf = response
            .bytes()
            .await
            .map_err(|e| AppError::External(format!("Render response read failed: {}", e)))?;

        tracing::info!(file_id, size = pdf.len(), "Document rendered as PDF");
        Ok(Some(pdf))
    }
}
