//! Validator strategies.
//!
//! Two ways a file gets validated: inline through the [`Validator`] trait
//! (the dummy validator, for local deployments), or by handing the file id to
//! an external validator that reports back through the result callback.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;

use filevet_core::models::{AccountsData, File, OutcomeCode, ValidationOutcome};
use filevet_core::AppError;

/// Inline validation strategy: produces an outcome immediately.
#[async_trait]
pub trait Validator: Send + Sync {
    async fn validate(&self, file: &File) -> Result<ValidationOutcome, AppError>;
}

/// Outbound half of the callback strategy: kick off validation of a file at
/// a remote validator. The outcome arrives later through the result
/// callback, not through this trait.
#[async_trait]
pub trait ValidationStarter: Send + Sync {
    async fn start_validation(&self, file_id: &str) -> Result<(), AppError>;
}

/// Trivial inline validator. Does not implement any real validation rules;
/// it exists to exercise the full submit/poll lifecycle without the external
/// validator deployed.
pub struct DummyValidator;

#[async_trait]
impl Validator for DummyValidator {
    async fn validate(&self, file: &File) -> Result<ValidationOutcome, AppError> {
        if file.data.is_empty() {
            return Ok(ValidationOutcome::with_errors(
                OutcomeCode::Failed,
                vec!["Document is empty".to_string()],
            ));
        }

        Ok(ValidationOutcome {
            code: OutcomeCode::Ok,
            errors: Vec::new(),
            data: Some(AccountsData::default()),
        })
    }
}

#[derive(Serialize)]
struct StartValidationRequest<'a> {
    file_id: &'a str,
    callback_url: String,
}

/// Client for the asynchronous external validator.
///
/// `start_validation` only kicks the job off; the validator calls back to
/// `{callback_base_url}/api/validate/{file_id}/result` with the outcome when
/// it finishes. Invocation failures propagate loudly; retrying is the
/// caller's decision, not this client's.
#[derive(Debug)]
pub struct ExternalValidatorClient {
    client: Client,
    validator_url: String,
    callback_base_url: String,
}

impl ExternalValidatorClient {
    /// Both URLs are required; missing configuration is a fatal fault at
    /// construction, never retried.
    pub fn new(
        validator_url: Option<String>,
        callback_base_url: Option<String>,
    ) -> Result<Self, AppError> {
        let validator_url = validator_url
            .ok_or_else(|| AppError::Config("VALIDATOR_URL not configured".to_string()))?;
        let callback_base_url = callback_base_url
            .ok_or_else(|| AppError::Config("CALLBACK_BASE_URL not configured".to_string()))?;

        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| AppError::Internal(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            validator_url: validator_url.trim_end_matches('/').to_string(),
            callback_base_url: callback_base_url.trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl ValidationStarter for ExternalValidatorClient {
    #[tracing::instrument(skip(self))]
    async fn start_validation(&self, file_id: &str) -> Result<(), AppError> {
        let request = StartValidationRequest {
            file_id,
            callback_url: format!(
                "{}/api/validate/{}/result",
                self.callback_base_url, file_id
            ),
        };

        let response = self
            .client
            .post(format!("{}/validate", self.validator_url))
            .json(&request)
            .send()
            .await
            .map_err(|e| AppError::External(format!("Validator unreachable: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::External(format!(
                "Validator returned {}: {}",
                status, body
            )));
        }

        tracing::info!(file_id, "Validation started");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;

    #[tokio::test]
    async fn dummy_validator_passes_non_empty_documents() {
        let file = File {
            id: "f1".to_string(),
            name: "accounts.xhtml".to_string(),
            data: Bytes::from_static(b"<html/>"),
        };

        let outcome = DummyValidator.validate(&file).await.unwrap();
        assert_eq!(outcome.code, OutcomeCode::Ok);
        assert!(outcome.data.is_some());
    }

    #[tokio::test]
    async fn dummy_validator_fails_empty_documents() {
        let file = File {
            id: "f1".to_string(),
            name: "accounts.xhtml".to_string(),
            data: Bytes::new(),
        };

        let outcome = DummyValidator.validate(&file).await.unwrap();
        assert_eq!(outcome.code, OutcomeCode::Failed);
        assert_eq!(outcome.errors.len(), 1);
    }

    #[test]
    fn external_client_requires_both_urls() {
        let err = ExternalValidatorClient::new(None, Some("http://cb".to_string())).unwrap_err();
        assert!(matches!(err, AppError::Config(_)));

        let err = ExternalValidatorClient::new(Some("http://v".to_string()), None).unwrap_err();
        assert!(matches!(err, AppError::Config(_)));
    }
}
