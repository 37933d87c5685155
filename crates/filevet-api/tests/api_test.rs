//! Route-level behaviour over in-memory backends.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::http::StatusCode;
use axum_test::TestServer;
use bytes::Bytes;

use filevet_api::setup::setup_routes;
use filevet_api::AppState;
use filevet_core::models::{AvStatus, FileMetadata};
use filevet_core::RetryPolicy;
use filevet_service::{
    DummyValidator, RenderService, RetentionSweeper, ValidationOrchestrator, ValidationStrategy,
};
use filevet_store::InMemoryStatusStore;
use filevet_transfer::{FileRetriever, FileStoreApi, TransferError};

/// File store double holding one clean file.
struct SingleFileStore;

#[async_trait]
impl FileStoreApi for SingleFileStore {
    async fn metadata(&self, file_id: &str) -> Result<Option<FileMetadata>, TransferError> {
        if file_id != "f1" {
            return Ok(None);
        }
        Ok(Some(FileMetadata {
            id: "f1".to_string(),
            name: "accounts.xhtml".to_string(),
            size: 7,
            av_status: AvStatus::Clean,
            download_location: "/d/f1".to_string(),
        }))
    }

    async fn content(&self, _location: &str) -> Result<Bytes, TransferError> {
        Ok(Bytes::from_static(b"<html/>"))
    }

    async fn delete(&self, _file_id: &str) -> Result<(), TransferError> {
        Ok(())
    }
}

fn test_server() -> TestServer {
    let store = Arc::new(InMemoryStatusStore::new());
    let retriever = FileRetriever::new(
        Arc::new(SingleFileStore),
        RetryPolicy {
            base_delay: Duration::from_millis(5),
            delay_increment: Duration::from_millis(5),
            max_delay: Duration::from_millis(20),
            timeout: Duration::from_secs(2),
        },
    );

    let orchestrator = Arc::new(ValidationOrchestrator::new(
        store.clone(),
        retriever.clone(),
        ValidationStrategy::Inline(Arc::new(DummyValidator)),
    ));
    // No render endpoint configured; rendering is a configuration fault
    let render = Arc::new(RenderService::new(retriever.clone(), None).unwrap());
    let sweeper = Arc::new(RetentionSweeper::new(
        store,
        retriever,
        30,
        Duration::from_secs(3600),
    ));
    let sweep_task = sweeper.clone().start();

    let router = setup_routes(Arc::new(AppState {
        orchestrator,
        render,
        sweeper,
        sweep_task,
    }));
    TestServer::new(router).unwrap()
}

#[tokio::test]
async fn health_reports_ok() {
    let server = test_server();

    let response = server.get("/health").await;
    response.assert_status_ok();
}

#[tokio::test]
async fn submit_known_file_returns_accepted_pending() {
    let server = test_server();

    let response = server.post("/api/validate/f1").await;
    response.assert_status(StatusCode::ACCEPTED);

    let body: serde_json::Value = response.json();
    assert_eq!(body["status"], "PENDING");
    assert_eq!(body["file_name"], "accounts.xhtml");
}

#[tokio::test]
async fn unknown_file_gets_a_json_not_found() {
    let server = test_server();

    let response = server.get("/api/validate/missing").await;
    response.assert_status(StatusCode::NOT_FOUND);

    let body: serde_json::Value = response.json();
    assert_eq!(body["code"], "NOT_FOUND");
}

#[tokio::test]
async fn validator_callback_persists_the_outcome() {
    let server = test_server();

    server.post("/api/validate/f1").await.assert_status(StatusCode::ACCEPTED);

    let response = server
        .post("/api/validate/f1/result")
        .json(&serde_json::json!({
            "code": "FAILED",
            "errors": ["bad period end"]
        }))
        .await;
    response.assert_status_ok();

    let body: serde_json::Value = response.json();
    assert_eq!(body["status"], "COMPLETE");
    assert_eq!(body["result"]["code"], "FAILED");
}

#[tokio::test]
async fn render_without_endpoint_is_a_configuration_error() {
    let server = test_server();

    let response = server.get("/api/render/f1").await;
    response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);

    let body: serde_json::Value = response.json();
    assert_eq!(body["code"], "CONFIGURATION_ERROR");
}
