//! Orchestrator lifecycle: submit, background completion, callback results.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;

use filevet_core::models::{
    AvStatus, File, FileMetadata, OutcomeCode, RequestStatus, StatusKind, ValidationOutcome,
};
use filevet_core::{AppError, RetryPolicy};
use filevet_service::{
    DummyValidator, ValidationOrchestrator, ValidationStarter, ValidationStrategy, Validator,
};
use filevet_store::{InMemoryStatusStore, StatusStore};
use filevet_transfer::{FileRetriever, FileStoreApi, TransferError};

/// File store double holding a fixed set of scanned files.
#[derive(Default)]
struct StaticFileStore {
    files: HashMap<String, (FileMetadata, Bytes)>,
}

impl StaticFileStore {
    fn with_file(mut self, id: &str, name: &str, av_status: AvStatus, data: &str) -> Self {
        let location = format!("/d/{id}");
        let metadata = FileMetadata {
            id: id.to_string(),
            name: name.to_string(),
            size: data.len() as u64,
            av_status,
            download_location: location,
        };
        self.files
            .insert(id.to_string(), (metadata, Bytes::from(data.to_string())));
        self
    }
}

#[async_trait]
impl FileStoreApi for StaticFileStore {
    async fn metadata(&self, file_id: &str) -> Result<Option<FileMetadata>, TransferError> {
        Ok(self.files.get(file_id).map(|(m, _)| m.clone()))
    }

    async fn content(&self, location: &str) -> Result<Bytes, TransferError> {
        self.files
            .values()
            .find(|(m, _)| m.download_location == location)
            .map(|(_, data)| data.clone())
            .ok_or_else(|| TransferError::Transport(format!("no content at {}", location)))
    }

    async fn delete(&self, _file_id: &str) -> Result<(), TransferError> {
        Ok(())
    }
}

/// Inline validator that always faults.
struct FaultyValidator;

#[async_trait]
impl Validator for FaultyValidator {
    async fn validate(&self, _file: &File) -> Result<ValidationOutcome, AppError> {
        Err(AppError::Internal("validator exploded".to_string()))
    }
}

/// Callback dispatch double that records started ids and can refuse.
#[derive(Default)]
struct RecordingStarter {
    started: std::sync::Mutex<Vec<String>>,
    refuse: bool,
}

#[async_trait]
impl ValidationStarter for RecordingStarter {
    async fn start_validation(&self, file_id: &str) -> Result<(), AppError> {
        if self.refuse {
            return Err(AppError::External("Validator unreachable".to_string()));
        }
        self.started.lock().unwrap().push(file_id.to_string());
        Ok(())
    }
}

fn retriever(api: Arc<dyn FileStoreApi>) -> FileRetriever {
    let policy = RetryPolicy {
        base_delay: Duration::from_millis(5),
        delay_increment: Duration::from_millis(5),
        max_delay: Duration::from_millis(20),
        timeout: Duration::from_secs(2),
    };
    FileRetriever::new(api, policy)
}

fn orchestrator(
    store: Arc<dyn StatusStore>,
    api: Arc<dyn FileStoreApi>,
    validator: Arc<dyn Validator>,
) -> ValidationOrchestrator {
    ValidationOrchestrator::new(store, retriever(api), ValidationStrategy::Inline(validator))
}

/// Poll the store until the record for `file_id` turns terminal.
async fn wait_for_terminal(store: &Arc<dyn StatusStore>, file_id: &str) -> RequestStatus {
    for _ in 0..200 {
        if let Some(status) = store.find_by_id(file_id).await.unwrap() {
            if status.is_terminal() {
                return status;
            }
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("request {file_id} never reached a terminal status");
}

#[tokio::test]
async fn submit_for_unknown_file_returns_none() {
    let store: Arc<dyn StatusStore> = Arc::new(InMemoryStatusStore::new());
    let api = Arc::new(StaticFileStore::default());

    let orchestrator = orchestrator(store.clone(), api, Arc::new(DummyValidator));
    assert!(orchestrator.submit("missing").await.unwrap().is_none());
    assert!(store.find_by_id("missing").await.unwrap().is_none());
}

#[tokio::test]
async fn submit_returns_pending_and_worker_completes_it() {
    let store: Arc<dyn StatusStore> = Arc::new(InMemoryStatusStore::new());
    let api = Arc::new(
        StaticFileStore::default().with_file("f1", "accounts.xhtml", AvStatus::Clean, "<html/>"),
    );

    let orchestrator = orchestrator(store.clone(), api, Arc::new(DummyValidator));
    let pending = orchestrator.submit("f1").await.unwrap().unwrap();

    assert_eq!(pending.status, StatusKind::Pending);
    assert_eq!(pending.file_name, "accounts.xhtml");
    assert!(pending.result.is_none());

    let complete = wait_for_terminal(&store, "f1").await;
    assert_eq!(complete.status, StatusKind::Complete);
    assert_eq!(complete.created_at, pending.created_at);
    assert_eq!(
        complete.result.as_ref().map(|r| r.code),
        Some(OutcomeCode::Ok)
    );
    assert!(complete.created_at <= complete.updated_at);
}

#[tokio::test]
async fn resubmission_preserves_creation_time() {
    let store: Arc<dyn StatusStore> = Arc::new(InMemoryStatusStore::new());
    let api = Arc::new(
        StaticFileStore::default().with_file("f1", "accounts.xhtml", AvStatus::Clean, "<html/>"),
    );

    let orchestrator = orchestrator(store.clone(), api, Arc::new(DummyValidator));

    orchestrator.submit("f1").await.unwrap().unwrap();
    let first = wait_for_terminal(&store, "f1").await;
    assert_eq!(first.status, StatusKind::Complete);

    let resubmitted = orchestrator.submit("f1").await.unwrap().unwrap();
    assert_eq!(resubmitted.status, StatusKind::Pending);
    assert_eq!(resubmitted.created_at, first.created_at);
    assert!(resubmitted.updated_at >= first.updated_at);

    // Still exactly one record for the id
    let current = store.find_by_id("f1").await.unwrap().unwrap();
    assert_eq!(current.created_at, first.created_at);
}

#[tokio::test]
async fn validator_fault_is_recorded_as_error_status() {
    let store: Arc<dyn StatusStore> = Arc::new(InMemoryStatusStore::new());
    let api = Arc::new(
        StaticFileStore::default().with_file("f1", "accounts.xhtml", AvStatus::Clean, "<html/>"),
    );

    let orchestrator = orchestrator(store.clone(), api, Arc::new(FaultyValidator));
    orchestrator.submit("f1").await.unwrap().unwrap();

    let terminal = wait_for_terminal(&store, "f1").await;
    assert_eq!(terminal.status, StatusKind::Error);
    assert!(terminal.file_name.is_empty());
    assert!(terminal.result.is_none());
}

#[tokio::test]
async fn infected_file_fails_submission() {
    let store: Arc<dyn StatusStore> = Arc::new(InMemoryStatusStore::new());
    let api = Arc::new(StaticFileStore::default().with_file(
        "f1",
        "accounts.xhtml",
        AvStatus::Infected,
        "<html/>",
    ));

    let orchestrator = orchestrator(store.clone(), api, Arc::new(DummyValidator));
    let err = orchestrator.submit("f1").await.unwrap_err();

    assert!(matches!(err, AppError::Infected(_)));
    assert!(store.find_by_id("f1").await.unwrap().is_none());
}

#[tokio::test]
async fn callback_submit_persists_pending_then_dispatches() {
    let store: Arc<dyn StatusStore> = Arc::new(InMemoryStatusStore::new());
    let api = Arc::new(
        StaticFileStore::default().with_file("f1", "accounts.xhtml", AvStatus::Clean, "<html/>"),
    );
    let starter = Arc::new(RecordingStarter::default());

    let orchestrator = ValidationOrchestrator::new(
        store.clone(),
        retriever(api),
        ValidationStrategy::Callback(starter.clone()),
    );
    let pending = orchestrator.submit("f1").await.unwrap().unwrap();

    assert_eq!(pending.status, StatusKind::Pending);
    assert_eq!(*starter.started.lock().unwrap(), vec!["f1"]);

    // No background worker in callback mode: the record stays PENDING until
    // the validator reports back
    tokio::time::sleep(Duration::from_millis(50)).await;
    let current = store.find_by_id("f1").await.unwrap().unwrap();
    assert_eq!(current.status, StatusKind::Pending);
}

#[tokio::test]
async fn callback_dispatch_failure_propagates_and_keeps_the_pending_record() {
    let store: Arc<dyn StatusStore> = Arc::new(InMemoryStatusStore::new());
    let api = Arc::new(
        StaticFileStore::default().with_file("f1", "accounts.xhtml", AvStatus::Clean, "<html/>"),
    );
    let starter = Arc::new(RecordingStarter {
        refuse: true,
        ..Default::default()
    });

    let orchestrator = ValidationOrchestrator::new(
        store.clone(),
        retriever(api),
        ValidationStrategy::Callback(starter),
    );
    let err = orchestrator.submit("f1").await.unwrap_err();
    assert!(matches!(err, AppError::External(_)));

    // PENDING was written before the dispatch attempt and survives it
    let current = store.find_by_id("f1").await.unwrap().unwrap();
    assert_eq!(current.status, StatusKind::Pending);
}

#[tokio::test]
async fn shutdown_stops_the_inline_worker() {
    let store: Arc<dyn StatusStore> = Arc::new(InMemoryStatusStore::new());
    let api = Arc::new(
        StaticFileStore::default().with_file("f1", "accounts.xhtml", AvStatus::Clean, "<html/>"),
    );

    let orchestrator = orchestrator(store.clone(), api, Arc::new(DummyValidator));
    orchestrator.shutdown().await;
    tokio::time::sleep(Duration::from_millis(50)).await;

    // The worker is gone, so inline submission cannot enqueue
    let err = orchestrator.submit("f1").await.unwrap_err();
    assert!(matches!(err, AppError::Internal(_)));
}

#[tokio::test]
async fn save_results_applies_the_callback_outcome() {
    let store: Arc<dyn StatusStore> = Arc::new(InMemoryStatusStore::new());
    let api = Arc::new(
        StaticFileStore::default().with_file("f1", "accounts.xhtml", AvStatus::Clean, "<html/>"),
    );

    let orchestrator = orchestrator(store.clone(), api, Arc::new(DummyValidator));
    let pending = orchestrator.submit("f1").await.unwrap().unwrap();

    let outcome =
        ValidationOutcome::with_errors(OutcomeCode::Failed, vec!["bad period end".to_string()]);
    let updated = orchestrator
        .save_results("f1", outcome.clone())
        .await
        .unwrap();

    assert_eq!(updated.status, StatusKind::Complete);
    assert_eq!(updated.file_name, "accounts.xhtml");
    assert_eq!(updated.result, Some(outcome));
    assert_eq!(updated.created_at, pending.created_at);
}
