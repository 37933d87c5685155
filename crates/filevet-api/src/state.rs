//! Application state shared by all handlers.

use std::sync::Arc;

use tokio::task::JoinHandle;

use filevet_service::{RenderService, RetentionSweeper, ValidationOrchestrator};

pub struct AppState {
    pub orchestrator: Arc<ValidationOrchestrator>,
    pub render: Arc<RenderService>,
    pub sweeper: Arc<RetentionSweeper>,
    /// Periodic sweep task; aborted when the server shuts down.
    pub sweep_task: JoinHandle<()>,
}
