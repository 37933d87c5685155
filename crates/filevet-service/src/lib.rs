//! Filevet Service Layer
//!
//! This crate is the business service layer: it hosts the validation
//! orchestrator, the validator strategies, PDF rendering, and the retention
//! sweeper. Keep coordination logic here; keep thin HTTP handling in
//! filevet-api.

pub mod cleanup;
pub mod orchestrator;
pub mod render;
pub mod validator;

// Re-export commonly used types
pub use cleanup::{RetentionSweeper, SweepSummary};
pub use orchestrator::{ValidationOrchestrator, ValidationStrategy};
pub use render::RenderService;
pub use validator::{DummyValidator, ExternalValidatorClient, ValidationStarter, Validator};
