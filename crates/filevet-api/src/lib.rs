//! Filevet API
//!
//! Thin HTTP surface over the service layer: submit files for validation,
//! poll statuses, receive validator callbacks, render documents as PDF, and
//! trigger maintenance.

pub mod error;
pub mod handlers;
pub mod setup;
pub mod state;

pub use state::AppState;
