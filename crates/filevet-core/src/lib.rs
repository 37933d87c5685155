//! Filevet Core Library
//!
//! This crate provides the domain models, error types, configuration, and the
//! retry primitive shared across all filevet components.

pub mod config;
pub mod error;
pub mod models;
pub mod retry;

// Re-export commonly used types
pub use config::{Config, StoreBackend, ValidatorMode};
pub use error::AppError;
pub use retry::{AttemptFailure, RetryError, RetryPolicy};
