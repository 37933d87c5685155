//! Filevet Status Store
//!
//! This crate provides the status-store abstraction and its implementations:
//! a PostgreSQL repository for deployments and an in-memory map for local
//! runs and tests. Both sit behind the [`StatusStore`] trait so the service
//! layer never couples to a backend.

pub mod factory;
pub mod memory;
pub mod postgres;
pub mod traits;

// Re-export commonly used types
pub use factory::create_status_store;
pub use memory::InMemoryStatusStore;
pub use postgres::PgStatusStore;
pub use traits::StatusStore;
