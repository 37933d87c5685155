//! Domain models shared across filevet components.

pub mod file;
pub mod outcome;
pub mod status;

pub use file::{AvStatus, File, FileMetadata};
pub use outcome::{AccountsData, OutcomeCode, ValidationOutcome};
pub use status::{RequestStatus, StatusKind};
