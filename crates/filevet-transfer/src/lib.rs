//! Filevet File Transfer
//!
//! Client for the remote file store and the antivirus-aware retriever built
//! on top of it. The file store scans uploads out-of-band, so content is only
//! downloadable once the reported scan state is `clean`; [`FileRetriever`]
//! polls metadata through the retry primitive until that happens.

pub mod client;
pub mod error;
pub mod retriever;

// Re-export commonly used types
pub use client::{FileStoreApi, HttpFileStore};
pub use error::TransferError;
pub use retriever::FileRetriever;
