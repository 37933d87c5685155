//! Transient file values produced by the remote file store.

use bytes::Bytes;
use serde::{Deserialize, Serialize};

/// Antivirus scan state of a stored file, as reported by the remote file
/// store. Scanning happens out-of-band; `NotScanned` can flip to either of
/// the other states between metadata polls.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum AvStatus {
    Clean,
    Infected,
    NotScanned,
}

/// File descriptor without content. Drives the retrieval retry loop.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FileMetadata {
    pub id: String,
    pub name: String,
    pub size: u64,
    pub av_status: AvStatus,
    pub download_location: String,
}

/// Downloaded file content. Not persisted; produced by the retriever and
/// consumed immediately.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct File {
    pub id: String,
    pub name: String,
    pub data: Bytes,
}
