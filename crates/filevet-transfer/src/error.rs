//! File transfer errors.

use filevet_core::{AppError, RetryError};

#[derive(Debug, thiserror::Error)]
pub enum TransferError {
    /// Connect failure, 5xx, or malformed error response. Retryable.
    #[error("File store request failed: {0}")]
    Transport(String),

    /// A 2xx response whose body did not have the expected shape. Fatal:
    /// retrying a contract bug does not help.
    #[error("Unexpected response from file store: {0}")]
    UnexpectedResponse(String),

    /// Scan found a virus. Fatal; content must never be served.
    #[error("File {0} is infected, refusing to serve content")]
    Infected(String),

    /// Scan has not finished yet. Retryable; state can change between polls.
    #[error("Antivirus scan still pending for file {0}")]
    ScanPending(String),

    /// The retry budget ran out before the condition cleared.
    #[error("File retrieval timed out after {attempts} attempts: {last}")]
    Timeout { attempts: u32, last: String },
}

impl From<RetryError<TransferError>> for TransferError {
    fn from(err: RetryError<TransferError>) -> Self {
        match err {
            RetryError::TimedOut { attempts, last, .. } => TransferError::Timeout {
                attempts,
                last: last.to_string(),
            },
            RetryError::Fatal(e) => e,
        }
    }
}

impl From<TransferError> for AppError {
    fn from(err: TransferError) -> Self {
        match err {
            TransferError::Infected(id) => AppError::Infected(id),
            TransferError::Timeout { .. } => AppError::Timeout(err.to_string()),
            TransferError::Transport(_)
            | TransferError::UnexpectedResponse(_)
            | TransferError::ScanPending(_) => AppError::External(err.to_string()),
        }
    }
}
