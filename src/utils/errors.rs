//! Custom error types for the backup uploader.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum UploadError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Discovery error: {0}")]
    Discovery(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{op} failed with status {status}: {body}")]
    Api {
        op: &'static str,
        status: u16,
        body: String,
    },

    #[error("Cleanup incomplete: {failed} of {attempted} deletions failed")]
    PartialCleanup { failed: usize, attempted: usize },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl UploadError {
    /// Whether the error is transient and worth another attempt.
    ///
    /// Transport failures and throttling/server-side statuses (408, 429, 5xx)
    /// are retryable; everything else is permanent.
    pub fn is_retryable(&self) -> bool {
        match self {
            UploadError::Http(e) => !e.is_builder() && !e.is_redirect(),
            UploadError::Api { status, .. } => {
                *status == 408 || *status == 429 || *status >= 500
            }
            UploadError::Io(e) => matches!(
                e.kind(),
                std::io::ErrorKind::ConnectionReset
                    | std::io::ErrorKind::ConnectionAborted
                    | std::io::ErrorKind::BrokenPipe
                    | std::io::ErrorKind::UnexpectedEof
                    | std::io::ErrorKind::TimedOut
                    | std::io::ErrorKind::Interrupted
            ),
            _ => false,
        }
    }
}

pub type Result<T> = std::result::Result<T, UploadError>;
