//! Transport-boundary failures.

use hostmon_core::ErrorKind;

/// A request was rejected before it reached the dispatcher.
#[derive(Debug, thiserror::Error)]
pub enum FramingError {
    #[error("Invalid JSON")]
    InvalidJson(#[from] serde_json::Error),
    #[error("Invalid UTF-8")]
    InvalidUtf8(#[from] std::str::Utf8Error),
    #[error("Method not allowed")]
    MethodNotAllowed,
    #[error("Failed to read request body")]
    UnreadableBody(#[source] axum::Error),
    #[error("stdio transport failed: {0}")]
    Io(#[from] std::io::Error),
}

impl FramingError {
    pub fn kind(&self) -> ErrorKind {
        ErrorKind::InvalidRequestFraming
    }
}
