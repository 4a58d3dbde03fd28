//! Store error types.

use thiserror::Error;

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors that can occur while reading, writing, or versioning documents.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Content did not parse in the format its extension claims
    #[error("{0}")]
    Validation(String),

    /// Filename is empty or tries to escape the data directory
    #[error("Invalid filename: {0}")]
    InvalidFilename(String),

    /// IO error (file not found, permission denied, etc.)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Version control error
    #[error("Git error: {0}")]
    Git(#[from] git2::Error),

    /// Requested version or file does not exist in history
    #[error("Not found: {0}")]
    NotFound(String),
}

impl StoreError {
    /// Create a validation error with the parser's message.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Create an invalid filename error.
    pub fn invalid_filename(filename: impl Into<String>) -> Self {
        Self::InvalidFilename(filename.into())
    }

    /// Create a not found error.
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    /// True for errors the caller caused with bad input.
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::Validation(_) | Self::InvalidFilename(_))
    }
}
