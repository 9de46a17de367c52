//! Error types for filebay.

use thiserror::Error;

/// Common error type for filebay.
#[derive(Error, Debug)]
pub enum FileBayError {
    /// I/O error from the underlying file system.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Validation error for client input (ids, names, filters).
    #[error("validation error: {0}")]
    Validation(String),

    /// Entry not found.
    #[error("{0} not found")]
    NotFound(String),

    /// A staged upload exceeded the per-file size limit.
    #[error("file {name} exceeds the upload limit of {limit} bytes")]
    LimitExceeded {
        /// Declared file name.
        name: String,
        /// Limit in bytes.
        limit: u64,
    },

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

impl FileBayError {
    /// Map an I/O error, turning `NotFound` into the domain variant for `id`.
    pub fn from_io(err: std::io::Error, id: &str) -> Self {
        if err.kind() == std::io::ErrorKind::NotFound {
            FileBayError::NotFound(id.to_string())
        } else {
            FileBayError::Io(err)
        }
    }
}

/// Result type alias for filebay operations.
pub type Result<T> = std::result::Result<T, FileBayError>;
