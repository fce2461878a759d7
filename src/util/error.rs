//! Error types for track scalar files.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for track scalar operations.
#[derive(Error, Debug)]
pub enum Error {
    /// File does not exist or cannot be accessed
    #[error("File not found: {0}")]
    FileNotFound(PathBuf),

    /// First header line is not a known track file magic
    #[error("Invalid track file: expected \"mrtrix tracks\" or \"mrtrix track scalars\" header")]
    InvalidMagic,

    /// Header block is malformed
    #[error("Invalid header: {0}")]
    InvalidHeader(String),

    /// Paired files were not generated from the same geometry
    #[error("Timestamp mismatch between {kind}: {left} vs {right}")]
    ProvenanceMismatch {
        kind: String,
        left: String,
        right: String,
    },

    /// Paired files declare a different number of streamlines
    #[error("Count mismatch between {kind}: {left} vs {right}")]
    CountMismatch {
        kind: String,
        left: u64,
        right: u64,
    },

    /// Properties carry no provenance timestamp
    #[error("Properties have no timestamp; copy it from the paired track file")]
    MissingTimestamp,

    /// Key is managed by the header codec and cannot be set directly
    #[error("Reserved header key: {0}")]
    ReservedKey(String),

    /// Commit left the stream in a bad state
    #[error("Write failed: {0}")]
    WriteFailed(String),

    /// Configuration value could not be parsed
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Writer was already closed
    #[error("Writer is closed")]
    Closed,

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic error with message
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create an "other" error from a string.
    pub fn other(msg: impl Into<String>) -> Self {
        Self::Other(msg.into())
    }

    /// Create an invalid header error.
    pub fn header(msg: impl Into<String>) -> Self {
        Self::InvalidHeader(msg.into())
    }

    /// Create a write failure, keeping the underlying cause in the message.
    pub fn write_failed(what: &str, err: std::io::Error) -> Self {
        Self::WriteFailed(format!("{what}: {err}"))
    }
}

/// Result type alias for track scalar operations.
pub type Result<T> = std::result::Result<T, Error>;
