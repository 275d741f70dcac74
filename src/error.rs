//! Error types for bookledger
//!
//! Provides a unified error type for all operations.

use thiserror::Error;

/// Result type alias using LibraryError
pub type Result<T> = std::result::Result<T, LibraryError>;

/// Unified error type for bookledger operations
#[derive(Debug, Error)]
pub enum LibraryError {
    // -------------------------------------------------------------------------
    // I/O Errors
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // -------------------------------------------------------------------------
    // Catalog Errors
    // -------------------------------------------------------------------------
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("ISBN already exists: {0}")]
    DuplicateKey(String),

    #[error("Book not found: {0}")]
    NotFound(String),

    #[error("Insufficient stock for {isbn}: requested {requested}, available {available}")]
    InsufficientStock {
        isbn: String,
        requested: u32,
        available: u32,
    },

    #[error("Return exceeds loans for {isbn}: returning {requested}, on loan {loaned}")]
    OverReturn {
        isbn: String,
        requested: u32,
        loaned: u32,
    },

    // -------------------------------------------------------------------------
    // Persistence Errors
    // -------------------------------------------------------------------------
    #[error("Corrupt snapshot: {0}")]
    CorruptSnapshot(String),

    #[error("Corrupt ledger record: {0}")]
    CorruptRecord(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl LibraryError {
    /// Whether this error came from the filesystem rather than from the request
    pub fn is_io(&self) -> bool {
        matches!(self, LibraryError::Io(_))
    }
}
