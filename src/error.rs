//! Error types for FeedStore
//!
//! Provides a unified error type for all storage-facing operations.

use thiserror::Error;

/// Result type alias using FeedStoreError
pub type Result<T> = std::result::Result<T, FeedStoreError>;

/// Unified error type for FeedStore operations
#[derive(Debug, Error)]
pub enum FeedStoreError {
    // -------------------------------------------------------------------------
    // I/O Errors
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // -------------------------------------------------------------------------
    // Journal Errors
    // -------------------------------------------------------------------------
    #[error("Journal corruption detected: {0}")]
    JournalCorruption(String),

    // -------------------------------------------------------------------------
    // Storage Errors
    // -------------------------------------------------------------------------
    #[error("Storage error: {0}")]
    Storage(String),

    // -------------------------------------------------------------------------
    // Serialization Errors
    // -------------------------------------------------------------------------
    #[error("Serialization error: {0}")]
    Serialization(String),

    // -------------------------------------------------------------------------
    // Configuration Errors
    // -------------------------------------------------------------------------
    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<bincode::Error> for FeedStoreError {
    fn from(err: bincode::Error) -> Self {
        FeedStoreError::Serialization(err.to_string())
    }
}
