//! Error types for sift
//!
//! This module defines all error types used throughout the system.
//! We use `thiserror` for automatic `Display` and `Error` trait implementations.
//!
//! Only indexing problems ever reach a caller, and even those arrive as a
//! warning list (`IndexReport`) rather than an `Err`. The remaining variants
//! are produced internally and recovered at the search boundary.

use std::io;
use thiserror::Error;

/// Result type alias for sift operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for the search core
#[derive(Debug, Error)]
pub enum Error {
    /// An item handed to the indexer could not be accepted
    #[error("Invalid item at position {position}: {reason}")]
    InvalidItem {
        /// Position of the item in the submitted batch
        position: usize,
        /// Why the item was rejected
        reason: String,
    },

    /// Configuration failed validation
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// I/O error (history files, etc.)
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// History persistence failed
    #[error("Persistence error: {0}")]
    Persistence(String),

    /// Unexpected failure inside the search pipeline
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}
