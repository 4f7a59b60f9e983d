//! Structured error types for cache and retrieval operations.
//!
//! These are designed to be displayable in both library and CLI contexts.

use thiserror::Error;

/// Errors produced by the cache resolver, codecs, and retrieval functions.
#[derive(Debug, Error)]
pub enum DataError {
    /// The requested name has no registered retrieval function. Checked
    /// before any network or filesystem I/O.
    #[error(
        "the dataset name that you gave ({name}) is not on your computer \
         and cannot be retrieved by this library. Are you sure you typed \
         it correctly?"
    )]
    UnknownDataset { name: String },

    #[error("network unreachable: {0}")]
    Transport(String),

    #[error("HTTP {status} while fetching {url}")]
    HttpStatus { status: u16, url: String },

    #[error("codec error: {0}")]
    Codec(String),

    #[error("cache error: {0}")]
    Cache(String),

    #[error("metadata store error: {0}")]
    Metadata(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("column '{column}' is not present in the table")]
    MissingColumn { column: String },
}
