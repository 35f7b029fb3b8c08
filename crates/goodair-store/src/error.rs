//! Error types for goodair-store.

use std::path::PathBuf;

/// Result type for goodair-store operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in goodair-store.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Database error from SQLite.
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// Failed to create database directory.
    #[error("Failed to create database directory {path}: {source}")]
    CreateDirectory {
        path: PathBuf,
        source: std::io::Error,
    },

    /// A settings value failed validation.
    #[error("Invalid setting: {0}")]
    Validation(String),

    /// CSV export failed.
    #[error("CSV export failed: {0}")]
    Csv(#[from] csv::Error),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
