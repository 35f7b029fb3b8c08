//! Error types for data validation in goodair-types.

use thiserror::Error;

/// Errors that can occur when validating air-quality data.
///
/// This error type is platform-agnostic and does not include
/// HTTP-specific errors (those belong in goodair-core).
///
/// This enum is marked `#[non_exhaustive]` to allow adding new error variants
/// in future versions without breaking downstream code.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ParseError {
    /// A field value is outside its valid range.
    #[error("Invalid value: {0}")]
    InvalidValue(String),
}

/// Result type alias using goodair-types' ParseError type.
pub type ParseResult<T> = std::result::Result<T, ParseError>;
