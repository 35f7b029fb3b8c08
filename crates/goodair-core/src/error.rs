//! Error types for goodair-core.

use goodair_types::ParseError;
use thiserror::Error;

/// Errors from location resolution, data fetching, and metric derivation.
///
/// This enum is marked `#[non_exhaustive]` to allow adding new error variants
/// in future versions without breaking downstream code.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// No API key configured for a data source that requires one.
    #[error("No API key configured for {0}")]
    MissingApiKey(&'static str),

    /// The configured base URL is malformed.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// The HTTP request itself failed (DNS, connect, timeout, TLS).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The upstream rejected the request with 429.
    #[error("Rate limited by {url}")]
    RateLimited {
        /// URL that returned 429.
        url: String,
    },

    /// The upstream returned a non-success status.
    #[error("HTTP {status} from {url}: {message}")]
    Http {
        /// Response status code.
        status: u16,
        /// Request URL.
        url: String,
        /// Error message extracted from the response body, or the status text.
        message: String,
    },

    /// The upstream responded 2xx but the body is missing required fields.
    #[error("Invalid response from {service}: {message}")]
    InvalidResponse {
        /// Which data source produced the response.
        service: &'static str,
        /// What was wrong with it.
        message: String,
    },

    /// Speed inputs that cannot produce a meaningful density.
    #[error("Invalid speed input: {0}")]
    InvalidSpeed(String),

    /// No position could be obtained from the platform source.
    #[error("Position unavailable: {0}")]
    PositionUnavailable(String),

    /// A retried operation failed on every attempt.
    #[error("{operation} failed after {attempts} attempts")]
    RetriesExhausted {
        /// Name of the operation.
        operation: String,
        /// Total attempts made.
        attempts: u32,
    },

    /// A value failed domain validation.
    #[error(transparent)]
    Parse(#[from] ParseError),
}

/// Result type alias using goodair-core's Error type.
pub type Result<T> = std::result::Result<T, Error>;
