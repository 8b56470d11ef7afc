//! Error types shared by the ingestion pipeline, the stores and the routes.
//!
//! Each variant corresponds to one failure class callers need to tell apart:
//! upstream trouble (`Network`, `DataFormat`), bad input (`Validation`),
//! idempotency hits (`DuplicateReading`) and storage faults (`Database`).
//! The HTTP mapping lives in `routes::error`.

use crate::models::Source;

/// Result type for heatwatch operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in heatwatch.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The upstream weather feed could not be fetched (connect, timeout,
    /// non-success status, or a body that is not JSON).
    #[error("Failed to fetch BOM data: {0}")]
    Network(String),

    /// The upstream payload is JSON but lacks the expected structure.
    #[error("Invalid BOM data structure: {0}")]
    DataFormat(String),

    /// User supplied thresholds or an ingestion payload were rejected.
    #[error("{0}")]
    Validation(String),

    /// The store already holds a reading for this (timestamp, source) key.
    #[error("Reading already exists for {origin} at {timestamp}")]
    DuplicateReading { timestamp: String, origin: Source },

    /// No readings recorded yet for a source.
    #[error("No readings for source {0}")]
    NotFound(Source),

    /// Caller is not allowed to perform the operation.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Database error from sqlx.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl From<reqwest::Error> for Error {
    fn from(e: reqwest::Error) -> Self {
        // ---
        if e.is_decode() {
            Error::Network(format!("response body is not valid JSON: {e}"))
        } else if e.is_timeout() {
            Error::Network(format!("request timed out: {e}"))
        } else {
            Error::Network(e.to_string())
        }
    }
}
