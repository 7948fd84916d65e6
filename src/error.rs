use thiserror::Error;

/// Failure classes for calls that cross a service boundary (GitHub,
/// embedding provider, vector store).
///
/// During bulk indexing, per-file failures are recovered and logged; for
/// single-item operations (a user-triggered re-index, one retrieval query)
/// they propagate to the caller.
#[derive(Debug, Error)]
pub enum UpstreamError {
    /// The requested file, repo, or user does not exist upstream.
    #[error("not found: {0}")]
    NotFound(String),

    /// Rate limit or network-level failure; safe to retry later.
    #[error("transient upstream failure: {0}")]
    Transient(String),

    /// The embedding provider returned a vector of the wrong size.
    /// Always fatal: it means the model or configuration drifted.
    #[error("embedding dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },
}

impl UpstreamError {
    /// Classify an HTTP status from an upstream API.
    pub fn from_status(status: reqwest::StatusCode, what: &str) -> Self {
        if status == reqwest::StatusCode::NOT_FOUND {
            UpstreamError::NotFound(what.to_string())
        } else {
            UpstreamError::Transient(format!("{what} returned {status}"))
        }
    }
}
