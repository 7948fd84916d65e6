pub mod context;
pub mod projects;
pub mod scores;

use axum::http::StatusCode;

use crate::error::UpstreamError;

/// Map an upstream failure class onto an HTTP status for single-item
/// operations (bulk indexing handles its own per-file recovery).
pub(crate) fn upstream_status(err: &UpstreamError) -> StatusCode {
    match err {
        UpstreamError::NotFound(_) => StatusCode::NOT_FOUND,
        UpstreamError::Transient(_) => StatusCode::BAD_GATEWAY,
        UpstreamError::DimensionMismatch { .. } => StatusCode::INTERNAL_SERVER_ERROR,
    }
}
