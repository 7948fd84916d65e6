use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;

use crate::api::upstream_status;
use crate::models::{ContextRequest, ContextResponse};
use crate::retrieve::retrieve_context;
use crate::state::AppState;

/// POST /api/context - Retrieve code snippets relevant to a query,
/// scoped to one project. A project with nothing indexed yields an
/// empty snippet list.
pub async fn context(
    State(state): State<AppState>,
    Json(req): Json<ContextRequest>,
) -> Result<Json<ContextResponse>, (StatusCode, String)> {
    let query = req.query.trim().to_string();
    if query.is_empty() {
        return Err((StatusCode::BAD_REQUEST, "Query is required".to_string()));
    }

    // Validate the project exists before touching the vector store
    crate::api::projects::lookup_repo(&state, req.project_id)?;

    let snippets = retrieve_context(
        &query,
        &req.project_id.to_string(),
        req.top_k,
        state.embedder.as_ref(),
        state.vectors.as_ref(),
    )
    .await
    .map_err(|e| (upstream_status(&e), format!("{e}")))?;

    Ok(Json(ContextResponse { query, snippets }))
}
