use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use uuid::Uuid;

use crate::api::projects::lookup_repo;
use crate::api::upstream_status;
use crate::models::{HealthScore, ImpactScoreResult};
use crate::score::health::compute_health_score;
use crate::score::impact::calculate_impact_score;
use crate::state::AppState;

/// POST /api/projects/:id/health - Fetch fresh signals, recompute the
/// health score, and persist it (pushing the prior total onto the history).
pub async fn recompute_health(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<HealthScore>, (StatusCode, String)> {
    let (owner, repo) = lookup_repo(&state, id)?;

    let signals = state
        .github
        .health_signals(&owner, &repo)
        .await
        .map_err(|e| (upstream_status(&e), format!("{e}")))?;

    let previous = {
        let projects = state.projects.read();
        projects
            .iter()
            .find(|p| p.id == id)
            .and_then(|p| p.health_score.clone())
    };

    let score = compute_health_score(&signals, previous.as_ref(), Utc::now());

    {
        let mut projects = state.projects.write();
        if let Some(project) = projects.iter_mut().find(|p| p.id == id) {
            project.health_score = Some(score.clone());
        }
        drop(projects);
        state.persist_projects();
    }

    Ok(Json(score))
}

/// GET /api/impact/:username - Contributor impact score from fresh
/// GitHub activity totals.
pub async fn impact(
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> Result<Json<ImpactScoreResult>, (StatusCode, String)> {
    let stats = state
        .github
        .contributor_stats(&username)
        .await
        .map_err(|e| (upstream_status(&e), format!("{e}")))?;

    Ok(Json(calculate_impact_score(&stats)))
}
