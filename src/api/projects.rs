use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use uuid::Uuid;

use crate::api::upstream_status;
use crate::index::{delete_repo_vectors, index_codebase};
use crate::ingest::fetch::{collect_file_paths, fetch_contents_parallel};
use crate::models::{ConnectProjectRequest, LanguageShare, Project, ProjectStatus};
use crate::state::AppState;

/// GET /api/projects - List all connected projects
pub async fn list_projects(State(state): State<AppState>) -> Json<Vec<Project>> {
    let projects = state.projects.read();
    Json(projects.clone())
}

/// POST /api/projects - Connect a repository (ingest + index in background)
pub async fn connect_project(
    State(state): State<AppState>,
    Json(req): Json<ConnectProjectRequest>,
) -> Result<(StatusCode, Json<Project>), (StatusCode, String)> {
    let owner = req.owner.trim().to_string();
    let repo = req.repo.trim().to_string();
    if owner.is_empty() || repo.is_empty() {
        return Err((
            StatusCode::BAD_REQUEST,
            "Owner and repo are required".to_string(),
        ));
    }

    // Reject duplicates and enforce the project limit
    {
        let projects = state.projects.read();
        if projects
            .iter()
            .any(|p| p.owner == owner && p.repo == repo)
        {
            return Err((
                StatusCode::CONFLICT,
                "This repository is already connected".to_string(),
            ));
        }
        if projects.len() >= state.config.max_projects {
            return Err((
                StatusCode::BAD_REQUEST,
                format!(
                    "Maximum number of projects ({}) reached",
                    state.config.max_projects
                ),
            ));
        }
    }

    let project = Project {
        id: Uuid::new_v4(),
        owner,
        repo,
        status: ProjectStatus::Connected,
        connected_at: Utc::now(),
        indexed_at: None,
        indexed_file_count: 0,
        selected_file_count: 0,
        head_commit: None,
        health_score: None,
    };

    {
        let mut projects = state.projects.write();
        projects.push(project.clone());
        drop(projects);
        state.persist_projects();
    }

    // Spawn background task to walk, embed, and index the repository
    let project_id = project.id;
    let state_clone = state.clone();
    tokio::spawn(async move {
        let err_state = state_clone.clone();
        if let Err(e) = ingest_and_index(state_clone, project_id).await {
            tracing::error!("Indexing failed for project {project_id}: {e:#}");
            update_project_status(&err_state, project_id, ProjectStatus::Error(format!("{e:#}")));
        }
    });

    Ok((StatusCode::CREATED, Json(project)))
}

/// DELETE /api/projects/:id - Remove a project and its vectors
pub async fn delete_project(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, (StatusCode, String)> {
    let exists = {
        let projects = state.projects.read();
        projects.iter().any(|p| p.id == id)
    };
    if !exists {
        return Err((StatusCode::NOT_FOUND, "Project not found".to_string()));
    }

    if let Err(e) = delete_repo_vectors(&id.to_string(), state.vectors.as_ref()).await {
        tracing::warn!("Failed to delete vectors for {id}: {e}");
    }

    {
        let mut projects = state.projects.write();
        projects.retain(|p| p.id != id);
        drop(projects);
        state.persist_projects();
    }

    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/projects/:id/reindex - Delete stale vectors and re-ingest.
/// Skips the run when the default branch head is unchanged.
pub async fn reindex_project(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, (StatusCode, String)> {
    let (owner, repo, old_head) = {
        let projects = state.projects.read();
        let project = projects.iter().find(|p| p.id == id);
        match project {
            None => return Err((StatusCode::NOT_FOUND, "Project not found".to_string())),
            Some(p) if !matches!(p.status, ProjectStatus::Ready | ProjectStatus::Error(_)) => {
                return Err((
                    StatusCode::CONFLICT,
                    "Project is already being processed".to_string(),
                ));
            }
            Some(p) => (p.owner.clone(), p.repo.clone(), p.head_commit.clone()),
        }
    };

    let new_head = state
        .github
        .head_commit(&owner, &repo)
        .await
        .map_err(|e| (upstream_status(&e), format!("{e}")))?;

    if old_head.as_deref() == Some(new_head.as_str()) {
        tracing::info!("Reindex {owner}/{repo}: head unchanged ({new_head}), skipping");
        return Ok(StatusCode::NO_CONTENT);
    }

    update_project_status(&state, id, ProjectStatus::Indexing);

    let state_clone = state.clone();
    tokio::spawn(async move {
        let err_state = state_clone.clone();
        let run = async {
            // Clear stale vectors first so renamed/removed files leave no orphans
            delete_repo_vectors(&id.to_string(), state_clone.vectors.as_ref()).await?;
            ingest_and_index(state_clone, id).await
        };
        if let Err(e) = run.await {
            tracing::error!("Re-index failed for project {id}: {e:#}");
            update_project_status(&err_state, id, ProjectStatus::Error(format!("{e:#}")));
        }
    });

    Ok(StatusCode::ACCEPTED)
}

/// GET /api/projects/:id/readme - Raw README text, 404 when absent
pub async fn project_readme(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<String, (StatusCode, String)> {
    let (owner, repo) = lookup_repo(&state, id)?;
    let readme = state
        .github
        .readme(&owner, &repo)
        .await
        .map_err(|e| (upstream_status(&e), format!("{e}")))?;
    readme.ok_or((
        StatusCode::NOT_FOUND,
        "This repository has no README".to_string(),
    ))
}

/// GET /api/projects/:id/languages - Language byte shares from GitHub
pub async fn project_languages(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<LanguageShare>>, (StatusCode, String)> {
    let (owner, repo) = lookup_repo(&state, id)?;
    let shares = state
        .github
        .languages(&owner, &repo)
        .await
        .map_err(|e| (upstream_status(&e), format!("{e}")))?;
    Ok(Json(shares))
}

/// Walk the repository tree, fetch contents, embed, and upsert. The whole
/// pipeline runs under the indexing semaphore; the two phases (traversal,
/// then content fetch) are sequential, each internally parallel.
async fn ingest_and_index(state: AppState, project_id: Uuid) -> anyhow::Result<()> {
    let (owner, repo) = {
        let projects = state.projects.read();
        let project = projects
            .iter()
            .find(|p| p.id == project_id)
            .ok_or_else(|| anyhow::anyhow!("Project not found"))?;
        (project.owner.clone(), project.repo.clone())
    };

    let _permit = state
        .indexing_semaphore
        .acquire()
        .await
        .map_err(|_| anyhow::anyhow!("Indexing semaphore closed"))?;

    update_project_status(&state, project_id, ProjectStatus::Indexing);

    let paths = collect_file_paths(
        &state.github,
        &owner,
        &repo,
        "",
        state.config.traversal_concurrency,
    )
    .await?;
    tracing::info!("Selected {} files in {owner}/{repo}", paths.len());

    let files = fetch_contents_parallel(&state.github, &owner, &repo, &paths).await;
    tracing::info!("Fetched {} of {} files from {owner}/{repo}", files.len(), paths.len());

    let report = index_codebase(
        &project_id.to_string(),
        &files,
        state.embedder.as_ref(),
        state.vectors.as_ref(),
    )
    .await?;
    tracing::info!("Indexing {owner}/{repo}: {report}");

    let head_commit = match state.github.head_commit(&owner, &repo).await {
        Ok(sha) => Some(sha),
        Err(e) => {
            tracing::warn!("Could not read head commit for {owner}/{repo}: {e}");
            None
        }
    };

    {
        let mut projects = state.projects.write();
        if let Some(project) = projects.iter_mut().find(|p| p.id == project_id) {
            project.status = ProjectStatus::Ready;
            project.indexed_at = Some(Utc::now());
            project.indexed_file_count = report.indexed;
            project.selected_file_count = paths.len();
            project.head_commit = head_commit;
        }
        drop(projects);
        state.persist_projects();
    }

    tracing::info!("Project {owner}/{repo} is ready");
    Ok(())
}

pub(crate) fn lookup_repo(
    state: &AppState,
    id: Uuid,
) -> Result<(String, String), (StatusCode, String)> {
    let projects = state.projects.read();
    projects
        .iter()
        .find(|p| p.id == id)
        .map(|p| (p.owner.clone(), p.repo.clone()))
        .ok_or((StatusCode::NOT_FOUND, "Project not found".to_string()))
}

pub(crate) fn update_project_status(state: &AppState, project_id: Uuid, status: ProjectStatus) {
    let mut projects = state.projects.write();
    if let Some(project) = projects.iter_mut().find(|p| p.id == project_id) {
        project.status = status;
    }
    drop(projects);
    state.persist_projects();
}
