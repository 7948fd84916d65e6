use axum::routing::{delete, get, post};
use axum::Router;
use tracing_subscriber::EnvFilter;

use repo_pulse::api;
use repo_pulse::config::Config;
use repo_pulse::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Config::from_env();
    tracing::info!("Data directory: {}", config.data_dir.display());
    tracing::info!(
        "Embedding provider: {} ({})",
        config.embedding.provider,
        config.embedding.base_url
    );

    let state = AppState::new(config.clone())?;

    let app = Router::new()
        .route("/api/projects", get(api::projects::list_projects))
        .route("/api/projects", post(api::projects::connect_project))
        .route("/api/projects/{id}", delete(api::projects::delete_project))
        .route(
            "/api/projects/{id}/reindex",
            post(api::projects::reindex_project),
        )
        .route(
            "/api/projects/{id}/readme",
            get(api::projects::project_readme),
        )
        .route(
            "/api/projects/{id}/languages",
            get(api::projects::project_languages),
        )
        .route(
            "/api/projects/{id}/health",
            post(api::scores::recompute_health),
        )
        .route("/api/impact/{username}", get(api::scores::impact))
        .route("/api/context", post(api::context::context))
        .with_state(state);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    tracing::info!("Server listening on {}", config.bind_addr);

    axum::serve(listener, app).await?;
    Ok(())
}
