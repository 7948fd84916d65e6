use parking_lot::RwLock;
use std::sync::Arc;

use crate::config::Config;
use crate::embed::{Embedder, HttpEmbedder};
use crate::github::GithubClient;
use crate::models::Project;
use crate::vector::memory::LocalVectorIndex;
use crate::vector::pinecone::PineconeIndex;
use crate::vector::VectorIndex;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub projects: Arc<RwLock<Vec<Project>>>,
    pub github: GithubClient,
    pub embedder: Arc<dyn Embedder>,
    pub vectors: Arc<dyn VectorIndex>,
    pub indexing_semaphore: Arc<tokio::sync::Semaphore>,
}

impl AppState {
    pub fn new(config: Config) -> anyhow::Result<Self> {
        std::fs::create_dir_all(&config.data_dir)?;

        // Load persisted project catalog
        let projects = if config.db_path().exists() {
            let data = std::fs::read_to_string(config.db_path())?;
            serde_json::from_str(&data).unwrap_or_default()
        } else {
            Vec::new()
        };

        let http_client = reqwest::Client::builder()
            .connect_timeout(std::time::Duration::from_secs(10))
            .timeout(std::time::Duration::from_secs(120))
            .build()?;

        let github = GithubClient::new(http_client.clone(), &config.github);
        let embedder: Arc<dyn Embedder> = Arc::new(HttpEmbedder::new(
            http_client.clone(),
            config.embedding.clone(),
        ));

        let vectors: Arc<dyn VectorIndex> = match (
            &config.vector.pinecone_host,
            &config.vector.pinecone_api_key,
        ) {
            (Some(host), Some(key)) => {
                tracing::info!("Vector backend: Pinecone ({host})");
                Arc::new(PineconeIndex::new(http_client, host, key))
            }
            _ => {
                tracing::info!(
                    "Vector backend: local index ({})",
                    config.vector_dir().display()
                );
                Arc::new(LocalVectorIndex::open_or_create(&config.vector_dir())?)
            }
        };

        let max_concurrent_indexing = config.max_concurrent_indexing;

        Ok(Self {
            config,
            projects: Arc::new(RwLock::new(projects)),
            github,
            embedder,
            vectors,
            indexing_semaphore: Arc::new(tokio::sync::Semaphore::new(max_concurrent_indexing)),
        })
    }

    /// Persist the project catalog to disk (atomic write via temp file + rename).
    pub fn persist_projects(&self) {
        let projects = self.projects.read();
        if let Ok(data) = serde_json::to_string_pretty(&*projects) {
            let db_path = self.config.db_path();
            let tmp_path = db_path.with_extension("json.tmp");
            if std::fs::write(&tmp_path, &data).is_ok() {
                let _ = std::fs::rename(&tmp_path, &db_path);
            }
        }
    }
}
