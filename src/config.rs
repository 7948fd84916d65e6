use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Where the project catalog and the local vector index are stored
    pub data_dir: PathBuf,
    /// Server bind address
    pub bind_addr: String,
    /// Embedding provider configuration
    pub embedding: EmbeddingConfig,
    /// Vector store configuration
    pub vector: VectorConfig,
    /// GitHub API configuration
    pub github: GithubConfig,
    /// Maximum number of connected projects
    pub max_projects: usize,
    /// Maximum concurrent indexing jobs
    pub max_concurrent_indexing: usize,
    /// Concurrency cap for directory-tree traversal
    pub traversal_concurrency: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingConfig {
    /// "ollama" or "openai"
    pub provider: String,
    /// Base URL for the embedding API
    pub base_url: String,
    /// Embedding model name
    pub model: String,
    /// API key (only needed for cloud providers)
    pub api_key: Option<String>,
    /// Expected embedding vector dimension
    pub dimension: usize,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            provider: "ollama".to_string(),
            base_url: "http://localhost:11434".to_string(),
            model: "nomic-embed-text".to_string(),
            api_key: None,
            dimension: 768,
        }
    }
}

/// Vector store backend selection. With no Pinecone URL configured the
/// service falls back to the local on-disk index.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct VectorConfig {
    /// Pinecone index host URL (e.g. "https://my-index-abc123.svc.pinecone.io")
    pub pinecone_host: Option<String>,
    /// Pinecone API key
    pub pinecone_api_key: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GithubConfig {
    /// Base URL for the GitHub REST API
    pub base_url: String,
    /// Personal access token for private repos and higher rate limits
    pub token: Option<String>,
}

impl Default for GithubConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.github.com".to_string(),
            token: None,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("./data"),
            bind_addr: "127.0.0.1:9100".to_string(),
            embedding: EmbeddingConfig::default(),
            vector: VectorConfig::default(),
            github: GithubConfig::default(),
            max_projects: 50,
            max_concurrent_indexing: 2,
            traversal_concurrency: 8,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(dir) = std::env::var("REPO_PULSE_DATA_DIR") {
            config.data_dir = PathBuf::from(dir);
        }
        if let Ok(addr) = std::env::var("REPO_PULSE_BIND_ADDR") {
            config.bind_addr = addr;
        }
        if let Ok(provider) = std::env::var("EMBEDDING_PROVIDER") {
            config.embedding.provider = provider;
        }
        if let Ok(url) = std::env::var("EMBEDDING_BASE_URL") {
            config.embedding.base_url = url;
        }
        if let Ok(model) = std::env::var("EMBEDDING_MODEL") {
            config.embedding.model = model;
        }
        if let Ok(key) = std::env::var("EMBEDDING_API_KEY") {
            config.embedding.api_key = Some(key);
        }
        if let Ok(dim) = std::env::var("EMBEDDING_DIM") {
            if let Ok(d) = dim.parse() {
                config.embedding.dimension = d;
            }
        }
        if let Ok(host) = std::env::var("PINECONE_HOST") {
            config.vector.pinecone_host = Some(host);
        }
        if let Ok(key) = std::env::var("PINECONE_API_KEY") {
            config.vector.pinecone_api_key = Some(key);
        }
        if let Ok(url) = std::env::var("GITHUB_BASE_URL") {
            config.github.base_url = url;
        }
        if let Ok(token) = std::env::var("GITHUB_TOKEN") {
            config.github.token = Some(token);
        }
        if let Ok(val) = std::env::var("REPO_PULSE_MAX_PROJECTS") {
            if let Ok(v) = val.parse() {
                config.max_projects = v;
            }
        }
        if let Ok(val) = std::env::var("REPO_PULSE_MAX_CONCURRENT_INDEXING") {
            if let Ok(v) = val.parse() {
                config.max_concurrent_indexing = v;
            }
        }
        if let Ok(val) = std::env::var("REPO_PULSE_TRAVERSAL_CONCURRENCY") {
            if let Ok(v) = val.parse::<usize>() {
                config.traversal_concurrency = v.max(1);
            }
        }

        config
    }

    pub fn vector_dir(&self) -> PathBuf {
        self.data_dir.join("vectors")
    }

    pub fn db_path(&self) -> PathBuf {
        self.data_dir.join("projects.json")
    }
}
