//! Embedding client: text in, fixed-length vector out.
//!
//! The HTTP implementation speaks the Ollama and OpenAI-compatible
//! embedding APIs. The vector dimension is fixed by configuration and
//! enforced on every response; a mismatch means the model or config
//! drifted and is always fatal. No retries at this layer.

use serde::{Deserialize, Serialize};

use crate::config::EmbeddingConfig;
use crate::error::UpstreamError;

/// Embedding capability seam. Indexing and retrieval take this trait so
/// tests can inject a deterministic embedder.
#[async_trait::async_trait]
pub trait Embedder: Send + Sync {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, UpstreamError>;

    /// Model-defined output dimension.
    fn dimension(&self) -> usize;
}

pub struct HttpEmbedder {
    client: reqwest::Client,
    config: EmbeddingConfig,
}

impl HttpEmbedder {
    pub fn new(client: reqwest::Client, config: EmbeddingConfig) -> Self {
        Self { client, config }
    }

    async fn embed_ollama(&self, text: &str) -> Result<Vec<f32>, UpstreamError> {
        let url = format!("{}/api/embed", self.config.base_url);
        let req = OllamaEmbedRequest {
            model: self.config.model.clone(),
            input: vec![text.to_string()],
            truncate: true,
        };

        let resp = self
            .client
            .post(&url)
            .json(&req)
            .send()
            .await
            .map_err(|e| UpstreamError::Transient(format!("Ollama embed call failed: {e}")))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(UpstreamError::Transient(format!(
                "Ollama embed API returned {status}: {body}"
            )));
        }

        let body: OllamaEmbedResponse = resp
            .json()
            .await
            .map_err(|e| UpstreamError::Transient(format!("Bad Ollama embed response: {e}")))?;

        body.embeddings
            .into_iter()
            .next()
            .ok_or_else(|| UpstreamError::Transient("No embedding returned".to_string()))
    }

    async fn embed_openai(&self, text: &str) -> Result<Vec<f32>, UpstreamError> {
        let url = format!("{}/v1/embeddings", self.config.base_url);
        let api_key = self.config.api_key.as_deref().unwrap_or_default();
        let req = OpenAiEmbedRequest {
            model: self.config.model.clone(),
            input: vec![text.to_string()],
        };

        let resp = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {api_key}"))
            .json(&req)
            .send()
            .await
            .map_err(|e| UpstreamError::Transient(format!("OpenAI embed call failed: {e}")))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(UpstreamError::Transient(format!(
                "OpenAI embed API returned {status}: {body}"
            )));
        }

        let body: OpenAiEmbedResponse = resp
            .json()
            .await
            .map_err(|e| UpstreamError::Transient(format!("Bad OpenAI embed response: {e}")))?;

        body.data
            .into_iter()
            .next()
            .map(|d| d.embedding)
            .ok_or_else(|| UpstreamError::Transient("No embedding returned".to_string()))
    }
}

#[async_trait::async_trait]
impl Embedder for HttpEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, UpstreamError> {
        let vector = match self.config.provider.as_str() {
            "ollama" => self.embed_ollama(text).await?,
            "openai" => self.embed_openai(text).await?,
            other => {
                return Err(UpstreamError::Transient(format!(
                    "Unknown embedding provider: {other}"
                )))
            }
        };

        if vector.len() != self.config.dimension {
            return Err(UpstreamError::DimensionMismatch {
                expected: self.config.dimension,
                actual: vector.len(),
            });
        }

        Ok(vector)
    }

    fn dimension(&self) -> usize {
        self.config.dimension
    }
}

// ─── Ollama ──────────────────────────────────────────────

#[derive(Serialize)]
struct OllamaEmbedRequest {
    model: String,
    input: Vec<String>,
    /// Ask Ollama to silently truncate inputs that exceed the model's
    /// context length instead of returning a 400 error.
    truncate: bool,
}

#[derive(Deserialize)]
struct OllamaEmbedResponse {
    embeddings: Vec<Vec<f32>>,
}

// ─── OpenAI-compatible ───────────────────────────────────

#[derive(Serialize)]
struct OpenAiEmbedRequest {
    model: String,
    input: Vec<String>,
}

#[derive(Deserialize)]
struct OpenAiEmbedResponse {
    data: Vec<OpenAiEmbedData>,
}

#[derive(Deserialize)]
struct OpenAiEmbedData {
    embedding: Vec<f32>,
}
