//! Vector store capability: store embeddings with metadata, answer
//! nearest-neighbor queries, list ids by prefix, delete in bulk.
//!
//! Two implementations: [`memory::LocalVectorIndex`], an in-process store
//! with JSON persistence used by default and in tests, and
//! [`pinecone::PineconeIndex`], a client for the Pinecone data plane.

use serde::{Deserialize, Serialize};

use crate::error::UpstreamError;

pub mod memory;
pub mod pinecone;

/// One embedded file, persisted in the vector store
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VectorRecord {
    pub id: String,
    pub values: Vec<f32>,
    pub metadata: VectorMetadata,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VectorMetadata {
    pub repo_id: String,
    pub path: String,
    /// Truncated file text, served back as retrieval context
    pub content: String,
}

/// A ranked query result
#[derive(Debug, Clone)]
pub struct VectorMatch {
    pub id: String,
    pub score: f32,
    pub metadata: Option<VectorMetadata>,
}

/// One page of a prefix-scoped id listing
#[derive(Debug, Clone)]
pub struct IdPage {
    pub ids: Vec<String>,
    pub next_token: Option<String>,
}

/// Deterministic vector id: repo id plus the path with every '/' replaced
/// by '_'. Known limitation: two paths that differ only in '/' vs a
/// literal '_' in a segment (e.g. `a/b` and `a_b`) map to the same id.
pub fn make_vector_id(repo_id: &str, path: &str) -> String {
    format!("{repo_id}-{}", path.replace('/', "_"))
}

/// Prefix under which every vector of a repository lives.
pub fn repo_prefix(repo_id: &str) -> String {
    format!("{repo_id}-")
}

#[async_trait::async_trait]
pub trait VectorIndex: Send + Sync {
    /// Insert or replace records by id.
    async fn upsert(&self, records: Vec<VectorRecord>) -> Result<(), UpstreamError>;

    /// Top-k nearest neighbors, scoped to one repository.
    async fn query(
        &self,
        vector: &[f32],
        top_k: usize,
        repo_id: &str,
    ) -> Result<Vec<VectorMatch>, UpstreamError>;

    /// One page of ids matching `prefix`; pass the returned token back
    /// until it comes out `None`.
    async fn list_ids(
        &self,
        prefix: &str,
        pagination_token: Option<String>,
    ) -> Result<IdPage, UpstreamError>;

    /// Delete records by id. Unknown ids are ignored.
    async fn delete_many(&self, ids: &[String]) -> Result<(), UpstreamError>;
}
