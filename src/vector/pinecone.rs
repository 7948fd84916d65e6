//! Pinecone data-plane client.
//!
//! Speaks the serverless index REST routes: `/vectors/upsert`, `/query`,
//! `/vectors/list`, `/vectors/delete`. Queries are scoped to a repository
//! with a metadata filter so cross-repository content never leaks.

use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::error::UpstreamError;
use crate::vector::{IdPage, VectorIndex, VectorMatch, VectorMetadata, VectorRecord};

pub struct PineconeIndex {
    http: reqwest::Client,
    host: String,
    api_key: String,
}

impl PineconeIndex {
    pub fn new(http: reqwest::Client, host: &str, api_key: &str) -> Self {
        Self {
            http,
            host: host.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
        }
    }

    fn post(&self, path: &str) -> reqwest::RequestBuilder {
        self.http
            .post(format!("{}{path}", self.host))
            .header("Api-Key", &self.api_key)
    }

    async fn check(resp: reqwest::Response, what: &str) -> Result<reqwest::Response, UpstreamError> {
        let status = resp.status();
        if !status.is_success() {
            return Err(UpstreamError::from_status(status, what));
        }
        Ok(resp)
    }
}

#[derive(Serialize)]
struct UpsertRequest {
    vectors: Vec<VectorRecord>,
}

#[derive(Deserialize)]
struct QueryResponse {
    #[serde(default)]
    matches: Vec<QueryMatch>,
}

#[derive(Deserialize)]
struct QueryMatch {
    id: String,
    score: f32,
    metadata: Option<VectorMetadata>,
}

#[derive(Deserialize)]
struct ListResponse {
    #[serde(default)]
    vectors: Vec<ListedVector>,
    pagination: Option<Pagination>,
}

#[derive(Deserialize)]
struct ListedVector {
    id: String,
}

#[derive(Deserialize)]
struct Pagination {
    next: Option<String>,
}

#[async_trait::async_trait]
impl VectorIndex for PineconeIndex {
    async fn upsert(&self, records: Vec<VectorRecord>) -> Result<(), UpstreamError> {
        let resp = self
            .post("/vectors/upsert")
            .json(&UpsertRequest { vectors: records })
            .send()
            .await
            .map_err(|e| UpstreamError::Transient(format!("Pinecone upsert: {e}")))?;
        Self::check(resp, "Pinecone upsert").await?;
        Ok(())
    }

    async fn query(
        &self,
        vector: &[f32],
        top_k: usize,
        repo_id: &str,
    ) -> Result<Vec<VectorMatch>, UpstreamError> {
        let body = json!({
            "vector": vector,
            "topK": top_k,
            "includeMetadata": true,
            "filter": { "repoId": { "$eq": repo_id } },
        });

        let resp = self
            .post("/query")
            .json(&body)
            .send()
            .await
            .map_err(|e| UpstreamError::Transient(format!("Pinecone query: {e}")))?;
        let resp = Self::check(resp, "Pinecone query").await?;

        let body: QueryResponse = resp
            .json()
            .await
            .map_err(|e| UpstreamError::Transient(format!("decode Pinecone query: {e}")))?;

        Ok(body
            .matches
            .into_iter()
            .map(|m| VectorMatch {
                id: m.id,
                score: m.score,
                metadata: m.metadata,
            })
            .collect())
    }

    async fn list_ids(
        &self,
        prefix: &str,
        pagination_token: Option<String>,
    ) -> Result<IdPage, UpstreamError> {
        let mut url = format!("{}/vectors/list?prefix={prefix}", self.host);
        if let Some(token) = &pagination_token {
            url.push_str(&format!("&paginationToken={token}"));
        }

        let resp = self
            .http
            .get(url)
            .header("Api-Key", &self.api_key)
            .send()
            .await
            .map_err(|e| UpstreamError::Transient(format!("Pinecone list: {e}")))?;
        let resp = Self::check(resp, "Pinecone list").await?;

        let body: ListResponse = resp
            .json()
            .await
            .map_err(|e| UpstreamError::Transient(format!("decode Pinecone list: {e}")))?;

        Ok(IdPage {
            ids: body.vectors.into_iter().map(|v| v.id).collect(),
            next_token: body.pagination.and_then(|p| p.next),
        })
    }

    async fn delete_many(&self, ids: &[String]) -> Result<(), UpstreamError> {
        let resp = self
            .post("/vectors/delete")
            .json(&json!({ "ids": ids }))
            .send()
            .await
            .map_err(|e| UpstreamError::Transient(format!("Pinecone delete: {e}")))?;
        Self::check(resp, "Pinecone delete").await?;
        Ok(())
    }
}
