//! In-process vector index with JSON persistence and cosine similarity.
//!
//! Default backend when no Pinecone host is configured; also the test
//! double for the pipeline. Upsert replaces by id, so re-indexing an
//! unchanged file set never duplicates records.

use parking_lot::RwLock;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::error::UpstreamError;
use crate::vector::{IdPage, VectorIndex, VectorMatch, VectorRecord};

/// Ids returned per `list_ids` page. Deliberately small so callers must
/// exercise the pagination-token loop.
const LIST_PAGE_SIZE: usize = 100;

pub struct LocalVectorIndex {
    /// BTreeMap keeps ids ordered, which makes prefix pagination stable
    records: RwLock<BTreeMap<String, VectorRecord>>,
    persist_path: Option<PathBuf>,
}

impl LocalVectorIndex {
    /// Purely in-memory index (tests).
    pub fn in_memory() -> Self {
        Self {
            records: RwLock::new(BTreeMap::new()),
            persist_path: None,
        }
    }

    pub fn open_or_create(dir: &Path) -> Result<Self> {
        std::fs::create_dir_all(dir)?;
        let persist_path = dir.join("vectors.json");

        let records = if persist_path.exists() {
            let data = std::fs::read_to_string(&persist_path)
                .context("Failed to read vector index")?;
            let list: Vec<VectorRecord> = serde_json::from_str(&data).unwrap_or_default();
            list.into_iter().map(|r| (r.id.clone(), r)).collect()
        } else {
            BTreeMap::new()
        };

        Ok(Self {
            records: RwLock::new(records),
            persist_path: Some(persist_path),
        })
    }

    pub fn record_count(&self) -> usize {
        self.records.read().len()
    }

    fn persist(&self, records: &BTreeMap<String, VectorRecord>) -> Result<(), UpstreamError> {
        let Some(path) = &self.persist_path else {
            return Ok(());
        };
        let list: Vec<&VectorRecord> = records.values().collect();
        let data = serde_json::to_string(&list)
            .map_err(|e| UpstreamError::Transient(format!("serialize vector index: {e}")))?;
        let tmp_path = path.with_extension("json.tmp");
        std::fs::write(&tmp_path, data)
            .map_err(|e| UpstreamError::Transient(format!("write vector index: {e}")))?;
        std::fs::rename(&tmp_path, path)
            .map_err(|e| UpstreamError::Transient(format!("replace vector index: {e}")))?;
        Ok(())
    }
}

#[async_trait::async_trait]
impl VectorIndex for LocalVectorIndex {
    async fn upsert(&self, new_records: Vec<VectorRecord>) -> Result<(), UpstreamError> {
        let mut records = self.records.write();
        for record in new_records {
            records.insert(record.id.clone(), record);
        }
        self.persist(&records)
    }

    async fn query(
        &self,
        vector: &[f32],
        top_k: usize,
        repo_id: &str,
    ) -> Result<Vec<VectorMatch>, UpstreamError> {
        let records = self.records.read();

        let mut scored: Vec<(f32, &VectorRecord)> = records
            .values()
            .filter(|r| r.metadata.repo_id == repo_id)
            .map(|r| (cosine_similarity(vector, &r.values), r))
            .collect();

        scored.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(std::cmp::Ordering::Equal));
        scored.truncate(top_k);

        Ok(scored
            .into_iter()
            .map(|(score, r)| VectorMatch {
                id: r.id.clone(),
                score,
                metadata: Some(r.metadata.clone()),
            })
            .collect())
    }

    async fn list_ids(
        &self,
        prefix: &str,
        pagination_token: Option<String>,
    ) -> Result<IdPage, UpstreamError> {
        let records = self.records.read();
        let offset: usize = match pagination_token {
            Some(token) => token
                .parse()
                .map_err(|_| UpstreamError::Transient(format!("bad pagination token: {token}")))?,
            None => 0,
        };

        let all: Vec<&String> = records
            .keys()
            .filter(|id| id.starts_with(prefix))
            .collect();

        let page: Vec<String> = all
            .iter()
            .skip(offset)
            .take(LIST_PAGE_SIZE)
            .map(|id| (*id).clone())
            .collect();

        let next = offset + page.len();
        let next_token = if next < all.len() {
            Some(next.to_string())
        } else {
            None
        };

        Ok(IdPage {
            ids: page,
            next_token,
        })
    }

    async fn delete_many(&self, ids: &[String]) -> Result<(), UpstreamError> {
        let mut records = self.records.write();
        for id in ids {
            records.remove(id);
        }
        self.persist(&records)
    }
}

fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let mut dot = 0.0f32;
    let mut norm_a = 0.0f32;
    let mut norm_b = 0.0f32;

    for i in 0..a.len() {
        dot += a[i] * b[i];
        norm_a += a[i] * a[i];
        norm_b += b[i] * b[i];
    }

    let denom = norm_a.sqrt() * norm_b.sqrt();
    if denom == 0.0 {
        0.0
    } else {
        dot / denom
    }
}
