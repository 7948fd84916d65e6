//! Codebase indexer: turn fetched repository files into vector records.
//!
//! Each file is prefixed with a readable header, hard-truncated to the
//! embedding input cap, embedded, and upserted in sequential batches.
//! A single file failing to embed is logged and skipped; a failed upsert
//! batch aborts the run (the store is left partially updated but safe to
//! retry, since upsert replaces by id).

use crate::embed::Embedder;
use crate::error::UpstreamError;
use crate::models::RepositoryFile;
use crate::vector::{make_vector_id, repo_prefix, VectorIndex, VectorMetadata, VectorRecord};

/// Hard cap on characters sent to the embedding provider, header included.
const MAX_EMBED_CHARS: usize = 8_000;

/// Records per upsert call. Batches go out one after another to bound
/// memory and respect store rate limits.
const UPSERT_BATCH_SIZE: usize = 100;

/// Ids per delete call.
const DELETE_BATCH_SIZE: usize = 1_000;

/// Outcome of one indexing pass: how many of the selected files made it in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexReport {
    pub indexed: usize,
    pub skipped: usize,
    pub total: usize,
}

impl std::fmt::Display for IndexReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} of {} files indexed", self.indexed, self.total)
    }
}

/// The exact text handed to the embedding provider for one file:
/// `"File <path>:\n\n<content>"`, truncated to [`MAX_EMBED_CHARS`] on a
/// char boundary (plain left-anchored cut, no smart boundaries).
pub fn embedding_text(path: &str, content: &str) -> String {
    let combined = format!("File {path}:\n\n{content}");
    if combined.len() <= MAX_EMBED_CHARS {
        return combined;
    }
    let mut end = MAX_EMBED_CHARS;
    while !combined.is_char_boundary(end) {
        end -= 1;
    }
    combined[..end].to_string()
}

/// Embed and upsert a repository's files. Re-running with an unchanged
/// file set is idempotent (ids are stable, upsert replaces); it does NOT
/// remove vectors for files that no longer exist — call
/// [`delete_repo_vectors`] first for a clean re-index.
pub async fn index_codebase(
    repo_id: &str,
    files: &[RepositoryFile],
    embedder: &dyn Embedder,
    index: &dyn VectorIndex,
) -> Result<IndexReport, UpstreamError> {
    let mut records = Vec::with_capacity(files.len());
    let mut skipped = 0usize;

    for file in files {
        let text = embedding_text(&file.path, &file.content);

        match embedder.embed(&text).await {
            Ok(values) => {
                records.push(VectorRecord {
                    id: make_vector_id(repo_id, &file.path),
                    values,
                    metadata: VectorMetadata {
                        repo_id: repo_id.to_string(),
                        path: file.path.clone(),
                        content: text,
                    },
                });
            }
            // Model/config drift affects every file; abort instead of
            // producing a uniformly-empty index.
            Err(e @ UpstreamError::DimensionMismatch { .. }) => return Err(e),
            Err(e) => {
                tracing::warn!("Failed to embed {}: {e}", file.path);
                skipped += 1;
            }
        }
    }

    let indexed = records.len();
    for batch in records.chunks(UPSERT_BATCH_SIZE) {
        tracing::info!("Upserting {} vectors for {repo_id}", batch.len());
        index.upsert(batch.to_vec()).await?;
    }

    Ok(IndexReport {
        indexed,
        skipped,
        total: files.len(),
    })
}

/// Remove every vector whose id carries this repository's prefix.
/// Pages through the listing until the store reports no more pages, then
/// deletes in batches. A repository with no vectors is a no-op.
pub async fn delete_repo_vectors(
    repo_id: &str,
    index: &dyn VectorIndex,
) -> Result<usize, UpstreamError> {
    let prefix = repo_prefix(repo_id);
    let mut all_ids = Vec::new();
    let mut token = None;

    loop {
        let page = index.list_ids(&prefix, token).await?;
        all_ids.extend(page.ids);
        match page.next_token {
            Some(next) => token = Some(next),
            None => break,
        }
    }

    if all_ids.is_empty() {
        return Ok(0);
    }

    for batch in all_ids.chunks(DELETE_BATCH_SIZE) {
        index.delete_many(batch).await?;
        tracing::info!("Deleted batch of {} vectors for {repo_id}", batch.len());
    }

    Ok(all_ids.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vector::memory::LocalVectorIndex;

    /// Deterministic embedder: a tiny bag-of-bytes projection. Paths listed
    /// in `fail_on` simulate transient upstream failures.
    pub(crate) struct FakeEmbedder {
        pub dimension: usize,
        pub fail_on: Vec<String>,
        pub force_dimension_mismatch: bool,
    }

    impl FakeEmbedder {
        pub(crate) fn new(dimension: usize) -> Self {
            Self {
                dimension,
                fail_on: Vec::new(),
                force_dimension_mismatch: false,
            }
        }
    }

    #[async_trait::async_trait]
    impl Embedder for FakeEmbedder {
        async fn embed(&self, text: &str) -> Result<Vec<f32>, UpstreamError> {
            if let Some(marker) = self.fail_on.iter().find(|m| text.contains(m.as_str())) {
                return Err(UpstreamError::Transient(format!("fake failure: {marker}")));
            }
            if self.force_dimension_mismatch {
                return Err(UpstreamError::DimensionMismatch {
                    expected: self.dimension,
                    actual: self.dimension + 1,
                });
            }
            let mut v = vec![0.0f32; self.dimension];
            for (i, b) in text.bytes().enumerate() {
                v[i % self.dimension] += (b as f32) / 255.0;
            }
            Ok(v)
        }

        fn dimension(&self) -> usize {
            self.dimension
        }
    }

    fn files(n: usize) -> Vec<RepositoryFile> {
        (0..n)
            .map(|i| RepositoryFile {
                path: format!("src/file_{i:03}.rs"),
                content: format!("fn f_{i}() {{}}"),
            })
            .collect()
    }

    #[test]
    fn test_embedding_text_short_input_untouched() {
        let text = embedding_text("src/main.rs", "fn main() {}");
        assert_eq!(text, "File src/main.rs:\n\nfn main() {}");
    }

    #[test]
    fn test_embedding_text_truncation_bound() {
        let long = "x".repeat(20_000);
        let text = embedding_text("big.rs", &long);
        assert_eq!(text.len(), 8_000);
        assert!(text.starts_with("File big.rs:\n\n"));
    }

    #[test]
    fn test_embedding_text_truncates_on_char_boundary() {
        // Multi-byte chars straddling the cap must not split
        let long = "é".repeat(10_000);
        let text = embedding_text("utf8.rs", &long);
        assert!(text.len() <= 8_000);
        assert!(text.is_char_boundary(text.len()));
    }

    #[tokio::test]
    async fn test_index_reports_full_success() {
        let embedder = FakeEmbedder::new(8);
        let index = LocalVectorIndex::in_memory();

        let report = index_codebase("r1", &files(5), &embedder, &index)
            .await
            .unwrap();
        assert_eq!(
            report,
            IndexReport {
                indexed: 5,
                skipped: 0,
                total: 5
            }
        );
        assert_eq!(index.record_count(), 5);
    }

    #[tokio::test]
    async fn test_embed_failure_skips_file_not_run() {
        let mut embedder = FakeEmbedder::new(8);
        embedder.fail_on.push("file_002".to_string());
        let index = LocalVectorIndex::in_memory();

        let report = index_codebase("r1", &files(5), &embedder, &index)
            .await
            .unwrap();
        assert_eq!(report.indexed, 4);
        assert_eq!(report.skipped, 1);
        assert_eq!(report.to_string(), "4 of 5 files indexed");
    }

    #[tokio::test]
    async fn test_dimension_mismatch_is_fatal() {
        let mut embedder = FakeEmbedder::new(8);
        embedder.force_dimension_mismatch = true;
        let index = LocalVectorIndex::in_memory();

        let result = index_codebase("r1", &files(3), &embedder, &index).await;
        assert!(matches!(
            result,
            Err(UpstreamError::DimensionMismatch { .. })
        ));
        assert_eq!(index.record_count(), 0);
    }

    #[tokio::test]
    async fn test_reindex_same_files_is_idempotent() {
        let embedder = FakeEmbedder::new(8);
        let index = LocalVectorIndex::in_memory();
        let fs = files(7);

        index_codebase("r1", &fs, &embedder, &index).await.unwrap();
        index_codebase("r1", &fs, &embedder, &index).await.unwrap();
        assert_eq!(index.record_count(), 7);
    }

    #[tokio::test]
    async fn test_delete_repo_vectors_pages_through_listing() {
        let embedder = FakeEmbedder::new(4);
        let index = LocalVectorIndex::in_memory();

        // More than one list page (page size 100)
        index_codebase("r1", &files(150), &embedder, &index)
            .await
            .unwrap();
        index_codebase("r2", &files(10), &embedder, &index)
            .await
            .unwrap();

        let deleted = delete_repo_vectors("r1", &index).await.unwrap();
        assert_eq!(deleted, 150);
        // r2 untouched
        assert_eq!(index.record_count(), 10);
    }

    #[tokio::test]
    async fn test_delete_with_no_vectors_is_noop() {
        let index = LocalVectorIndex::in_memory();
        let deleted = delete_repo_vectors("ghost", &index).await.unwrap();
        assert_eq!(deleted, 0);
    }
}
