//! Context retrieval for prompt augmentation: embed a free-text query and
//! return the stored content of the nearest indexed files, scoped to one
//! repository.

use crate::embed::Embedder;
use crate::error::UpstreamError;
use crate::vector::VectorIndex;

/// Top-k snippets most similar to `query` within `repo_id`, most-similar
/// first. A repository with nothing indexed yields an empty list, never an
/// error. Matches with empty or missing content are dropped.
pub async fn retrieve_context(
    query: &str,
    repo_id: &str,
    top_k: usize,
    embedder: &dyn Embedder,
    index: &dyn VectorIndex,
) -> Result<Vec<String>, UpstreamError> {
    let embedding = embedder.embed(query).await?;
    let matches = index.query(&embedding, top_k, repo_id).await?;

    Ok(matches
        .into_iter()
        .filter_map(|m| m.metadata)
        .map(|meta| meta.content)
        .filter(|content| !content.is_empty())
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vector::memory::LocalVectorIndex;
    use crate::vector::{make_vector_id, VectorMetadata, VectorRecord};

    struct UnitEmbedder;

    #[async_trait::async_trait]
    impl Embedder for UnitEmbedder {
        async fn embed(&self, text: &str) -> Result<Vec<f32>, UpstreamError> {
            // Orthogonal unit vectors keyed off the first byte
            let axis = (text.as_bytes().first().copied().unwrap_or(0) % 4) as usize;
            let mut v = vec![0.0; 4];
            v[axis] = 1.0;
            Ok(v)
        }

        fn dimension(&self) -> usize {
            4
        }
    }

    fn record(repo_id: &str, path: &str, content: &str, values: Vec<f32>) -> VectorRecord {
        VectorRecord {
            id: make_vector_id(repo_id, path),
            values,
            metadata: VectorMetadata {
                repo_id: repo_id.to_string(),
                path: path.to_string(),
                content: content.to_string(),
            },
        }
    }

    #[tokio::test]
    async fn test_empty_repo_returns_empty_not_error() {
        let index = LocalVectorIndex::in_memory();
        let snippets = retrieve_context("anything", "no-such-repo", 5, &UnitEmbedder, &index)
            .await
            .unwrap();
        assert!(snippets.is_empty());
    }

    #[tokio::test]
    async fn test_drops_empty_content_matches() {
        let index = LocalVectorIndex::in_memory();
        index
            .upsert(vec![
                record("r1", "a.rs", "fn a() {}", vec![1.0, 0.0, 0.0, 0.0]),
                record("r1", "b.rs", "", vec![1.0, 0.0, 0.0, 0.0]),
            ])
            .await
            .unwrap();

        // 'd' % 4 == 0 -> axis 0
        let snippets = retrieve_context("d", "r1", 5, &UnitEmbedder, &index)
            .await
            .unwrap();
        assert_eq!(snippets, vec!["fn a() {}".to_string()]);
    }

    #[tokio::test]
    async fn test_never_returns_other_repo_content() {
        let index = LocalVectorIndex::in_memory();
        index
            .upsert(vec![
                record("repo-a", "x.rs", "alpha content", vec![1.0, 0.0, 0.0, 0.0]),
                record("repo-b", "y.rs", "beta content", vec![1.0, 0.0, 0.0, 0.0]),
            ])
            .await
            .unwrap();

        let snippets = retrieve_context("d", "repo-a", 10, &UnitEmbedder, &index)
            .await
            .unwrap();
        assert_eq!(snippets.len(), 1);
        assert!(snippets[0].contains("alpha"));
    }
}
