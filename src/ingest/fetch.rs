//! Two-phase repository ingestion: enumerate eligible file paths, then
//! pull their contents in bounded batches.
//!
//! Traversal runs as a work queue over directory nodes with a fixed
//! concurrency cap, so a very large tree never fans out into an unbounded
//! request storm. A directory-listing failure aborts the run; a single
//! file-content failure is logged and skipped.

use futures::future::join_all;

use crate::error::UpstreamError;
use crate::github::{EntryType, RepositoryContents};
use crate::ingest::filter::{should_include_file, should_skip_directory};
use crate::models::RepositoryFile;

/// Files fetched per batch; the next batch starts only after the current
/// one settles, to stay inside upstream rate limits.
pub const FETCH_BATCH_SIZE: usize = 20;

/// Walk the repository tree from `root`, returning every path the file
/// selector admits. Directories are listed `concurrency` at a time.
pub async fn collect_file_paths<C: RepositoryContents + ?Sized>(
    client: &C,
    owner: &str,
    repo: &str,
    root: &str,
    concurrency: usize,
) -> Result<Vec<String>, UpstreamError> {
    let concurrency = concurrency.max(1);
    let mut pending: Vec<String> = vec![root.to_string()];
    let mut paths = Vec::new();

    while !pending.is_empty() {
        let wave: Vec<String> = pending
            .drain(..pending.len().min(concurrency))
            .collect();

        let listings = join_all(
            wave.iter()
                .map(|dir| client.list_directory(owner, repo, dir)),
        )
        .await;

        for listing in listings {
            for entry in listing? {
                match entry.entry_type {
                    EntryType::File => {
                        if should_include_file(&entry.path) {
                            paths.push(entry.path);
                        }
                    }
                    EntryType::Dir => {
                        if !should_skip_directory(&entry.path) {
                            pending.push(entry.path);
                        }
                    }
                    EntryType::Symlink | EntryType::Submodule => {}
                }
            }
        }
    }

    Ok(paths)
}

/// Fetch file contents in batches of [`FETCH_BATCH_SIZE`]. A failed or
/// missing file contributes no entry; one bad file never aborts the run.
pub async fn fetch_contents_parallel<C: RepositoryContents + ?Sized>(
    client: &C,
    owner: &str,
    repo: &str,
    paths: &[String],
) -> Vec<RepositoryFile> {
    let mut files = Vec::with_capacity(paths.len());

    for batch in paths.chunks(FETCH_BATCH_SIZE) {
        let results = join_all(
            batch
                .iter()
                .map(|path| client.file_content(owner, repo, path)),
        )
        .await;

        for (path, result) in batch.iter().zip(results) {
            match result {
                Ok(Some(content)) => files.push(RepositoryFile {
                    path: path.clone(),
                    content,
                }),
                Ok(None) => {
                    tracing::debug!("Skipping {path}: no decodable content");
                }
                Err(e) => {
                    tracing::warn!("Failed to fetch {path}: {e}");
                }
            }
        }
    }

    files
}
