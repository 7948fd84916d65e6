//! Thin client over the GitHub REST v3 API.
//!
//! Covers the two capabilities the pipeline consumes: repository content
//! (directory listing + file bytes) and repository metadata (issue/PR
//! activity, languages, README, default-branch head). Errors are
//! classified into [`UpstreamError`] so callers can skip, retry, or abort.

use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;
use base64::Engine as _;
use chrono::{DateTime, Duration, Utc};
use serde::Deserialize;

use crate::config::GithubConfig;
use crate::error::UpstreamError;
use crate::models::{GithubStats, LanguageShare, RepositoryHealthSignals};

/// Repository content capability: list a tree level, fetch one file.
/// The fetcher depends on this seam so tests can inject doubles.
#[async_trait::async_trait]
pub trait RepositoryContents: Send + Sync {
    async fn list_directory(
        &self,
        owner: &str,
        repo: &str,
        path: &str,
    ) -> Result<Vec<TreeEntry>, UpstreamError>;

    async fn file_content(
        &self,
        owner: &str,
        repo: &str,
        path: &str,
    ) -> Result<Option<String>, UpstreamError>;
}

#[derive(Clone)]
pub struct GithubClient {
    http: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

/// A single entry from a directory listing
#[derive(Debug, Clone, Deserialize)]
pub struct TreeEntry {
    pub name: String,
    pub path: String,
    #[serde(rename = "type")]
    pub entry_type: EntryType,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryType {
    File,
    Dir,
    Symlink,
    Submodule,
}

#[derive(Deserialize)]
struct ContentFile {
    content: Option<String>,
}

#[derive(Deserialize)]
struct RepoInfo {
    pushed_at: Option<DateTime<Utc>>,
    default_branch: String,
}

#[derive(Deserialize)]
struct CommitRef {
    sha: String,
}

#[derive(Deserialize)]
struct PullRef {
    merged_at: Option<DateTime<Utc>>,
}

#[derive(Deserialize)]
struct SearchCount {
    total_count: u32,
}

#[derive(Deserialize)]
struct UserInfo {
    created_at: DateTime<Utc>,
}

impl GithubClient {
    pub fn new(http: reqwest::Client, config: &GithubConfig) -> Self {
        Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            token: config.token.clone(),
        }
    }

    fn get(&self, path: &str) -> reqwest::RequestBuilder {
        let mut req = self
            .http
            .get(format!("{}{path}", self.base_url))
            .header("Accept", "application/vnd.github+json")
            .header("User-Agent", "repo-pulse");
        if let Some(token) = &self.token {
            req = req.header("Authorization", format!("Bearer {token}"));
        }
        req
    }

    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
    ) -> Result<T, UpstreamError> {
        let resp = self
            .get(path)
            .send()
            .await
            .map_err(|e| UpstreamError::Transient(format!("GET {path}: {e}")))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(UpstreamError::from_status(status, path));
        }

        resp.json()
            .await
            .map_err(|e| UpstreamError::Transient(format!("decode {path}: {e}")))
    }

    /// SHA of the default branch's head commit.
    pub async fn head_commit(&self, owner: &str, repo: &str) -> Result<String, UpstreamError> {
        let info: RepoInfo = self.get_json(&format!("/repos/{owner}/{repo}")).await?;
        let commit: CommitRef = self
            .get_json(&format!(
                "/repos/{owner}/{repo}/commits/{}",
                info.default_branch
            ))
            .await?;
        Ok(commit.sha)
    }

    /// Raw README text, or None when the repo has no README.
    pub async fn readme(&self, owner: &str, repo: &str) -> Result<Option<String>, UpstreamError> {
        let file: ContentFile = match self.get_json(&format!("/repos/{owner}/{repo}/readme")).await
        {
            Ok(f) => f,
            Err(UpstreamError::NotFound(_)) => return Ok(None),
            Err(e) => return Err(e),
        };
        let Some(encoded) = file.content else {
            return Ok(None);
        };
        let stripped: String = encoded.chars().filter(|c| !c.is_whitespace()).collect();
        let bytes = BASE64_STANDARD
            .decode(&stripped)
            .map_err(|e| UpstreamError::Transient(format!("decode readme: {e}")))?;
        Ok(String::from_utf8(bytes).ok())
    }

    /// Activity signals feeding the health score computation.
    pub async fn health_signals(
        &self,
        owner: &str,
        repo: &str,
    ) -> Result<RepositoryHealthSignals, UpstreamError> {
        let open: SearchCount = self
            .get_json(&format!(
                "/search/issues?q=repo:{owner}/{repo}+type:issue+state:open&per_page=1"
            ))
            .await?;
        let closed: SearchCount = self
            .get_json(&format!(
                "/search/issues?q=repo:{owner}/{repo}+type:issue+state:closed&per_page=1"
            ))
            .await?;

        let info: RepoInfo = self.get_json(&format!("/repos/{owner}/{repo}")).await?;

        let since = (Utc::now() - Duration::days(60)).to_rfc3339();
        let commits: Vec<CommitRef> = self
            .get_json(&format!(
                "/repos/{owner}/{repo}/commits?since={since}&per_page=100"
            ))
            .await?;

        let pulls: Vec<PullRef> = self
            .get_json(&format!(
                "/repos/{owner}/{repo}/pulls?state=all&per_page=100"
            ))
            .await?;
        let merged = pulls.iter().filter(|p| p.merged_at.is_some()).count() as u32;

        // Review comments are a best-effort signal; absence is not an error
        let review_count = match self
            .get_json::<Vec<serde_json::Value>>(&format!(
                "/repos/{owner}/{repo}/pulls/comments?per_page=100"
            ))
            .await
        {
            Ok(comments) => Some(comments.len() as u32),
            Err(e) => {
                tracing::warn!("Review signal unavailable for {owner}/{repo}: {e}");
                None
            }
        };

        Ok(RepositoryHealthSignals {
            open_issues: open.total_count,
            closed_issues: closed.total_count,
            last_commit_date: info.pushed_at,
            commits_last_60_days: commits.len() as u32,
            total_prs: pulls.len() as u32,
            merged_prs: merged,
            review_count,
        })
    }

    /// Aggregate contributor activity for the impact score.
    pub async fn contributor_stats(&self, username: &str) -> Result<GithubStats, UpstreamError> {
        let user: UserInfo = self.get_json(&format!("/users/{username}")).await?;
        let account_age_in_years =
            (Utc::now() - user.created_at).num_days().max(0) as f64 / 365.25;

        let commits: SearchCount = self
            .get_json(&format!(
                "/search/commits?q=author:{username}&per_page=1"
            ))
            .await?;
        let prs: SearchCount = self
            .get_json(&format!(
                "/search/issues?q=author:{username}+type:pr&per_page=1"
            ))
            .await?;
        let issues_closed: SearchCount = self
            .get_json(&format!(
                "/search/issues?q=author:{username}+type:issue+state:closed&per_page=1"
            ))
            .await?;
        let reviews: SearchCount = self
            .get_json(&format!(
                "/search/issues?q=reviewed-by:{username}+type:pr&per_page=1"
            ))
            .await?;

        Ok(GithubStats {
            total_commits: commits.total_count,
            total_prs: prs.total_count,
            total_issues_closed: issues_closed.total_count,
            total_reviews: reviews.total_count,
            account_age_in_years,
        })
    }

    /// Language byte counts as sorted percentage shares.
    pub async fn languages(
        &self,
        owner: &str,
        repo: &str,
    ) -> Result<Vec<LanguageShare>, UpstreamError> {
        let raw: std::collections::BTreeMap<String, u64> = self
            .get_json(&format!("/repos/{owner}/{repo}/languages"))
            .await?;

        let total: u64 = raw.values().sum();
        if total == 0 {
            return Ok(Vec::new());
        }

        let mut shares: Vec<LanguageShare> = raw
            .into_iter()
            .map(|(name, bytes)| LanguageShare {
                name,
                percentage: ((bytes as f64 / total as f64) * 10_000.0).round() / 100.0,
                bytes,
            })
            .collect();
        shares.sort_by(|a, b| {
            b.percentage
                .partial_cmp(&a.percentage)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        Ok(shares)
    }
}

#[async_trait::async_trait]
impl RepositoryContents for GithubClient {
    /// List the entries of one directory of the repository tree.
    async fn list_directory(
        &self,
        owner: &str,
        repo: &str,
        path: &str,
    ) -> Result<Vec<TreeEntry>, UpstreamError> {
        let url = if path.is_empty() {
            format!("/repos/{owner}/{repo}/contents")
        } else {
            format!("/repos/{owner}/{repo}/contents/{path}")
        };
        self.get_json(&url).await
    }

    /// Fetch one file's decoded content. `Ok(None)` means the file does not
    /// exist or is not decodable text; transient failures are errors.
    async fn file_content(
        &self,
        owner: &str,
        repo: &str,
        path: &str,
    ) -> Result<Option<String>, UpstreamError> {
        let url = format!("/repos/{owner}/{repo}/contents/{path}");
        let file: ContentFile = match self.get_json(&url).await {
            Ok(f) => f,
            Err(UpstreamError::NotFound(_)) => return Ok(None),
            Err(e) => return Err(e),
        };

        let Some(encoded) = file.content else {
            return Ok(None);
        };

        // The contents API wraps base64 at 60 columns
        let stripped: String = encoded.chars().filter(|c| !c.is_whitespace()).collect();
        let bytes = match BASE64_STANDARD.decode(&stripped) {
            Ok(b) => b,
            Err(e) => {
                tracing::warn!("Invalid base64 content for {path}: {e}");
                return Ok(None);
            }
        };

        match String::from_utf8(bytes) {
            Ok(text) => Ok(Some(text)),
            Err(_) => Ok(None), // binary file slipped through the selector
        }
    }
}
