use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A connected GitHub project tracked by this service
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Project {
    pub id: Uuid,
    pub owner: String,
    pub repo: String,
    pub status: ProjectStatus,
    pub connected_at: DateTime<Utc>,
    pub indexed_at: Option<DateTime<Utc>>,
    /// Files successfully indexed in the last run
    pub indexed_file_count: usize,
    /// Files selected for the last run (indexed + skipped)
    pub selected_file_count: usize,
    /// Head commit SHA of the default branch at last index
    pub head_commit: Option<String>,
    pub health_score: Option<HealthScore>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum ProjectStatus {
    Connected,
    Indexing,
    Ready,
    Error(String),
}

/// A file pulled from a repository tree, alive for a single indexing pass
#[derive(Debug, Clone)]
pub struct RepositoryFile {
    pub path: String,
    pub content: String,
}

/// Composite project health score, persisted on the project record.
///
/// `total_score` always equals the sum of the four sub-scores (clamped to
/// 0..=100); each sub-score is bounded by its annotated maximum.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct HealthScore {
    pub total_score: u32,
    /// 0..=35
    pub activity_momentum: u32,
    /// 0..=35
    pub maintenance_quality: u32,
    /// 0..=20
    pub community_trust: u32,
    /// 0..=10
    pub freshness: u32,
    pub last_calculated_date: String,
    /// Ring buffer of the 2 most recent prior totals, newest first
    pub previous_scores: Vec<PreviousScore>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PreviousScore {
    pub total_score: u32,
    pub calculated_date: String,
}

/// Raw activity signals feeding the health score computation
#[derive(Debug, Clone, Default)]
pub struct RepositoryHealthSignals {
    pub open_issues: u32,
    pub closed_issues: u32,
    pub last_commit_date: Option<DateTime<Utc>>,
    pub commits_last_60_days: u32,
    pub total_prs: u32,
    pub merged_prs: u32,
    /// Review comments across recent PRs; None when the signal is unavailable
    pub review_count: Option<u32>,
}

/// Aggregate contributor activity pulled from GitHub
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GithubStats {
    pub total_commits: u32,
    pub total_prs: u32,
    pub total_issues_closed: u32,
    pub total_reviews: u32,
    pub account_age_in_years: f64,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ImpactScoreResult {
    pub score: i64,
    pub display_score: i64,
    pub tier: ContributorTier,
    pub elite_badge: Option<String>,
    pub weighted_activity: f64,
    pub consistency_bonus: f64,
    pub breakdown: ImpactBreakdown,
    /// Human-readable penalty descriptions, in application order
    pub penalties: Vec<String>,
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub enum ContributorTier {
    #[serde(rename = "Elite Contributor")]
    Elite,
    #[serde(rename = "Passionate Contributor")]
    Passionate,
    #[serde(rename = "Active Professional")]
    ActiveProfessional,
    #[serde(rename = "Regular Developer")]
    Regular,
    #[serde(rename = "Casual Contributor")]
    Casual,
    #[serde(rename = "Inactive")]
    Inactive,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ImpactBreakdown {
    pub commits: f64,
    pub prs: f64,
    pub issues: f64,
    pub reviews: f64,
}

/// Language usage share for a repository
#[derive(Debug, Clone, Serialize)]
pub struct LanguageShare {
    pub name: String,
    pub bytes: u64,
    pub percentage: f64,
}

/// Connect-project request
#[derive(Debug, Clone, Deserialize)]
pub struct ConnectProjectRequest {
    pub owner: String,
    pub repo: String,
}

/// Context retrieval request
#[derive(Debug, Clone, Deserialize)]
pub struct ContextRequest {
    pub query: String,
    pub project_id: Uuid,
    #[serde(default = "default_top_k")]
    pub top_k: usize,
}

fn default_top_k() -> usize {
    5
}

/// Context retrieval response
#[derive(Debug, Clone, Serialize)]
pub struct ContextResponse {
    pub query: String,
    pub snippets: Vec<String>,
}
