//! Contributor impact score: a bounded composite of commit, PR, issue,
//! and review activity, normalized by account age.
//!
//! Weights favor collaboration over solo commit volume; a penalty ladder
//! discounts commit-heavy profiles and inactivity, and a consistency bonus
//! rewards contributors active across every category. All intermediate
//! values are returned for transparency.

use crate::models::{ContributorTier, GithubStats, ImpactBreakdown, ImpactScoreResult};

const COMMIT_WEIGHT: f64 = 0.5;
const PR_WEIGHT: f64 = 4.0;
const ISSUE_WEIGHT: f64 = 2.5;
const REVIEW_WEIGHT: f64 = 3.0;

/// Commits above 10 per day-equivalent are treated as farming and ignored
const MAX_COMMITS_PER_DAY: f64 = 10.0;

pub fn calculate_impact_score(stats: &GithubStats) -> ImpactScoreResult {
    let effective_commits = (stats.total_commits as f64)
        .min(stats.account_age_in_years * 365.0 * MAX_COMMITS_PER_DAY);

    let breakdown = ImpactBreakdown {
        commits: effective_commits * COMMIT_WEIGHT,
        prs: stats.total_prs as f64 * PR_WEIGHT,
        issues: stats.total_issues_closed as f64 * ISSUE_WEIGHT,
        reviews: stats.total_reviews as f64 * REVIEW_WEIGHT,
    };

    let weighted_activity =
        breakdown.commits + breakdown.prs + breakdown.issues + breakdown.reviews;

    // Square root softens the age normalization for long-lived accounts
    let age_factor = stats.account_age_in_years.sqrt().max(0.5);
    let mut base_score = weighted_activity / age_factor / 15.0;

    let mut penalties = Vec::new();

    // Commit-heavy profiles signal solo work
    let commit_to_pr_ratio = stats.total_commits as f64 / (stats.total_prs.max(1) as f64);
    if commit_to_pr_ratio > 50.0 {
        base_score *= 0.7;
        penalties.push("High commit-to-PR ratio (mostly solo work)".to_string());
    } else if commit_to_pr_ratio > 30.0 {
        base_score *= 0.85;
        penalties.push("Moderate commit-to-PR ratio".to_string());
    }

    if stats.total_prs < 50 && stats.account_age_in_years >= 2.0 {
        base_score *= 0.9;
        penalties.push("Low PR count for account age".to_string());
    }

    if stats.total_reviews < 20 && stats.account_age_in_years >= 2.0 {
        base_score *= 0.9;
        penalties.push("Limited code review activity".to_string());
    }

    // Mentorship bonus: reviewing more than half as much as authoring
    if stats.total_reviews as f64 > stats.total_prs as f64 / 2.0 && stats.total_reviews > 30 {
        base_score *= 1.15;
    }

    let activity_types = [
        stats.total_commits > 0,
        stats.total_prs > 10,
        stats.total_issues_closed > 5,
        stats.total_reviews > 10,
    ]
    .iter()
    .filter(|&&b| b)
    .count();

    let consistency_bonus = match activity_types {
        4 => 1.15,
        3 => 1.05,
        _ => 1.0,
    };

    let raw_score = (base_score * consistency_bonus).round() as i64;
    let display_score = raw_score.min(100);

    let (tier, elite_badge) = classify(raw_score);

    ImpactScoreResult {
        score: raw_score,
        display_score,
        tier,
        elite_badge,
        weighted_activity,
        consistency_bonus,
        breakdown,
        penalties,
    }
}

/// Tier thresholds on the raw (uncapped) score, highest first.
fn classify(raw_score: i64) -> (ContributorTier, Option<String>) {
    if raw_score >= 150 {
        (
            ContributorTier::Elite,
            Some("Top 1% • Exceptional".to_string()),
        )
    } else if raw_score >= 120 {
        (
            ContributorTier::Elite,
            Some("Top 5% • Outstanding".to_string()),
        )
    } else if raw_score >= 100 {
        (ContributorTier::Elite, Some("Top 10%".to_string()))
    } else if raw_score >= 90 {
        (ContributorTier::Elite, None)
    } else if raw_score >= 70 {
        (ContributorTier::Passionate, None)
    } else if raw_score >= 55 {
        (ContributorTier::ActiveProfessional, None)
    } else if raw_score >= 35 {
        (ContributorTier::Regular, None)
    } else if raw_score >= 20 {
        (ContributorTier::Casual, None)
    } else {
        (ContributorTier::Inactive, None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stats(
        commits: u32,
        prs: u32,
        issues: u32,
        reviews: u32,
        age_years: f64,
    ) -> GithubStats {
        GithubStats {
            total_commits: commits,
            total_prs: prs,
            total_issues_closed: issues,
            total_reviews: reviews,
            account_age_in_years: age_years,
        }
    }

    /// Regression fixture: a three-year account with heavy, well-rounded
    /// activity and a moderately commit-skewed profile.
    #[test]
    fn test_golden_case_is_deterministic() {
        let input = stats(4000, 110, 50, 50, 3.0);

        let first = calculate_impact_score(&input);
        let second = calculate_impact_score(&input);
        assert_eq!(first, second);

        assert_eq!(first.score, 102);
        assert_eq!(first.display_score, 100);
        assert_eq!(first.tier, ContributorTier::Elite);
        assert_eq!(first.elite_badge.as_deref(), Some("Top 10%"));
        assert_eq!(first.consistency_bonus, 1.15);
        assert_eq!(
            first.penalties,
            vec!["Moderate commit-to-PR ratio".to_string()]
        );
        assert_eq!(first.breakdown.commits, 2000.0);
        assert_eq!(first.breakdown.prs, 440.0);
        assert_eq!(first.breakdown.issues, 125.0);
        assert_eq!(first.breakdown.reviews, 150.0);
        assert_eq!(first.weighted_activity, 2715.0);
    }

    #[test]
    fn test_commit_farming_is_capped() {
        // One-year account with an absurd commit count
        let capped = calculate_impact_score(&stats(1_000_000, 5, 0, 0, 1.0));
        // Effective commits cap at 365 * 10
        assert_eq!(capped.breakdown.commits, 3650.0 * 0.5);
    }

    #[test]
    fn test_penalties_stack_in_order() {
        // Old account: extreme ratio, few PRs, no reviews
        let result = calculate_impact_score(&stats(3000, 10, 0, 0, 5.0));
        assert_eq!(
            result.penalties,
            vec![
                "High commit-to-PR ratio (mostly solo work)".to_string(),
                "Low PR count for account age".to_string(),
                "Limited code review activity".to_string(),
            ]
        );
    }

    #[test]
    fn test_young_account_escapes_age_penalties() {
        let result = calculate_impact_score(&stats(100, 5, 0, 0, 1.0));
        assert!(!result
            .penalties
            .iter()
            .any(|p| p.contains("account age") || p.contains("review activity")));
    }

    #[test]
    fn test_consistency_bonus_tiers() {
        // All four activity categories satisfied
        let full = calculate_impact_score(&stats(100, 20, 10, 20, 1.0));
        assert_eq!(full.consistency_bonus, 1.15);

        // Three satisfied (issues below threshold)
        let three = calculate_impact_score(&stats(100, 20, 5, 20, 1.0));
        assert_eq!(three.consistency_bonus, 1.05);

        // One satisfied
        let one = calculate_impact_score(&stats(100, 0, 0, 0, 1.0));
        assert_eq!(one.consistency_bonus, 1.0);
    }

    #[test]
    fn test_inactive_account_lands_in_bottom_tier() {
        let result = calculate_impact_score(&stats(0, 0, 0, 0, 4.0));
        assert_eq!(result.score, 0);
        assert_eq!(result.tier, ContributorTier::Inactive);
        assert_eq!(result.elite_badge, None);
    }

    #[test]
    fn test_display_score_caps_at_100() {
        let result = calculate_impact_score(&stats(10_000, 2_000, 500, 800, 8.0));
        assert!(result.score > 100);
        assert_eq!(result.display_score, 100);
        assert_eq!(result.tier, ContributorTier::Elite);
        assert_eq!(result.elite_badge.as_deref(), Some("Top 1% • Exceptional"));
    }

    #[test]
    fn test_brand_new_account_age_floor() {
        // sqrt(0.01) = 0.1 < 0.5 floor; score must stay finite and sane
        let result = calculate_impact_score(&stats(50, 2, 1, 0, 0.01));
        assert!(result.score >= 0);
    }
}
