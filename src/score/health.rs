//! Project health score: a bounded composite of activity, maintenance,
//! community, and freshness signals.
//!
//! Sub-score maxima are fixed (35/35/20/10) and the total is always their
//! sum, clamped to 0..=100. Each recomputation pushes the prior total onto
//! a two-entry history (newest first).

use chrono::{DateTime, Utc};

use crate::models::{HealthScore, PreviousScore, RepositoryHealthSignals};

const MAX_ACTIVITY: f64 = 35.0;
const MAX_MAINTENANCE: f64 = 35.0;
const MAX_COMMUNITY: f64 = 20.0;
const MAX_FRESHNESS: f64 = 10.0;

/// Sustained cadence earns full marks: one commit per day over the window
const FULL_MARKS_COMMITS_60D: f64 = 60.0;
/// Review-comment volume that earns full community trust
const FULL_MARKS_REVIEWS: f64 = 50.0;
/// A commit within the last week is maximally fresh
const FRESH_WINDOW_DAYS: i64 = 7;
/// Beyond this, the project counts as dormant
const STALE_CUTOFF_DAYS: i64 = 90;

/// Recompute a project's health score from fresh signals. `previous` is
/// the currently persisted score, if any; its total is pushed onto the
/// history ring buffer (capped at 2 entries, newest first).
pub fn compute_health_score(
    signals: &RepositoryHealthSignals,
    previous: Option<&HealthScore>,
    now: DateTime<Utc>,
) -> HealthScore {
    let activity_momentum = activity_momentum(signals);
    let maintenance_quality = maintenance_quality(signals);
    let community_trust = community_trust(signals);
    let freshness = freshness(signals, now);

    let total = activity_momentum + maintenance_quality + community_trust + freshness;

    let mut previous_scores = Vec::with_capacity(2);
    if let Some(prev) = previous {
        previous_scores.push(PreviousScore {
            total_score: prev.total_score,
            calculated_date: prev.last_calculated_date.clone(),
        });
        previous_scores.extend(prev.previous_scores.iter().cloned());
        previous_scores.truncate(2);
    }

    HealthScore {
        total_score: total.min(100),
        activity_momentum,
        maintenance_quality,
        community_trust,
        freshness,
        last_calculated_date: now.format("%Y-%m-%d").to_string(),
        previous_scores,
    }
}

/// Sustained commit cadence over the trailing 60-day window.
fn activity_momentum(signals: &RepositoryHealthSignals) -> u32 {
    let cadence = (signals.commits_last_60_days as f64 / FULL_MARKS_COMMITS_60D).min(1.0);
    (cadence * MAX_ACTIVITY).round() as u32
}

/// PR-merge discipline (worth 20) plus issue closure (worth 15).
fn maintenance_quality(signals: &RepositoryHealthSignals) -> u32 {
    let merge_rate = if signals.total_prs > 0 {
        signals.merged_prs as f64 / signals.total_prs as f64
    } else {
        0.0
    };

    let total_issues = signals.open_issues + signals.closed_issues;
    let closure_rate = if total_issues > 0 {
        signals.closed_issues as f64 / total_issues as f64
    } else {
        0.0
    };

    let score = merge_rate * 20.0 + closure_rate * 15.0;
    (score.min(MAX_MAINTENANCE)).round() as u32
}

/// Review volume as a community signal; 0 when the signal is unavailable.
fn community_trust(signals: &RepositoryHealthSignals) -> u32 {
    match signals.review_count {
        Some(reviews) => {
            let ratio = (reviews as f64 / FULL_MARKS_REVIEWS).min(1.0);
            (ratio * MAX_COMMUNITY).round() as u32
        }
        None => 0,
    }
}

/// Recency of the last commit: full marks inside a week, linear decay to
/// zero at the stale cutoff.
fn freshness(signals: &RepositoryHealthSignals, now: DateTime<Utc>) -> u32 {
    let Some(last_commit) = signals.last_commit_date else {
        return 0;
    };

    let days = (now - last_commit).num_days();
    if days <= FRESH_WINDOW_DAYS {
        return MAX_FRESHNESS as u32;
    }
    if days >= STALE_CUTOFF_DAYS {
        return 0;
    }

    let remaining = (STALE_CUTOFF_DAYS - days) as f64;
    let span = (STALE_CUTOFF_DAYS - FRESH_WINDOW_DAYS) as f64;
    (MAX_FRESHNESS * remaining / span).round() as u32
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn now() -> DateTime<Utc> {
        "2026-08-28T12:00:00Z".parse().unwrap()
    }

    fn busy_signals() -> RepositoryHealthSignals {
        RepositoryHealthSignals {
            open_issues: 10,
            closed_issues: 90,
            last_commit_date: Some(now() - Duration::days(1)),
            commits_last_60_days: 120,
            total_prs: 80,
            merged_prs: 72,
            review_count: Some(200),
        }
    }

    #[test]
    fn test_sub_scores_stay_within_bounds() {
        let cases = [
            RepositoryHealthSignals::default(),
            busy_signals(),
            RepositoryHealthSignals {
                open_issues: 1_000,
                closed_issues: 0,
                last_commit_date: Some(now() - Duration::days(400)),
                commits_last_60_days: 100_000,
                total_prs: 1,
                merged_prs: 1,
                review_count: Some(u32::MAX),
            },
        ];

        for signals in &cases {
            let score = compute_health_score(signals, None, now());
            assert!(score.activity_momentum <= 35);
            assert!(score.maintenance_quality <= 35);
            assert!(score.community_trust <= 20);
            assert!(score.freshness <= 10);
            assert!(score.total_score <= 100);
        }
    }

    #[test]
    fn test_total_is_sum_of_sub_scores() {
        let score = compute_health_score(&busy_signals(), None, now());
        assert_eq!(
            score.total_score,
            score.activity_momentum
                + score.maintenance_quality
                + score.community_trust
                + score.freshness
        );
    }

    #[test]
    fn test_healthy_project_scores_high() {
        let score = compute_health_score(&busy_signals(), None, now());
        assert_eq!(score.activity_momentum, 35);
        assert_eq!(score.freshness, 10);
        assert!(score.total_score >= 80);
    }

    #[test]
    fn test_dead_project_scores_zero() {
        let score = compute_health_score(&RepositoryHealthSignals::default(), None, now());
        assert_eq!(score.total_score, 0);
    }

    #[test]
    fn test_missing_review_signal_zeroes_community_trust() {
        let mut signals = busy_signals();
        signals.review_count = None;
        let score = compute_health_score(&signals, None, now());
        assert_eq!(score.community_trust, 0);
    }

    #[test]
    fn test_freshness_decays_and_hits_zero() {
        let mut signals = RepositoryHealthSignals::default();

        signals.last_commit_date = Some(now() - Duration::days(3));
        assert_eq!(freshness(&signals, now()), 10);

        signals.last_commit_date = Some(now() - Duration::days(48));
        let mid = freshness(&signals, now());
        assert!(mid > 0 && mid < 10);

        signals.last_commit_date = Some(now() - Duration::days(120));
        assert_eq!(freshness(&signals, now()), 0);
    }

    #[test]
    fn test_previous_scores_capped_at_two_across_recomputes() {
        let mut current: Option<HealthScore> = None;
        for day in 0..6 {
            let at = now() + Duration::days(day);
            let next = compute_health_score(&busy_signals(), current.as_ref(), at);
            assert!(next.previous_scores.len() <= 2);
            current = Some(next);
        }

        let last = current.unwrap();
        assert_eq!(last.previous_scores.len(), 2);
        // Newest first: entry 0 is the run just before the final one
        assert_eq!(last.previous_scores[0].calculated_date, "2026-09-01");
        assert_eq!(last.previous_scores[1].calculated_date, "2026-08-31");
    }
}
