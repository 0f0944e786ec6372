//! Repository health and maintainer metrics.

use chrono::{DateTime, Utc};

use crate::domain::{MaintainerMetrics, RepoHealth};
use crate::error::Result;
use crate::snapshot::{IssueActivity, PullRequestActivity, RepoActivity, count, elapsed_days};

/// Most recent history entries considered per kind (issues, pull requests).
pub const LOOKBACK_LIMIT: usize = 100;
/// Commit age assumed when a repository has no commits at all.
pub const NO_COMMIT_DAYS: u32 = 365;
/// Merge time assumed when no pull request in the window was merged.
pub const COLD_MERGE_DAYS: f64 = 30.0;
/// Response time assumed when no issue in the window got a response.
pub const COLD_RESPONSE_DAYS: f64 = 30.0;

/// Commit age at which freshness drops to one half.
pub const FRESHNESS_HALF_LIFE_DAYS: f64 = 30.0;
/// Merge time at which merge speed drops to one half.
pub const MERGE_HALF_LIFE_DAYS: f64 = 7.0;
/// Response time at which responsiveness drops to one half.
pub const RESPONSE_HALF_LIFE_DAYS: f64 = 2.0;

/// Weight of commit freshness in the health score.
pub const HEALTH_FRESHNESS_WEIGHT: f64 = 0.40;
/// Weight of the issue closure rate in the health score.
pub const HEALTH_CLOSURE_WEIGHT: f64 = 0.35;
/// Weight of PR backlog pressure in the health score.
pub const HEALTH_BACKLOG_WEIGHT: f64 = 0.25;

/// Weight of merge speed in the maintainer score.
pub const MAINTAINER_MERGE_WEIGHT: f64 = 0.35;
/// Weight of issue responsiveness in the maintainer score.
pub const MAINTAINER_RESPONSE_WEIGHT: f64 = 0.30;
/// Weight of the PR acceptance rate in the maintainer score.
pub const MAINTAINER_ACCEPTANCE_WEIGHT: f64 = 0.35;

/// Reduces raw repository activity into summary metrics.
#[derive(Debug, Clone, Copy)]
pub struct MetricAggregator {
    captured_at: DateTime<Utc>,
}

impl MetricAggregator {
    /// Aggregator measuring ages against the snapshot time.
    pub fn new(captured_at: DateTime<Utc>) -> Self {
        Self { captured_at }
    }

    /// Compute both metric summaries for a repository.
    ///
    /// Negative counts fail with [`MergeScopeError::InvalidSnapshot`].
    ///
    /// [`MergeScopeError::InvalidSnapshot`]: crate::MergeScopeError::InvalidSnapshot
    pub fn aggregate(&self, activity: &RepoActivity) -> Result<(RepoHealth, MaintainerMetrics)> {
        let pulls = recent_pull_requests(&activity.pull_requests);
        Ok((
            self.repo_health(activity, &pulls)?,
            self.maintainer_metrics(activity, &pulls),
        ))
    }

    fn repo_health(
        &self,
        activity: &RepoActivity,
        pulls: &[&PullRequestActivity],
    ) -> Result<RepoHealth> {
        let last_commit_days_ago = activity
            .commits
            .iter()
            .max()
            .map(|newest| elapsed_days(*newest, self.captured_at).floor() as u32)
            .unwrap_or(NO_COMMIT_DAYS);

        let open_issues = count("openIssueCount", activity.open_issue_count)?;
        let closed_issues = count("closedIssueCount", activity.closed_issue_count)?;
        let open_prs = count("openPRCount", activity.open_pr_count)?;
        let issue_closure_rate = ratio(closed_issues, closed_issues + open_issues);
        let merged_in_window = pulls.iter().filter(|pull| pull.merged_at.is_some()).count() as u64;

        let health_score = health_score(
            last_commit_days_ago,
            issue_closure_rate,
            open_prs,
            merged_in_window,
        );

        Ok(RepoHealth {
            last_commit_days_ago,
            issue_closure_rate: round_to(issue_closure_rate, 2),
            open_issues,
            open_prs,
            health_score,
        })
    }

    fn maintainer_metrics(
        &self,
        activity: &RepoActivity,
        pulls: &[&PullRequestActivity],
    ) -> MaintainerMetrics {
        let merge_times: Vec<f64> = pulls
            .iter()
            .filter_map(|pull| pull.merged_at.map(|merged| elapsed_days(pull.opened_at, merged)))
            .collect();
        let avg_merge_time_days = mean(&merge_times).unwrap_or(COLD_MERGE_DAYS);

        let response_times: Vec<f64> = recent_issues(&activity.issue_history)
            .into_iter()
            .filter_map(|entry| {
                entry
                    .first_response_at
                    .map(|responded| elapsed_days(entry.opened_at, responded))
            })
            .collect();
        let avg_issue_response_time_days = mean(&response_times).unwrap_or(COLD_RESPONSE_DAYS);

        let merged = merge_times.len() as u64;
        let rejected = pulls
            .iter()
            .filter(|pull| pull.merged_at.is_none() && pull.closed_at.is_some())
            .count() as u64;
        let pr_acceptance_rate = ratio(merged, merged + rejected);

        let avg_merge_time_days = round_to(avg_merge_time_days, 1);
        let avg_issue_response_time_days = round_to(avg_issue_response_time_days, 1);
        let pr_acceptance_rate = round_to(pr_acceptance_rate, 2);

        MaintainerMetrics {
            avg_merge_time_days,
            avg_issue_response_time_days,
            pr_acceptance_rate,
            maintainer_score: maintainer_score(
                avg_merge_time_days,
                avg_issue_response_time_days,
                pr_acceptance_rate,
            ),
        }
    }
}

/// Health score from its inputs.
///
/// Each term saturates in [0, 1], so one stale metric lowers the score
/// without pinning it to zero.
pub fn health_score(
    last_commit_days_ago: u32,
    issue_closure_rate: f64,
    open_prs: u64,
    merged_throughput: u64,
) -> u8 {
    let freshness = decay(f64::from(last_commit_days_ago), FRESHNESS_HALF_LIFE_DAYS);
    let pressure = open_prs as f64 / merged_throughput.max(1) as f64;
    let backlog = 1.0 / (1.0 + pressure);
    let raw = HEALTH_FRESHNESS_WEIGHT * freshness
        + HEALTH_CLOSURE_WEIGHT * issue_closure_rate.clamp(0.0, 1.0)
        + HEALTH_BACKLOG_WEIGHT * backlog;
    to_score(raw * 100.0)
}

/// Maintainer score from merge speed, responsiveness and acceptance.
pub fn maintainer_score(
    avg_merge_time_days: f64,
    avg_issue_response_time_days: f64,
    pr_acceptance_rate: f64,
) -> u8 {
    let raw = MAINTAINER_MERGE_WEIGHT * decay(avg_merge_time_days, MERGE_HALF_LIFE_DAYS)
        + MAINTAINER_RESPONSE_WEIGHT * decay(avg_issue_response_time_days, RESPONSE_HALF_LIFE_DAYS)
        + MAINTAINER_ACCEPTANCE_WEIGHT * pr_acceptance_rate.clamp(0.0, 1.0);
    to_score(raw * 100.0)
}

pub(crate) fn to_score(value: f64) -> u8 {
    value.clamp(0.0, 100.0).round() as u8
}

pub(crate) fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

// 1 at zero, 0.5 at `half_life`, approaching 0.
fn decay(days: f64, half_life: f64) -> f64 {
    half_life / (half_life + days.max(0.0))
}

fn recent_pull_requests(pulls: &[PullRequestActivity]) -> Vec<&PullRequestActivity> {
    let mut recent: Vec<&PullRequestActivity> = pulls.iter().collect();
    recent.sort_by(|a, b| b.opened_at.cmp(&a.opened_at));
    recent.truncate(LOOKBACK_LIMIT);
    recent
}

fn recent_issues(history: &[IssueActivity]) -> Vec<&IssueActivity> {
    let mut recent: Vec<&IssueActivity> = history.iter().collect();
    recent.sort_by(|a, b| b.opened_at.cmp(&a.opened_at));
    recent.truncate(LOOKBACK_LIMIT);
    recent
}

fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

fn ratio(part: u64, whole: u64) -> f64 {
    if whole == 0 {
        return 0.0;
    }
    part as f64 / whole as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::snapshot::fixtures::{captured_at, days_ago};

    fn merged_pull(opened: i64, merged: i64) -> PullRequestActivity {
        PullRequestActivity {
            opened_at: days_ago(opened),
            merged_at: Some(days_ago(merged)),
            closed_at: Some(days_ago(merged)),
        }
    }

    #[test]
    fn cold_repository_uses_conservative_defaults() {
        let aggregator = MetricAggregator::new(captured_at());
        let (health, maintainer) = aggregator
            .aggregate(&RepoActivity::default())
            .expect("aggregate");

        assert_eq!(health.last_commit_days_ago, NO_COMMIT_DAYS);
        assert_eq!(health.issue_closure_rate, 0.0);
        assert_eq!(health.open_prs, 0);
        assert!(health.health_score < 40, "cold health {}", health.health_score);

        assert_eq!(maintainer.avg_merge_time_days, COLD_MERGE_DAYS);
        assert_eq!(maintainer.avg_issue_response_time_days, COLD_RESPONSE_DAYS);
        assert_eq!(maintainer.pr_acceptance_rate, 0.0);
        assert!(maintainer.maintainer_score < 20);
    }

    #[test]
    fn active_repository_scores_high() {
        let activity = RepoActivity {
            commits: vec![days_ago(10), days_ago(1), days_ago(4)],
            open_issue_count: 10,
            closed_issue_count: 90,
            open_pr_count: 2,
            issue_history: vec![IssueActivity {
                opened_at: days_ago(6),
                closed_at: Some(days_ago(2)),
                first_response_at: Some(days_ago(5)),
            }],
            pull_requests: vec![merged_pull(5, 3), merged_pull(8, 7), merged_pull(20, 18)],
        };
        let (health, maintainer) = MetricAggregator::new(captured_at())
            .aggregate(&activity)
            .expect("aggregate");

        assert_eq!(health.last_commit_days_ago, 1);
        assert_eq!(health.issue_closure_rate, 0.9);
        assert!(health.health_score >= 80, "health {}", health.health_score);

        assert_eq!(maintainer.avg_merge_time_days, 1.7);
        assert_eq!(maintainer.avg_issue_response_time_days, 1.0);
        assert_eq!(maintainer.pr_acceptance_rate, 1.0);
        assert!(maintainer.maintainer_score >= 80);
    }

    #[test]
    fn rejected_pull_requests_lower_acceptance() {
        let activity = RepoActivity {
            pull_requests: vec![
                merged_pull(10, 9),
                PullRequestActivity {
                    opened_at: days_ago(10),
                    merged_at: None,
                    closed_at: Some(days_ago(8)),
                },
                PullRequestActivity {
                    opened_at: days_ago(3),
                    merged_at: None,
                    closed_at: None,
                },
            ],
            ..RepoActivity::default()
        };
        let (_, maintainer) = MetricAggregator::new(captured_at())
            .aggregate(&activity)
            .expect("aggregate");
        assert_eq!(maintainer.pr_acceptance_rate, 0.5);
    }

    #[test]
    fn lookback_window_ignores_oldest_entries() {
        let mut pull_requests: Vec<PullRequestActivity> =
            (0..LOOKBACK_LIMIT as i64).map(|day| merged_pull(day + 1, day)).collect();
        pull_requests.push(merged_pull(400, 200));
        let activity = RepoActivity {
            pull_requests,
            ..RepoActivity::default()
        };
        let (_, maintainer) = MetricAggregator::new(captured_at())
            .aggregate(&activity)
            .expect("aggregate");
        assert_eq!(maintainer.avg_merge_time_days, 1.0);
    }

    #[test]
    fn lookback_window_applies_to_issue_history() {
        let mut issue_history = vec![IssueActivity {
            opened_at: days_ago(400),
            closed_at: None,
            first_response_at: Some(days_ago(200)),
        }];
        issue_history.extend((0..LOOKBACK_LIMIT as i64).map(|day| IssueActivity {
            opened_at: days_ago(day + 1),
            closed_at: None,
            first_response_at: Some(days_ago(day)),
        }));
        let activity = RepoActivity {
            issue_history,
            ..RepoActivity::default()
        };
        let (_, maintainer) = MetricAggregator::new(captured_at())
            .aggregate(&activity)
            .expect("aggregate");
        assert_eq!(maintainer.avg_issue_response_time_days, 1.0);
    }

    #[test]
    fn negative_counts_are_rejected() {
        let activity = RepoActivity {
            open_pr_count: -3,
            ..RepoActivity::default()
        };
        let err = MetricAggregator::new(captured_at())
            .aggregate(&activity)
            .expect_err("negative count");
        assert!(matches!(err, crate::MergeScopeError::InvalidSnapshot(_)));
        assert!(err.to_string().contains("openPRCount is negative (-3)"));
    }

    #[test]
    fn health_score_saturates_and_stays_in_range() {
        assert_eq!(health_score(0, 1.0, 0, 0), 100);
        let stale = health_score(10_000, 0.0, 500, 0);
        assert!(stale <= 1);
        assert!(health_score(400, 0.9, 0, 5) > 50);
    }

    #[test]
    fn maintainer_score_is_monotonic_in_speed() {
        let fast = maintainer_score(1.0, 1.0, 0.5);
        let slow = maintainer_score(20.0, 10.0, 0.5);
        assert!(fast > slow);
        assert_eq!(maintainer_score(0.0, 0.0, 1.0), 100);
    }
}
