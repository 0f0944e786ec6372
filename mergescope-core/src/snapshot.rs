//! Snapshot input types and validation.
//!
//! A snapshot is a point-in-time capture of a repository. Every age the
//! engine uses is measured against [`RepoSnapshot::captured_at`], never the
//! wall clock, so scoring the same snapshot twice gives the same answer.
//! Counts are signed on the wire so that impossible values can be rejected
//! with a useful message instead of a deserialization failure.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::error::{MergeScopeError, Result};
use crate::repo_ref::RepoRef;

const SECONDS_PER_DAY: f64 = 86_400.0;

/// Point-in-time capture of a repository used as scoring input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RepoSnapshot {
    /// Repository in `owner/name` form.
    pub repo: String,
    /// When the snapshot was taken.
    pub captured_at: DateTime<Utc>,
    /// Repository-level activity.
    #[serde(default)]
    pub activity: RepoActivity,
    /// Open issues to score.
    #[serde(default)]
    pub issues: Vec<RawIssue>,
}

/// Repository-level activity counts and history.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RepoActivity {
    /// Commit timestamps on the default branch.
    #[serde(default)]
    pub commits: Vec<DateTime<Utc>>,
    /// Currently open issues.
    #[serde(default)]
    pub open_issue_count: i64,
    /// Issues closed over the repository's lifetime.
    #[serde(default)]
    pub closed_issue_count: i64,
    /// Currently open pull requests.
    #[serde(default, rename = "openPRCount")]
    pub open_pr_count: i64,
    /// Recent issues with their close and first-response times.
    #[serde(default)]
    pub issue_history: Vec<IssueActivity>,
    /// Recent pull requests with their merge and close times.
    #[serde(default)]
    pub pull_requests: Vec<PullRequestActivity>,
}

/// Lifecycle timestamps of one historical issue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct IssueActivity {
    /// When the issue was opened.
    pub opened_at: DateTime<Utc>,
    /// When the issue was closed, if it was.
    #[serde(default)]
    pub closed_at: Option<DateTime<Utc>>,
    /// First maintainer response, if any.
    #[serde(default)]
    pub first_response_at: Option<DateTime<Utc>>,
}

/// Lifecycle timestamps of one historical pull request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PullRequestActivity {
    /// When the pull request was opened.
    pub opened_at: DateTime<Utc>,
    /// When it was merged, if it was.
    #[serde(default)]
    pub merged_at: Option<DateTime<Utc>>,
    /// When it was closed (merged or not), if it was.
    #[serde(default)]
    pub closed_at: Option<DateTime<Utc>>,
}

/// An open issue as fetched for a scan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RawIssue {
    /// Issue number, unique within the repository.
    pub number: u64,
    /// Issue title.
    pub title: String,
    /// When the issue was opened.
    pub created_at: DateTime<Utc>,
    /// Last activity on the issue, if known.
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
    /// Comment count.
    #[serde(default)]
    pub comments: i64,
    /// Open pull requests referencing the issue.
    #[serde(default, rename = "linkedPRCount")]
    pub linked_pr_count: i64,
    /// Whether someone is assigned.
    #[serde(default)]
    pub has_assignee: bool,
    /// Issue labels.
    #[serde(default)]
    pub labels: Vec<String>,
}

impl RawIssue {
    /// Days since the issue was opened.
    pub fn age_days(&self, captured_at: DateTime<Utc>) -> f64 {
        elapsed_days(self.created_at, captured_at)
    }

    /// Days since the last recorded activity, falling back to creation.
    pub fn idle_days(&self, captured_at: DateTime<Utc>) -> f64 {
        elapsed_days(self.updated_at.unwrap_or(self.created_at), captured_at)
    }
}

impl RepoSnapshot {
    /// Decode a snapshot from JSON.
    pub fn from_json(contents: &str) -> Result<Self> {
        Ok(serde_json::from_str(contents)?)
    }

    /// Parsed repository reference.
    pub fn repo_ref(&self) -> Result<RepoRef> {
        RepoRef::parse(&self.repo)
    }

    /// Reject snapshots holding impossible data.
    ///
    /// Nothing is corrected: a negative count, a timestamp after
    /// `captured_at`, an event preceding its opening, or a duplicate issue
    /// number all fail with [`MergeScopeError::InvalidSnapshot`].
    pub fn validate(&self) -> Result<()> {
        self.repo_ref()
            .map_err(|err| MergeScopeError::InvalidSnapshot(err.to_string()))?;

        let activity = &self.activity;
        count("openIssueCount", activity.open_issue_count)?;
        count("closedIssueCount", activity.closed_issue_count)?;
        count("openPRCount", activity.open_pr_count)?;

        for commit in &activity.commits {
            self.ensure_not_future("commit", *commit)?;
        }

        for (index, entry) in activity.issue_history.iter().enumerate() {
            let label = format!("issueHistory[{index}]");
            self.ensure_not_future(&label, entry.opened_at)?;
            if let Some(closed_at) = entry.closed_at {
                self.ensure_not_future(&label, closed_at)?;
                ensure_ordered(&label, "closedAt", entry.opened_at, closed_at)?;
            }
            if let Some(responded_at) = entry.first_response_at {
                self.ensure_not_future(&label, responded_at)?;
                ensure_ordered(&label, "firstResponseAt", entry.opened_at, responded_at)?;
            }
        }

        for (index, pull) in activity.pull_requests.iter().enumerate() {
            let label = format!("pullRequests[{index}]");
            self.ensure_not_future(&label, pull.opened_at)?;
            if let Some(merged_at) = pull.merged_at {
                self.ensure_not_future(&label, merged_at)?;
                ensure_ordered(&label, "mergedAt", pull.opened_at, merged_at)?;
            }
            if let Some(closed_at) = pull.closed_at {
                self.ensure_not_future(&label, closed_at)?;
                ensure_ordered(&label, "closedAt", pull.opened_at, closed_at)?;
            }
        }

        let mut seen = BTreeSet::new();
        for issue in &self.issues {
            let label = format!("issue #{}", issue.number);
            if !seen.insert(issue.number) {
                return Err(MergeScopeError::InvalidSnapshot(format!(
                    "duplicate {label}"
                )));
            }
            count(&format!("{label} comments"), issue.comments)?;
            count(&format!("{label} linkedPRCount"), issue.linked_pr_count)?;
            self.ensure_not_future(&label, issue.created_at)?;
            if let Some(updated_at) = issue.updated_at {
                self.ensure_not_future(&label, updated_at)?;
                ensure_ordered(&label, "updatedAt", issue.created_at, updated_at)?;
            }
        }

        Ok(())
    }

    fn ensure_not_future(&self, label: &str, at: DateTime<Utc>) -> Result<()> {
        if at > self.captured_at {
            return Err(MergeScopeError::InvalidSnapshot(format!(
                "{label} has timestamp {} after capture time {}",
                at.to_rfc3339(),
                self.captured_at.to_rfc3339()
            )));
        }
        Ok(())
    }
}

/// Fractional days from `earlier` to `later`, never negative.
pub(crate) fn elapsed_days(earlier: DateTime<Utc>, later: DateTime<Utc>) -> f64 {
    let seconds = (later - earlier).num_seconds().max(0);
    seconds as f64 / SECONDS_PER_DAY
}

/// A wire count as unsigned, rejecting negative values.
pub(crate) fn count(label: &str, value: i64) -> Result<u64> {
    u64::try_from(value)
        .map_err(|_| MergeScopeError::InvalidSnapshot(format!("{label} is negative ({value})")))
}

fn ensure_ordered(
    label: &str,
    field: &str,
    opened_at: DateTime<Utc>,
    at: DateTime<Utc>,
) -> Result<()> {
    if at < opened_at {
        return Err(MergeScopeError::InvalidSnapshot(format!(
            "{label} {field} precedes opening"
        )));
    }
    Ok(())
}
