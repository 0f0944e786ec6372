//! Domain entities for MergeScope.
//!
//! These types are the wire contract with the presentation layer: field names
//! and shapes must not change without updating the client.

use std::fmt;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Summary of a repository's maintenance activity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RepoHealth {
    /// Whole days since the newest commit at snapshot time.
    pub last_commit_days_ago: u32,
    /// Closed issues over all issues, 0-1.
    pub issue_closure_rate: f64,
    /// Open issue count.
    pub open_issues: u64,
    /// Open pull request count.
    #[serde(rename = "openPRs")]
    pub open_prs: u64,
    /// Aggregate health score, 0-100.
    pub health_score: u8,
}

/// Summary of how receptive the maintainers are.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MaintainerMetrics {
    /// Mean days from PR open to merge.
    pub avg_merge_time_days: f64,
    /// Mean days from issue open to first response.
    pub avg_issue_response_time_days: f64,
    /// Merged PRs over resolved PRs, 0-1.
    pub pr_acceptance_rate: f64,
    /// Aggregate maintainer score, 0-100.
    pub maintainer_score: u8,
}

/// How contested an issue is.
#[derive(
    Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, ToSchema,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CompetitionLevel {
    /// Nobody appears to be working on it.
    Low,
    /// Some discussion or a claim exists.
    Medium,
    /// Several contributors are already on it.
    High,
}

impl CompetitionLevel {
    /// Wire label for the level.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Low => "LOW",
            Self::Medium => "MEDIUM",
            Self::High => "HIGH",
        }
    }
}

impl fmt::Display for CompetitionLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of classifying a scored issue.
#[derive(
    Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, ToSchema,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Classification {
    /// Likely to be merged with little contention.
    HighMergeProbability,
    /// Mergeable but contested, or only moderately promising.
    Competitive,
    /// Unlikely to pay off.
    HighRisk,
}

impl Classification {
    /// Every classification, in display order.
    pub const ALL: [Classification; 3] = [
        Classification::HighMergeProbability,
        Classification::Competitive,
        Classification::HighRisk,
    ];

    /// Wire label for the classification.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::HighMergeProbability => "HIGH_MERGE_PROBABILITY",
            Self::Competitive => "COMPETITIVE",
            Self::HighRisk => "HIGH_RISK",
        }
    }

    /// Parse a wire label or a loose spelling such as `high-risk`.
    pub fn parse(value: &str) -> Option<Self> {
        let normalized = value.trim().to_uppercase().replace(['-', ' '], "_");
        Self::ALL
            .into_iter()
            .find(|classification| classification.as_str() == normalized)
    }
}

impl fmt::Display for Classification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An issue after scoring and classification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ScoredIssue {
    /// Issue number within the repository.
    pub number: u64,
    /// Issue title.
    pub title: String,
    /// Competition bucket.
    pub competition_level: CompetitionLevel,
    /// Competition score, 0-100.
    pub competition_score: u8,
    /// Merge score, 0-100.
    pub score: u8,
    /// Merge probability, 0-1, equal to `score / 100`.
    pub merge_probability: f64,
    /// Classification bucket.
    pub classification: Classification,
    /// Explanations, most influential first.
    pub reasons: Vec<String>,
}

/// Result of scoring every issue of one repository snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeResult {
    /// Repository in `owner/name` form.
    pub repo: String,
    /// Repository health metrics.
    pub repo_health: RepoHealth,
    /// Maintainer responsiveness metrics.
    pub maintainer_metrics: MaintainerMetrics,
    /// Scored issues, by descending score then ascending number.
    pub issues: Vec<ScoredIssue>,
}

/// Number of issues per classification.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ClassificationCounts {
    /// Issues classified HIGH_MERGE_PROBABILITY.
    pub high_merge_probability: usize,
    /// Issues classified COMPETITIVE.
    pub competitive: usize,
    /// Issues classified HIGH_RISK.
    pub high_risk: usize,
}

impl ClassificationCounts {
    /// Count for one classification.
    pub fn get(&self, classification: Classification) -> usize {
        match classification {
            Classification::HighMergeProbability => self.high_merge_probability,
            Classification::Competitive => self.competitive,
            Classification::HighRisk => self.high_risk,
        }
    }
}

impl AnalyzeResult {
    /// Tally issues per classification.
    pub fn classification_counts(&self) -> ClassificationCounts {
        let mut counts = ClassificationCounts::default();
        for issue in &self.issues {
            match issue.classification {
                Classification::HighMergeProbability => counts.high_merge_probability += 1,
                Classification::Competitive => counts.competitive += 1,
                Classification::HighRisk => counts.high_risk += 1,
            }
        }
        counts
    }

    /// Rounded mean score, 0 when there are no issues.
    pub fn average_score(&self) -> u8 {
        if self.issues.is_empty() {
            return 0;
        }
        let total: u64 = self.issues.iter().map(|issue| u64::from(issue.score)).sum();
        (total as f64 / self.issues.len() as f64).round() as u8
    }

    /// Copy of the result keeping only issues with the given classification.
    pub fn filtered(&self, classification: Classification) -> AnalyzeResult {
        AnalyzeResult {
            repo: self.repo.clone(),
            repo_health: self.repo_health.clone(),
            maintainer_metrics: self.maintainer_metrics.clone(),
            issues: self
                .issues
                .iter()
                .filter(|issue| issue.classification == classification)
                .cloned()
                .collect(),
        }
    }

    /// Look up a scored issue by number.
    pub fn issue(&self, number: u64) -> Option<&ScoredIssue> {
        self.issues.iter().find(|issue| issue.number == number)
    }
}
