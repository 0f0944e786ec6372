//! Per-issue competition estimates.

use crate::domain::CompetitionLevel;
use crate::error::Result;
use crate::metrics::to_score;
use crate::snapshot::{RawIssue, count};

/// Points added per open pull request linked to the issue.
pub const LINKED_PR_POINTS: f64 = 30.0;
/// Ceiling on linked pull request points.
pub const LINKED_PR_CAP: f64 = 60.0;
/// Points added per comment per week of issue age.
pub const COMMENT_VELOCITY_POINTS: f64 = 10.0;
/// Ceiling on comment velocity points.
pub const COMMENT_VELOCITY_CAP: f64 = 30.0;
/// Fixed points added when the issue is assigned.
pub const ASSIGNEE_PENALTY: f64 = 25.0;
/// Age floor for comment velocity, so brand-new issues are not inflated.
pub const MIN_VELOCITY_WINDOW_DAYS: f64 = 7.0;

/// Scores below this are LOW.
pub const LOW_COMPETITION_CEILING: u8 = 30;
/// Scores below this (and not LOW) are MEDIUM; the rest are HIGH.
pub const MEDIUM_COMPETITION_CEILING: u8 = 70;

/// How contested one issue is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompetitionAssessment {
    /// Competition score, 0-100.
    pub score: u8,
    /// Bucket for the score.
    pub level: CompetitionLevel,
}

/// Estimates how contested an issue is.
#[derive(Debug, Clone, Copy, Default)]
pub struct CompetitionAnalyzer;

impl CompetitionAnalyzer {
    /// Create an analyzer.
    pub fn new() -> Self {
        Self
    }

    /// Assess an issue that is `age_days` old.
    ///
    /// Negative comment or linked PR counts are rejected, not zeroed.
    pub fn assess(&self, issue: &RawIssue, age_days: f64) -> Result<CompetitionAssessment> {
        let label = format!("issue #{}", issue.number);
        let linked_prs = count(&format!("{label} linkedPRCount"), issue.linked_pr_count)?;
        let comments = count(&format!("{label} comments"), issue.comments)?;

        let linked = (linked_prs as f64 * LINKED_PR_POINTS).min(LINKED_PR_CAP);

        let weeks = age_days.max(MIN_VELOCITY_WINDOW_DAYS) / 7.0;
        let velocity = comments as f64 / weeks;
        let discussion = (velocity * COMMENT_VELOCITY_POINTS).min(COMMENT_VELOCITY_CAP);

        let claimed = if issue.has_assignee {
            ASSIGNEE_PENALTY
        } else {
            0.0
        };

        let score = to_score(linked + discussion + claimed);
        Ok(CompetitionAssessment {
            score,
            level: competition_level(score),
        })
    }
}

/// Bucket a competition score.
pub fn competition_level(score: u8) -> CompetitionLevel {
    if score < LOW_COMPETITION_CEILING {
        CompetitionLevel::Low
    } else if score < MEDIUM_COMPETITION_CEILING {
        CompetitionLevel::Medium
    } else {
        CompetitionLevel::High
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::snapshot::fixtures::raw_issue;

    #[test]
    fn quiet_issue_is_low() {
        let mut issue = raw_issue(1, 5);
        issue.comments = 1;
        let assessment = CompetitionAnalyzer::new().assess(&issue, 5.0).expect("assess");
        assert_eq!(assessment.score, 10);
        assert_eq!(assessment.level, CompetitionLevel::Low);
    }

    #[test]
    fn linked_prs_and_assignee_make_it_high() {
        let mut issue = raw_issue(2, 30);
        issue.linked_pr_count = 2;
        issue.has_assignee = true;
        let assessment = CompetitionAnalyzer::new().assess(&issue, 30.0).expect("assess");
        assert_eq!(assessment.score, 85);
        assert_eq!(assessment.level, CompetitionLevel::High);
    }

    #[test]
    fn linked_pr_points_are_capped() {
        let mut issue = raw_issue(3, 30);
        issue.linked_pr_count = 9;
        let assessment = CompetitionAnalyzer::new().assess(&issue, 30.0).expect("assess");
        assert_eq!(assessment.score, LINKED_PR_CAP as u8);
        assert_eq!(assessment.level, CompetitionLevel::Medium);
    }

    #[test]
    fn comment_velocity_uses_issue_age() {
        let mut issue = raw_issue(4, 70);
        issue.comments = 10;
        // 10 comments over 10 weeks is one per week.
        assert_eq!(CompetitionAnalyzer::new().assess(&issue, 70.0).expect("assess").score, 10);
        // The same discussion in a single week saturates.
        assert_eq!(CompetitionAnalyzer::new().assess(&issue, 2.0).expect("assess").score, 30);
    }

    #[test]
    fn negative_counts_are_rejected() {
        let mut issue = raw_issue(5, 10);
        issue.comments = -1;
        let err = CompetitionAnalyzer::new()
            .assess(&issue, 10.0)
            .expect_err("negative comments");
        assert_eq!(err.to_string(), "invalid snapshot: issue #5 comments is negative (-1)");

        let mut issue = raw_issue(6, 10);
        issue.linked_pr_count = -2;
        assert!(CompetitionAnalyzer::new().assess(&issue, 10.0).is_err());
    }

    #[test]
    fn level_thresholds_are_exclusive_upper_bounds() {
        assert_eq!(competition_level(29), CompetitionLevel::Low);
        assert_eq!(competition_level(30), CompetitionLevel::Medium);
        assert_eq!(competition_level(69), CompetitionLevel::Medium);
        assert_eq!(competition_level(70), CompetitionLevel::High);
        assert_eq!(competition_level(100), CompetitionLevel::High);
    }
}
