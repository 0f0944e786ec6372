//! Per-issue merge scoring.
//!
//! The score is a sum of fixed-weight contributions, one per [`Signal`],
//! clamped to [0, 100]. Merge probability is linear in the score:
//! `merge_probability = score / 100`. Classification and the client both rely
//! on that proportionality, so the calibration is part of the public contract.

use crate::competition::CompetitionAssessment;
use crate::domain::{CompetitionLevel, MaintainerMetrics, RepoHealth};
use crate::metrics::to_score;
use crate::snapshot::RawIssue;

/// Share of the maintainer score carried into every issue's baseline.
pub const MAINTAINER_BASE_WEIGHT: f64 = 0.50;
/// Share of the health score carried into every issue's baseline.
pub const HEALTH_BASE_WEIGHT: f64 = 0.30;
/// Points removed per competition point.
pub const COMPETITION_WEIGHT: f64 = 0.40;
/// Idle days after which an issue counts as stale.
pub const STALE_ISSUE_DAYS: f64 = 90.0;
/// Penalty for a stale issue.
pub const STALE_ISSUE_PENALTY: f64 = 10.0;
/// Idle days after which an issue counts as abandoned.
pub const ABANDONED_ISSUE_DAYS: f64 = 365.0;
/// Penalty for an abandoned issue, replacing the stale penalty.
pub const ABANDONED_ISSUE_PENALTY: f64 = 20.0;
/// Activity within this many days counts as recent.
pub const RECENT_ACTIVITY_DAYS: f64 = 14.0;
/// Bonus for a recently active issue nobody is competing for.
pub const MOMENTUM_BONUS: f64 = 10.0;
/// Bonus for issues labeled for new contributors.
pub const NEWCOMER_LABEL_BONUS: f64 = 5.0;
/// Labels that mark an issue as suitable for new contributors.
pub const NEWCOMER_LABELS: &[&str] = &["good first issue", "help wanted", "easy", "beginner"];

/// A signal contributing to an issue's score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Signal {
    /// Maintainer receptiveness.
    Maintainer,
    /// Repository health.
    Health,
    /// Competition for the issue.
    Competition,
    /// Time since the issue last saw activity.
    Inactivity,
    /// Recent activity on an uncontested issue.
    Momentum,
    /// Newcomer-friendly labels.
    Labels,
}

/// Additive contribution of each signal to the raw score.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ScoreBreakdown {
    /// Maintainer baseline, positive.
    pub maintainer: f64,
    /// Health baseline, positive.
    pub health: f64,
    /// Competition adjustment, zero or negative.
    pub competition: f64,
    /// Inactivity adjustment, zero or negative.
    pub inactivity: f64,
    /// Momentum bonus, zero or positive.
    pub momentum: f64,
    /// Label bonus, zero or positive.
    pub labels: f64,
}

impl ScoreBreakdown {
    /// Contribution of one signal.
    pub fn contribution(&self, signal: Signal) -> f64 {
        match signal {
            Signal::Maintainer => self.maintainer,
            Signal::Health => self.health,
            Signal::Competition => self.competition,
            Signal::Inactivity => self.inactivity,
            Signal::Momentum => self.momentum,
            Signal::Labels => self.labels,
        }
    }

    /// Unclamped sum of all contributions.
    pub fn total(&self) -> f64 {
        self.maintainer
            + self.health
            + self.competition
            + self.inactivity
            + self.momentum
            + self.labels
    }
}

/// Score of one issue.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IssueScore {
    /// Merge score, 0-100.
    pub score: u8,
    /// Merge probability, 0-1.
    pub merge_probability: f64,
    /// Contribution of each signal.
    pub breakdown: ScoreBreakdown,
}

/// Scores issues against one repository's metrics.
#[derive(Debug, Clone, Copy)]
pub struct IssueScorer<'a> {
    health: &'a RepoHealth,
    maintainer: &'a MaintainerMetrics,
}

impl<'a> IssueScorer<'a> {
    /// Scorer for a repository with the given metrics.
    pub fn new(health: &'a RepoHealth, maintainer: &'a MaintainerMetrics) -> Self {
        Self { health, maintainer }
    }

    /// Score an issue idle for `idle_days` with the given competition.
    pub fn score(
        &self,
        issue: &RawIssue,
        competition: CompetitionAssessment,
        idle_days: f64,
    ) -> IssueScore {
        let momentum = if competition.level == CompetitionLevel::Low
            && idle_days <= RECENT_ACTIVITY_DAYS
        {
            MOMENTUM_BONUS
        } else {
            0.0
        };

        let breakdown = ScoreBreakdown {
            maintainer: MAINTAINER_BASE_WEIGHT * f64::from(self.maintainer.maintainer_score),
            health: HEALTH_BASE_WEIGHT * f64::from(self.health.health_score),
            competition: -COMPETITION_WEIGHT * f64::from(competition.score),
            inactivity: -inactivity_penalty(idle_days),
            momentum,
            labels: if is_newcomer_friendly(&issue.labels) {
                NEWCOMER_LABEL_BONUS
            } else {
                0.0
            },
        };

        let score = to_score(breakdown.total());
        IssueScore {
            score,
            merge_probability: merge_probability(score),
            breakdown,
        }
    }
}

/// Linear calibration from score to merge probability.
pub fn merge_probability(score: u8) -> f64 {
    f64::from(score.min(100)) / 100.0
}

fn inactivity_penalty(idle_days: f64) -> f64 {
    if idle_days >= ABANDONED_ISSUE_DAYS {
        ABANDONED_ISSUE_PENALTY
    } else if idle_days >= STALE_ISSUE_DAYS {
        STALE_ISSUE_PENALTY
    } else {
        0.0
    }
}

/// Whether any label marks the issue as suitable for new contributors.
pub fn is_newcomer_friendly(labels: &[String]) -> bool {
    labels.iter().any(|label| {
        let normalized = label.trim().to_lowercase().replace(['-', '_'], " ");
        NEWCOMER_LABELS.contains(&normalized.as_str())
    })
}
