//! Human-readable reasons behind an issue's score.
//!
//! Each [`ReasonRule`] ties a phrase to the [`Signal`] it explains and a
//! trigger. Triggered phrases are ordered by the size of their signal's
//! contribution to the score, largest first; equal contributions keep table
//! order. The client shows the first three, so this order is observable.

use std::cmp::Ordering;

use crate::competition::CompetitionAssessment;
use crate::domain::{CompetitionLevel, MaintainerMetrics, RepoHealth};
use crate::scorer::{ABANDONED_ISSUE_DAYS, STALE_ISSUE_DAYS, ScoreBreakdown, Signal};
use crate::snapshot::RawIssue;

/// Maintainer score at or above which maintainers count as receptive.
pub const RECEPTIVE_MAINTAINER_SCORE: u8 = 70;
/// Response time at or below which maintainers count as quick.
pub const QUICK_RESPONSE_DAYS: f64 = 2.0;
/// Merge time at or below which merges count as fast.
pub const FAST_MERGE_DAYS: f64 = 3.0;
/// Response time above which maintainers count as slow.
pub const SLOW_RESPONSE_DAYS: f64 = 14.0;
/// Acceptance rate below which few pull requests land.
pub const LOW_ACCEPTANCE_RATE: f64 = 0.3;
/// Health score at or above which a repository counts as healthy.
pub const HEALTHY_REPO_SCORE: u8 = 70;
/// Health score below which a repository counts as inactive.
pub const UNHEALTHY_REPO_SCORE: u8 = 40;

/// Everything a reason trigger may look at.
#[derive(Debug, Clone, Copy)]
pub struct ReasonContext<'a> {
    /// The issue being explained.
    pub issue: &'a RawIssue,
    /// Its competition assessment.
    pub competition: CompetitionAssessment,
    /// Days since its last activity.
    pub idle_days: f64,
    /// Repository health.
    pub health: &'a RepoHealth,
    /// Maintainer metrics.
    pub maintainer: &'a MaintainerMetrics,
    /// Score contributions.
    pub breakdown: &'a ScoreBreakdown,
}

/// A phrase emitted when its trigger fires.
#[derive(Debug, Clone, Copy)]
pub struct ReasonRule {
    /// Signal whose contribution ranks the phrase.
    pub signal: Signal,
    /// Whether the phrase applies.
    pub applies: fn(&ReasonContext<'_>) -> bool,
    /// Text shown to the user.
    pub phrase: &'static str,
}

/// Reason table in tie-break order.
pub const REASON_RULES: &[ReasonRule] = &[
    ReasonRule {
        signal: Signal::Maintainer,
        applies: receptive_maintainers,
        phrase: "Receptive maintainers",
    },
    ReasonRule {
        signal: Signal::Maintainer,
        applies: quick_response,
        phrase: "Maintainer responds quickly",
    },
    ReasonRule {
        signal: Signal::Maintainer,
        applies: fast_merges,
        phrase: "PRs merged within days",
    },
    ReasonRule {
        signal: Signal::Maintainer,
        applies: slow_response,
        phrase: "Slow maintainer response",
    },
    ReasonRule {
        signal: Signal::Maintainer,
        applies: low_acceptance,
        phrase: "Few pull requests accepted",
    },
    ReasonRule {
        signal: Signal::Health,
        applies: healthy_repo,
        phrase: "Healthy repository",
    },
    ReasonRule {
        signal: Signal::Health,
        applies: unhealthy_repo,
        phrase: "Low repository activity",
    },
    ReasonRule {
        signal: Signal::Competition,
        applies: low_competition,
        phrase: "Low competition",
    },
    ReasonRule {
        signal: Signal::Competition,
        applies: high_competition,
        phrase: "High competition",
    },
    ReasonRule {
        signal: Signal::Competition,
        applies: linked_pull_request,
        phrase: "Pull request already linked",
    },
    ReasonRule {
        signal: Signal::Competition,
        applies: assigned,
        phrase: "Already assigned",
    },
    ReasonRule {
        signal: Signal::Inactivity,
        applies: abandoned,
        phrase: "Issue inactive 365+ days",
    },
    ReasonRule {
        signal: Signal::Inactivity,
        applies: stale,
        phrase: "Issue inactive 90+ days",
    },
    ReasonRule {
        signal: Signal::Momentum,
        applies: momentum,
        phrase: "Recently active",
    },
    ReasonRule {
        signal: Signal::Labels,
        applies: newcomer_label,
        phrase: "Labeled for new contributors",
    },
];

/// Triggered phrases, most influential first.
pub fn explain(context: &ReasonContext<'_>) -> Vec<String> {
    let mut triggered: Vec<(f64, &ReasonRule)> = REASON_RULES
        .iter()
        .filter(|rule| (rule.applies)(context))
        .map(|rule| (context.breakdown.contribution(rule.signal).abs(), rule))
        .collect();
    // Stable sort: equal magnitudes keep table order.
    triggered.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(Ordering::Equal));
    triggered
        .into_iter()
        .map(|(_, rule)| rule.phrase.to_string())
        .collect()
}

fn receptive_maintainers(context: &ReasonContext<'_>) -> bool {
    context.maintainer.maintainer_score >= RECEPTIVE_MAINTAINER_SCORE
}

fn quick_response(context: &ReasonContext<'_>) -> bool {
    context.maintainer.avg_issue_response_time_days <= QUICK_RESPONSE_DAYS
}

fn fast_merges(context: &ReasonContext<'_>) -> bool {
    context.maintainer.avg_merge_time_days <= FAST_MERGE_DAYS
}

fn slow_response(context: &ReasonContext<'_>) -> bool {
    context.maintainer.avg_issue_response_time_days > SLOW_RESPONSE_DAYS
}

fn low_acceptance(context: &ReasonContext<'_>) -> bool {
    context.maintainer.pr_acceptance_rate < LOW_ACCEPTANCE_RATE
}

fn healthy_repo(context: &ReasonContext<'_>) -> bool {
    context.health.health_score >= HEALTHY_REPO_SCORE
}

fn unhealthy_repo(context: &ReasonContext<'_>) -> bool {
    context.health.health_score < UNHEALTHY_REPO_SCORE
}

fn low_competition(context: &ReasonContext<'_>) -> bool {
    context.competition.level == CompetitionLevel::Low
}

fn high_competition(context: &ReasonContext<'_>) -> bool {
    context.competition.level == CompetitionLevel::High
}

fn linked_pull_request(context: &ReasonContext<'_>) -> bool {
    context.issue.linked_pr_count > 0
}

fn assigned(context: &ReasonContext<'_>) -> bool {
    context.issue.has_assignee
}

fn abandoned(context: &ReasonContext<'_>) -> bool {
    context.idle_days >= ABANDONED_ISSUE_DAYS
}

fn stale(context: &ReasonContext<'_>) -> bool {
    context.idle_days >= STALE_ISSUE_DAYS && context.idle_days < ABANDONED_ISSUE_DAYS
}

fn momentum(context: &ReasonContext<'_>) -> bool {
    context.breakdown.momentum > 0.0
}

fn newcomer_label(context: &ReasonContext<'_>) -> bool {
    context.breakdown.labels > 0.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::competition::competition_level;
    use crate::snapshot::fixtures::raw_issue;

    struct Fixture {
        issue: RawIssue,
        health: RepoHealth,
        maintainer: MaintainerMetrics,
        breakdown: ScoreBreakdown,
        competition: u8,
        idle_days: f64,
    }

    impl Fixture {
        fn new() -> Self {
            Self {
                issue: raw_issue(1, 5),
                health: RepoHealth {
                    last_commit_days_ago: 3,
                    issue_closure_rate: 0.5,
                    open_issues: 10,
                    open_prs: 2,
                    health_score: 55,
                },
                maintainer: MaintainerMetrics {
                    avg_merge_time_days: 10.0,
                    avg_issue_response_time_days: 5.0,
                    pr_acceptance_rate: 0.6,
                    maintainer_score: 50,
                },
                breakdown: ScoreBreakdown::default(),
                competition: 40,
                idle_days: 20.0,
            }
        }

        fn explain(&self) -> Vec<String> {
            let context = ReasonContext {
                issue: &self.issue,
                competition: CompetitionAssessment {
                    score: self.competition,
                    level: competition_level(self.competition),
                },
                idle_days: self.idle_days,
                health: &self.health,
                maintainer: &self.maintainer,
                breakdown: &self.breakdown,
            };
            explain(&context)
        }
    }

    #[test]
    fn neutral_issue_has_no_reasons() {
        assert!(Fixture::new().explain().is_empty());
    }

    #[test]
    fn orders_by_contribution_magnitude() {
        let mut fixture = Fixture::new();
        fixture.maintainer.maintainer_score = 80;
        fixture.health.health_score = 90;
        fixture.competition = 10;
        fixture.breakdown = ScoreBreakdown {
            maintainer: 40.0,
            health: 27.0,
            competition: -4.0,
            momentum: 10.0,
            ..ScoreBreakdown::default()
        };

        assert_eq!(
            fixture.explain(),
            vec![
                "Receptive maintainers",
                "Healthy repository",
                "Recently active",
                "Low competition",
            ]
        );
    }

    #[test]
    fn equal_magnitudes_keep_table_order() {
        let mut fixture = Fixture::new();
        fixture.competition = 85;
        fixture.issue.linked_pr_count = 2;
        fixture.issue.has_assignee = true;
        fixture.breakdown.competition = -34.0;
        fixture.breakdown.maintainer = 25.0;

        assert_eq!(
            fixture.explain(),
            vec![
                "High competition",
                "Pull request already linked",
                "Already assigned",
            ]
        );
    }

    #[test]
    fn inactivity_phrases_are_exclusive() {
        let mut fixture = Fixture::new();
        fixture.idle_days = 120.0;
        fixture.breakdown.inactivity = -10.0;
        assert_eq!(fixture.explain(), vec!["Issue inactive 90+ days"]);

        fixture.idle_days = 500.0;
        fixture.breakdown.inactivity = -20.0;
        assert_eq!(fixture.explain(), vec!["Issue inactive 365+ days"]);
    }

    #[test]
    fn flags_slow_and_unreceptive_maintainers() {
        let mut fixture = Fixture::new();
        fixture.maintainer.avg_issue_response_time_days = 30.0;
        fixture.maintainer.pr_acceptance_rate = 0.1;
        fixture.health.health_score = 20;
        fixture.breakdown.maintainer = 5.0;
        fixture.breakdown.health = 6.0;

        assert_eq!(
            fixture.explain(),
            vec![
                "Low repository activity",
                "Slow maintainer response",
                "Few pull requests accepted",
            ]
        );
    }
}
