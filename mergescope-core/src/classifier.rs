//! Classification of scored issues.
//!
//! Classification is an ordered decision table: the first rule whose
//! predicate matches wins. Reordering [`CLASSIFICATION_RULES`] changes the
//! outcome for borderline issues.

use crate::domain::{Classification, CompetitionLevel};
use crate::reasons::{ReasonContext, explain};

/// Below this score a HIGH-competition issue is HIGH_RISK.
pub const HIGH_RISK_SCORE_CEILING: u8 = 50;
/// At or above this score a contested issue is COMPETITIVE.
pub const CONTESTED_SCORE_FLOOR: u8 = 50;
/// At or above this score an uncontested issue is HIGH_MERGE_PROBABILITY.
pub const HIGH_MERGE_SCORE_FLOOR: u8 = 65;
/// Fallback floor for COMPETITIVE; anything lower is HIGH_RISK.
pub const FALLBACK_COMPETITIVE_FLOOR: u8 = 40;

/// One row of the decision table.
#[derive(Debug, Clone, Copy)]
pub struct ClassificationRule {
    /// Short identifier used in logs and tests.
    pub name: &'static str,
    /// Whether the rule matches a score and competition level.
    pub matches: fn(u8, CompetitionLevel) -> bool,
    /// Classification produced on match.
    pub outcome: Classification,
}

/// Decision table, highest precedence first. The last row always matches.
pub const CLASSIFICATION_RULES: &[ClassificationRule] = &[
    ClassificationRule {
        name: "contested-and-weak",
        matches: contested_and_weak,
        outcome: Classification::HighRisk,
    },
    ClassificationRule {
        name: "contested-but-strong",
        matches: contested_but_strong,
        outcome: Classification::Competitive,
    },
    ClassificationRule {
        name: "open-field",
        matches: open_field,
        outcome: Classification::HighMergeProbability,
    },
    ClassificationRule {
        name: "fallback-competitive",
        matches: fallback_competitive,
        outcome: Classification::Competitive,
    },
    ClassificationRule {
        name: "fallback-risk",
        matches: always,
        outcome: Classification::HighRisk,
    },
];

/// Classification plus its explanation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Verdict {
    /// Classification bucket.
    pub classification: Classification,
    /// Reasons, most influential first.
    pub reasons: Vec<String>,
}

/// Maps scores to classifications and reasons.
#[derive(Debug, Clone, Copy, Default)]
pub struct Classifier;

impl Classifier {
    /// Create a classifier.
    pub fn new() -> Self {
        Self
    }

    /// Classify a scored issue and explain it.
    pub fn evaluate(&self, score: u8, context: &ReasonContext<'_>) -> Verdict {
        Verdict {
            classification: classify(score, context.competition.level),
            reasons: explain(context),
        }
    }
}

/// First matching rule for a score and competition level.
pub fn matching_rule(score: u8, level: CompetitionLevel) -> &'static ClassificationRule {
    CLASSIFICATION_RULES
        .iter()
        .find(|rule| (rule.matches)(score, level))
        .unwrap_or(&CLASSIFICATION_RULES[CLASSIFICATION_RULES.len() - 1])
}

/// Classify a score and competition level.
pub fn classify(score: u8, level: CompetitionLevel) -> Classification {
    matching_rule(score, level).outcome
}

fn contested_and_weak(score: u8, level: CompetitionLevel) -> bool {
    level == CompetitionLevel::High && score < HIGH_RISK_SCORE_CEILING
}

fn contested_but_strong(score: u8, level: CompetitionLevel) -> bool {
    matches!(level, CompetitionLevel::Medium | CompetitionLevel::High)
        && score >= CONTESTED_SCORE_FLOOR
}

fn open_field(score: u8, level: CompetitionLevel) -> bool {
    level == CompetitionLevel::Low && score >= HIGH_MERGE_SCORE_FLOOR
}

fn fallback_competitive(score: u8, _level: CompetitionLevel) -> bool {
    score >= FALLBACK_COMPETITIVE_FLOOR
}

fn always(_score: u8, _level: CompetitionLevel) -> bool {
    true
}
