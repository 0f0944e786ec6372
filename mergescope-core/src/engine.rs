//! Snapshot scoring entry point.

use log::{debug, warn};

use crate::classifier::Classifier;
use crate::competition::CompetitionAnalyzer;
use crate::domain::{AnalyzeResult, ScoredIssue};
use crate::error::Result;
use crate::metrics::MetricAggregator;
use crate::reasons::ReasonContext;
use crate::scorer::IssueScorer;
use crate::snapshot::RepoSnapshot;

/// Score every issue of a snapshot.
///
/// Pure given its input: the snapshot is validated, metrics aggregated, each
/// issue scored independently, and the result sorted by descending score with
/// ties broken by ascending issue number.
pub fn score(snapshot: &RepoSnapshot) -> Result<AnalyzeResult> {
    if let Err(err) = snapshot.validate() {
        warn!("rejecting snapshot for {}: {err}", snapshot.repo);
        return Err(err);
    }
    let repo = snapshot.repo_ref()?;

    let (repo_health, maintainer_metrics) =
        MetricAggregator::new(snapshot.captured_at).aggregate(&snapshot.activity)?;
    debug!(
        "{repo}: health {} maintainer {} across {} issues",
        repo_health.health_score,
        maintainer_metrics.maintainer_score,
        snapshot.issues.len()
    );

    let analyzer = CompetitionAnalyzer::new();
    let scorer = IssueScorer::new(&repo_health, &maintainer_metrics);
    let classifier = Classifier::new();

    let mut issues: Vec<ScoredIssue> = snapshot
        .issues
        .iter()
        .map(|issue| {
            let competition = analyzer.assess(issue, issue.age_days(snapshot.captured_at))?;
            let idle_days = issue.idle_days(snapshot.captured_at);
            let scored = scorer.score(issue, competition, idle_days);
            let context = ReasonContext {
                issue,
                competition,
                idle_days,
                health: &repo_health,
                maintainer: &maintainer_metrics,
                breakdown: &scored.breakdown,
            };
            let verdict = classifier.evaluate(scored.score, &context);
            Ok(ScoredIssue {
                number: issue.number,
                title: issue.title.clone(),
                competition_level: competition.level,
                competition_score: competition.score,
                score: scored.score,
                merge_probability: scored.merge_probability,
                classification: verdict.classification,
                reasons: verdict.reasons,
            })
        })
        .collect::<Result<_>>()?;

    issues.sort_by(|a, b| b.score.cmp(&a.score).then(a.number.cmp(&b.number)));

    Ok(AnalyzeResult {
        repo: repo.to_string(),
        repo_health,
        maintainer_metrics,
        issues,
    })
}
