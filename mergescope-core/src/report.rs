//! Report formatting utilities for MergeScope outputs.

use std::fmt::Write;

use serde::{Deserialize, Serialize};

use crate::domain::{AnalyzeResult, Classification, ScoredIssue};

/// Reasons shown per issue in summaries.
pub const SUMMARY_REASON_LIMIT: usize = 3;

/// Outcome of scoring one snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", content = "message", rename_all = "snake_case")]
pub enum ScanStatus {
    /// The snapshot was scored.
    Scored,
    /// Loading or scoring failed with an error message.
    Failed(String),
}

/// Scoring report for one snapshot source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanReport {
    /// Snapshot source (file path or repository).
    pub source: String,
    /// Scan status.
    pub status: ScanStatus,
    /// Scoring result, present when scored.
    pub result: Option<AnalyzeResult>,
}

impl ScanReport {
    /// Report for a scored snapshot.
    pub fn scored(source: impl Into<String>, result: AnalyzeResult) -> Self {
        Self {
            source: source.into(),
            status: ScanStatus::Scored,
            result: Some(result),
        }
    }

    /// Report for a snapshot that could not be scored.
    pub fn failed(source: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            status: ScanStatus::Failed(error.into()),
            result: None,
        }
    }
}

/// Render a list of scan reports as Markdown.
pub fn render_scan_markdown(reports: &[ScanReport]) -> String {
    let mut output = String::new();
    let _ = writeln!(output, "# MergeScope Report\n");
    for report in reports {
        let _ = writeln!(output, "## {}\n", report.source);
        append_status(&mut output, &report.status);
        if let Some(result) = &report.result {
            append_analysis(&mut output, result);
        }
        let _ = writeln!(output);
    }
    output
}

/// Render one analysis as Markdown.
pub fn render_analysis_markdown(result: &AnalyzeResult) -> String {
    let mut output = String::new();
    let _ = writeln!(output, "# MergeScope Report\n");
    let _ = writeln!(output, "## {}\n", result.repo);
    append_analysis(&mut output, result);
    output
}

/// Render one analysis as plain text.
pub fn render_analysis_text(result: &AnalyzeResult) -> String {
    let mut output = String::new();
    let health = &result.repo_health;
    let maintainer = &result.maintainer_metrics;
    let _ = writeln!(output, "Repository: {}", result.repo);
    let _ = writeln!(
        output,
        "Health: {} (last commit {} days ago, closure rate {:.2}, {} open issues, {} open PRs)",
        health.health_score,
        health.last_commit_days_ago,
        health.issue_closure_rate,
        health.open_issues,
        health.open_prs
    );
    let _ = writeln!(
        output,
        "Maintainers: {} (merge {:.1}d, response {:.1}d, acceptance {:.2})",
        maintainer.maintainer_score,
        maintainer.avg_merge_time_days,
        maintainer.avg_issue_response_time_days,
        maintainer.pr_acceptance_rate
    );
    let _ = writeln!(
        output,
        "Issues: {} (average score {})",
        result.issues.len(),
        result.average_score()
    );
    let counts = result.classification_counts();
    for classification in Classification::ALL {
        let _ = writeln!(
            output,
            "  {classification}: {}",
            counts.get(classification)
        );
    }
    for issue in &result.issues {
        let _ = writeln!(output, "{}", issue_line(issue));
    }
    output
}

/// Render one scored issue with every reason.
pub fn render_issue_text(repo: &str, issue: &ScoredIssue) -> String {
    let mut output = String::new();
    let _ = writeln!(output, "{repo}#{}: {}", issue.number, issue.title);
    let _ = writeln!(
        output,
        "Score: {} (merge probability {:.2})",
        issue.score, issue.merge_probability
    );
    let _ = writeln!(
        output,
        "Competition: {} ({})",
        issue.competition_level, issue.competition_score
    );
    let _ = writeln!(output, "Classification: {}", issue.classification);
    if issue.reasons.is_empty() {
        let _ = writeln!(output, "Reasons: none");
    } else {
        let _ = writeln!(output, "Reasons:");
        for reason in &issue.reasons {
            let _ = writeln!(output, "- {reason}");
        }
    }
    output
}

/// Render one scored issue as Markdown.
pub fn render_issue_markdown(repo: &str, issue: &ScoredIssue) -> String {
    let mut output = String::new();
    let _ = writeln!(output, "# {repo}#{}: {}\n", issue.number, issue.title);
    let _ = writeln!(output, "- Score: {}", issue.score);
    let _ = writeln!(output, "- Merge probability: {:.2}", issue.merge_probability);
    let _ = writeln!(
        output,
        "- Competition: {} ({})",
        issue.competition_level, issue.competition_score
    );
    let _ = writeln!(output, "- Classification: {}\n", issue.classification);
    if issue.reasons.is_empty() {
        let _ = writeln!(output, "### Reasons\nNo reasons recorded.");
        return output;
    }
    let _ = writeln!(output, "### Reasons");
    for reason in &issue.reasons {
        let _ = writeln!(output, "- {reason}");
    }
    output
}

/// Render any serializable report payload as JSON.
pub fn render_json<T: Serialize + ?Sized>(payload: &T) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(payload)
}

/// Leading reasons joined for one-line summaries.
pub fn summarize_reasons(reasons: &[String]) -> String {
    reasons
        .iter()
        .take(SUMMARY_REASON_LIMIT)
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}

fn issue_line(issue: &ScoredIssue) -> String {
    let mut line = format!(
        "  #{} [{}] score {} competition {}: {}",
        issue.number, issue.classification, issue.score, issue.competition_level, issue.title
    );
    if !issue.reasons.is_empty() {
        let _ = write!(line, " ({})", summarize_reasons(&issue.reasons));
    }
    line
}

fn append_status(output: &mut String, status: &ScanStatus) {
    match status {
        ScanStatus::Scored => {
            let _ = writeln!(output, "- Status: scored");
        }
        ScanStatus::Failed(error) => {
            let _ = writeln!(output, "- Status: failed ({error})");
        }
    }
    let _ = writeln!(output);
}

fn append_analysis(output: &mut String, result: &AnalyzeResult) {
    let health = &result.repo_health;
    let maintainer = &result.maintainer_metrics;
    let _ = writeln!(output, "### Repository");
    let _ = writeln!(output, "- Health score: {}", health.health_score);
    let _ = writeln!(
        output,
        "- Last commit: {} days ago",
        health.last_commit_days_ago
    );
    let _ = writeln!(
        output,
        "- Issue closure rate: {:.2}",
        health.issue_closure_rate
    );
    let _ = writeln!(output, "- Open issues: {}", health.open_issues);
    let _ = writeln!(output, "- Open PRs: {}\n", health.open_prs);

    let _ = writeln!(output, "### Maintainers");
    let _ = writeln!(output, "- Maintainer score: {}", maintainer.maintainer_score);
    let _ = writeln!(
        output,
        "- Average merge time: {:.1} days",
        maintainer.avg_merge_time_days
    );
    let _ = writeln!(
        output,
        "- Average response time: {:.1} days",
        maintainer.avg_issue_response_time_days
    );
    let _ = writeln!(
        output,
        "- PR acceptance rate: {:.2}\n",
        maintainer.pr_acceptance_rate
    );

    let counts = result.classification_counts();
    let _ = writeln!(output, "### Summary");
    let _ = writeln!(output, "- Issues: {}", result.issues.len());
    let _ = writeln!(output, "- Average score: {}", result.average_score());
    for classification in Classification::ALL {
        let _ = writeln!(
            output,
            "- {classification}: {}",
            counts.get(classification)
        );
    }
    let _ = writeln!(output);

    if result.issues.is_empty() {
        let _ = writeln!(output, "### Issues\nNo open issues.\n");
        return;
    }
    let _ = writeln!(output, "### Issues");
    let _ = writeln!(
        output,
        "| # | Title | Score | Competition | Classification | Reasons |"
    );
    let _ = writeln!(output, "|---|---|---|---|---|---|");
    for issue in &result.issues {
        let _ = writeln!(
            output,
            "| {} | {} | {} | {} | {} | {} |",
            issue.number,
            escape_cell(&issue.title),
            issue.score,
            issue.competition_level,
            issue.classification,
            escape_cell(&summarize_reasons(&issue.reasons))
        );
    }
    let _ = writeln!(output);
}

fn escape_cell(value: &str) -> String {
    value.replace('|', "\\|").replace('\n', " ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{CompetitionLevel, MaintainerMetrics, RepoHealth};

    fn sample_result() -> AnalyzeResult {
        AnalyzeResult {
            repo: "octo/cat".to_string(),
            repo_health: RepoHealth {
                last_commit_days_ago: 2,
                issue_closure_rate: 0.75,
                open_issues: 12,
                open_prs: 3,
                health_score: 80,
            },
            maintainer_metrics: MaintainerMetrics {
                avg_merge_time_days: 1.5,
                avg_issue_response_time_days: 0.5,
                pr_acceptance_rate: 0.9,
                maintainer_score: 75,
            },
            issues: vec![
                ScoredIssue {
                    number: 7,
                    title: "Fix | pipe".to_string(),
                    competition_level: CompetitionLevel::Low,
                    competition_score: 10,
                    score: 68,
                    merge_probability: 0.68,
                    classification: Classification::HighMergeProbability,
                    reasons: vec![
                        "Receptive maintainers".to_string(),
                        "Healthy repository".to_string(),
                        "Recently active".to_string(),
                        "Low competition".to_string(),
                    ],
                },
                ScoredIssue {
                    number: 9,
                    title: "Rewrite parser".to_string(),
                    competition_level: CompetitionLevel::High,
                    competition_score: 85,
                    score: 45,
                    merge_probability: 0.45,
                    classification: Classification::HighRisk,
                    reasons: vec!["High competition".to_string()],
                },
            ],
        }
    }

    #[test]
    fn renders_scan_markdown() {
        let reports = vec![
            ScanReport::scored("snapshots/octo/cat.json", sample_result()),
            ScanReport::failed("snapshots/bad.json", "invalid snapshot: boom"),
        ];
        let output = render_scan_markdown(&reports);
        assert!(output.contains("MergeScope Report"));
        assert!(output.contains("Status: scored"));
        assert!(output.contains("Status: failed (invalid snapshot: boom)"));
        assert!(output.contains("- Average score: 57"));
        assert!(output.contains("- HIGH_RISK: 1"));
        assert!(output.contains("Fix \\| pipe"));
        assert!(output.contains("Receptive maintainers, Healthy repository, Recently active |"));
    }

    #[test]
    fn renders_empty_analysis() {
        let mut result = sample_result();
        result.issues.clear();
        let output = render_analysis_markdown(&result);
        assert!(output.contains("No open issues."));
        assert!(output.contains("- Average score: 0"));
    }

    #[test]
    fn renders_analysis_text() {
        let output = render_analysis_text(&sample_result());
        assert!(output.contains("Repository: octo/cat"));
        assert!(output.contains("Issues: 2 (average score 57)"));
        assert!(output.contains("  HIGH_MERGE_PROBABILITY: 1"));
        assert!(output.contains("#9 [HIGH_RISK] score 45 competition HIGH: Rewrite parser"));
    }

    #[test]
    fn renders_issue_detail_with_all_reasons() {
        let result = sample_result();
        let output = render_issue_text(&result.repo, &result.issues[0]);
        assert!(output.contains("octo/cat#7"));
        assert!(output.contains("merge probability 0.68"));
        assert!(output.contains("- Low competition"));
    }

    #[test]
    fn renders_issue_markdown() {
        let result = sample_result();
        let output = render_issue_markdown(&result.repo, &result.issues[1]);
        assert!(output.starts_with("# octo/cat#9: Rewrite parser"));
        assert!(output.contains("- Competition: HIGH (85)"));
        assert!(output.contains("### Reasons\n- High competition"));
    }

    #[test]
    fn renders_json_payload() {
        let json = render_json(&vec![ScanReport::failed("x.json", "boom")]).expect("json");
        let parsed: serde_json::Value = serde_json::from_str(&json).expect("parse");
        assert_eq!(parsed[0]["status"]["status"], "failed");
        assert_eq!(parsed[0]["status"]["message"], "boom");
        assert!(parsed[0]["result"].is_null());
    }

    #[test]
    fn scan_status_has_only_terminal_states() {
        let scored: ScanStatus = serde_json::from_str(r#"{"status":"scored"}"#).expect("scored");
        assert_eq!(scored, ScanStatus::Scored);
        let failed: ScanStatus =
            serde_json::from_str(r#"{"status":"failed","message":"eof"}"#).expect("failed");
        assert_eq!(failed, ScanStatus::Failed("eof".to_string()));
        assert!(serde_json::from_str::<ScanStatus>(r#"{"status":"pending"}"#).is_err());
    }

    #[test]
    fn summarizes_first_three_reasons() {
        let reasons: Vec<String> = ["a", "b", "c", "d"].iter().map(|s| s.to_string()).collect();
        assert_eq!(summarize_reasons(&reasons), "a, b, c");
        assert_eq!(summarize_reasons(&[]), "");
    }
}
