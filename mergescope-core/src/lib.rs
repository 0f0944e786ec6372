#![deny(missing_docs)]
//! MergeScope core library.
//!
//! This crate scores the open issues of a repository snapshot by how likely a
//! contribution is to be merged, and classifies each one as a safe bet, a
//! contested one, or a risk.

pub mod classifier;
pub mod competition;
pub mod domain;
pub mod engine;
pub mod error;
pub mod fs;
pub mod metrics;
pub mod provider;
pub mod reasons;
pub mod repo_ref;
pub mod report;
pub mod scorer;
pub mod snapshot;

pub use classifier::{Classifier, Verdict, classify};
pub use competition::{CompetitionAnalyzer, CompetitionAssessment};
pub use domain::{
    AnalyzeResult, Classification, ClassificationCounts, CompetitionLevel, MaintainerMetrics,
    RepoHealth, ScoredIssue,
};
pub use engine::score;
pub use error::{MergeScopeError, ProviderError, Result};
pub use fs::{FileSystem, StdFileSystem};
pub use metrics::MetricAggregator;
pub use provider::{DirectorySnapshotProvider, SnapshotProvider, analyze_repo};
pub use repo_ref::RepoRef;
pub use report::{
    ScanReport, ScanStatus, render_analysis_markdown, render_analysis_text, render_issue_markdown,
    render_issue_text, render_json, render_scan_markdown, summarize_reasons,
};
pub use scorer::{IssueScore, IssueScorer};
pub use snapshot::{IssueActivity, PullRequestActivity, RawIssue, RepoActivity, RepoSnapshot};
