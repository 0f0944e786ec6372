#![deny(missing_docs)]
//! MergeScope command-line interface.
//!
//! Scores repository snapshots locally, in batches, or through a running
//! MergeScope server.

mod remote;

use clap::{Args, Parser, Subcommand, ValueEnum};
use log::{debug, info, warn};
use mergescope_core::{
    AnalyzeResult, Classification, FileSystem, RepoSnapshot, ScanReport, ScanStatus, ScoredIssue,
    StdFileSystem, render_analysis_markdown, render_analysis_text, render_issue_markdown,
    render_issue_text, render_json, render_scan_markdown, score,
};
use remote::RemoteArgs;
use std::fmt::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

pub(crate) type CliResult<T> = Result<T, Box<dyn std::error::Error + Send + Sync>>;

#[derive(Parser)]
#[command(name = "mergescope", version, about = "MergeScope CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args, Clone, Debug, Default)]
pub(crate) struct FilterArgs {
    /// Keep only issues with this classification.
    #[arg(long, value_parser = parse_classification)]
    classification: Option<Classification>,
    /// Show a single issue by number.
    #[arg(long)]
    issue: Option<u64>,
}

#[derive(Args, Clone, Debug)]
pub(crate) struct OutputArgs {
    /// Output format for report data.
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,
    /// Write the report to a file instead of stdout.
    #[arg(long = "report-output")]
    report_output: Option<PathBuf>,
}

#[derive(ValueEnum, Copy, Clone, Debug, Eq, PartialEq)]
enum OutputFormat {
    Text,
    Json,
    Markdown,
}

#[derive(Subcommand)]
enum Commands {
    /// Score one snapshot file.
    Score {
        /// Snapshot file to score.
        #[arg(long)]
        snapshot: PathBuf,
        #[command(flatten)]
        filter: FilterArgs,
        #[command(flatten)]
        report: OutputArgs,
    },
    /// Score every snapshot under a directory.
    Batch {
        /// Directory searched for `*.json` snapshots.
        #[arg(long)]
        dir: PathBuf,
        /// Maximum number of snapshots scored at once.
        #[arg(short = 'j', long, default_value_t = 5)]
        concurrency: usize,
        /// Keep only issues with this classification.
        #[arg(long, value_parser = parse_classification)]
        classification: Option<Classification>,
        #[command(flatten)]
        report: OutputArgs,
    },
    /// Ask a MergeScope server to analyze a repository.
    Remote(RemoteArgs),
}

#[cfg(not(test))]
#[tokio::main]
async fn main() -> CliResult<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Score {
            snapshot,
            filter,
            report,
        } => run_score(&snapshot, &filter, &report).await?,
        Commands::Batch {
            dir,
            concurrency,
            classification,
            report,
        } => run_batch(&dir, concurrency, classification, &report).await?,
        Commands::Remote(args) => remote::run_remote(args).await?,
    }

    Ok(())
}

#[cfg(test)]
fn main() {}

fn parse_classification(value: &str) -> Result<Classification, String> {
    Classification::parse(value).ok_or_else(|| {
        let known: Vec<&str> = Classification::ALL
            .iter()
            .map(|classification| classification.as_str())
            .collect();
        format!("unknown classification {value:?}, expected one of {}", known.join(", "))
    })
}

/// What a single-repository command prints.
#[derive(Debug)]
pub(crate) enum Selection {
    Analysis(AnalyzeResult),
    Issue { repo: String, issue: ScoredIssue },
}

/// Apply classification and issue filters to a result.
pub(crate) fn select(result: AnalyzeResult, filter: &FilterArgs) -> CliResult<Selection> {
    if let Some(number) = filter.issue {
        let issue = result
            .issue(number)
            .cloned()
            .ok_or_else(|| format!("issue #{number} not found in {}", result.repo))?;
        return Ok(Selection::Issue {
            repo: result.repo,
            issue,
        });
    }
    match filter.classification {
        Some(classification) => Ok(Selection::Analysis(result.filtered(classification))),
        None => Ok(Selection::Analysis(result)),
    }
}

async fn load_snapshot(path: &Path) -> CliResult<RepoSnapshot> {
    let contents = tokio::fs::read_to_string(path).await?;
    Ok(RepoSnapshot::from_json(&contents)?)
}

async fn run_score(
    snapshot_path: &Path,
    filter: &FilterArgs,
    output: &OutputArgs,
) -> CliResult<()> {
    let snapshot = load_snapshot(snapshot_path).await?;
    debug!(
        "scoring {} issues from {}",
        snapshot.issues.len(),
        snapshot_path.display()
    );
    let result = score(&snapshot)?;
    emit_selection(&select(result, filter)?, output).await
}

async fn run_batch(
    dir: &Path,
    concurrency: usize,
    classification: Option<Classification>,
    output: &OutputArgs,
) -> CliResult<()> {
    let files = load_snapshot_files(dir).await?;
    if files.is_empty() {
        println!("No snapshots found in {}.", dir.display());
        return Ok(());
    }

    let concurrency = if concurrency == 0 { 1 } else { concurrency };
    let semaphore = Arc::new(Semaphore::new(concurrency));
    let mut tasks = JoinSet::new();

    for path in files {
        let permit = semaphore.clone().acquire_owned().await?;
        tasks.spawn(async move {
            let _permit = permit;
            score_file(path).await
        });
    }

    let mut reports = Vec::new();
    while let Some(result) = tasks.join_next().await {
        match result {
            Ok(report) => reports.push(report),
            Err(err) => reports.push(ScanReport::failed("unknown", err.to_string())),
        }
    }
    reports.sort_by(|a, b| a.source.cmp(&b.source));

    if let Some(classification) = classification {
        for report in &mut reports {
            if let Some(result) = report.result.take() {
                report.result = Some(result.filtered(classification));
            }
        }
    }

    let failed = reports
        .iter()
        .filter(|report| matches!(report.status, ScanStatus::Failed(_)))
        .count();
    info!("scored {} snapshots, {failed} failed", reports.len() - failed);

    emit_scan_reports(&reports, output).await
}

async fn score_file(path: PathBuf) -> ScanReport {
    let source = path.display().to_string();
    let snapshot = match load_snapshot(&path).await {
        Ok(snapshot) => snapshot,
        Err(err) => {
            warn!("skipping {source}: {err}");
            return ScanReport::failed(source, err.to_string());
        }
    };
    match score(&snapshot) {
        Ok(result) => ScanReport::scored(source, result),
        Err(err) => {
            warn!("skipping {source}: {err}");
            ScanReport::failed(source, err.to_string())
        }
    }
}

async fn load_snapshot_files(root: &Path) -> CliResult<Vec<PathBuf>> {
    let root = root.to_path_buf();
    let files =
        tokio::task::spawn_blocking(move || StdFileSystem::new().snapshot_files(&root)).await??;
    Ok(files)
}

pub(crate) async fn emit_selection(selection: &Selection, output: &OutputArgs) -> CliResult<()> {
    let contents = match (selection, output.format) {
        (Selection::Analysis(result), OutputFormat::Text) => render_analysis_text(result),
        (Selection::Analysis(result), OutputFormat::Markdown) => render_analysis_markdown(result),
        (Selection::Analysis(result), OutputFormat::Json) => render_json(result)?,
        (Selection::Issue { repo, issue }, OutputFormat::Text) => render_issue_text(repo, issue),
        (Selection::Issue { repo, issue }, OutputFormat::Markdown) => {
            render_issue_markdown(repo, issue)
        }
        (Selection::Issue { issue, .. }, OutputFormat::Json) => render_json(issue)?,
    };
    emit_output(output, contents).await
}

async fn emit_scan_reports(reports: &[ScanReport], output: &OutputArgs) -> CliResult<()> {
    let contents = match output.format {
        OutputFormat::Text => render_scan_text(reports),
        OutputFormat::Markdown => render_scan_markdown(reports),
        OutputFormat::Json => render_json(reports)?,
    };
    emit_output(output, contents).await
}

async fn emit_output(output: &OutputArgs, contents: String) -> CliResult<()> {
    if let Some(path) = &output.report_output {
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(path, contents).await?;
    } else {
        print!("{contents}");
    }
    Ok(())
}

fn render_scan_text(reports: &[ScanReport]) -> String {
    let mut output = String::new();
    for report in reports {
        let _ = writeln!(output, "Source: {}", report.source);
        match &report.status {
            ScanStatus::Scored => {
                let _ = writeln!(output, "Status: scored");
            }
            ScanStatus::Failed(error) => {
                let _ = writeln!(output, "Status: failed ({error})");
                let _ = writeln!(output);
                continue;
            }
        }
        if let Some(result) = &report.result {
            output.push_str(&render_analysis_text(result));
        }
        let _ = writeln!(output);
    }
    output
}
