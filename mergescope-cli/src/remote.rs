//! Remote analysis through a MergeScope server.

use crate::{CliResult, FilterArgs, OutputArgs, emit_selection, select};
use clap::Args;
use log::debug;
use mergescope_core::{AnalyzeResult, Classification};
use reqwest::Client;
use serde::{Deserialize, Serialize};

const DEFAULT_SERVER_URL: &str = "http://127.0.0.1:3000";

/// CLI arguments for the remote command.
#[derive(Args, Clone, Debug)]
pub struct RemoteArgs {
    /// Repository as `owner/name` or a repository URL.
    #[arg(long)]
    pub repo: String,
    /// Base URL of the MergeScope server.
    #[arg(long, env = "MERGESCOPE_SERVER", default_value = DEFAULT_SERVER_URL)]
    pub server: String,
    #[command(flatten)]
    pub(crate) filter: FilterArgs,
    #[command(flatten)]
    pub(crate) report: OutputArgs,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct AnalyzeRequest<'a> {
    repo_url: &'a str,
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    message: String,
}

/// Analyze a repository on the server and render the result.
#[cfg_attr(test, allow(dead_code))]
pub async fn run_remote(args: RemoteArgs) -> CliResult<()> {
    let client = Client::builder().user_agent("mergescope-cli").build()?;
    run_remote_with(&client, args).await
}

async fn run_remote_with(client: &Client, args: RemoteArgs) -> CliResult<()> {
    let server_url = normalize_server_url(&args.server)?;
    let result = fetch_analysis(client, &server_url, &args.repo, args.filter.classification).await?;
    emit_selection(&select(result, &args.filter)?, &args.report).await
}

fn normalize_server_url(server_url: &str) -> CliResult<String> {
    let trimmed = server_url.trim();
    if trimmed.is_empty() {
        return Err("server url is required".into());
    }
    Ok(trimmed.trim_end_matches('/').to_string())
}

/// Request an analysis from the server.
async fn fetch_analysis(
    client: &Client,
    server_url: &str,
    repo: &str,
    classification: Option<Classification>,
) -> CliResult<AnalyzeResult> {
    let url = format!("{server_url}/analyze");
    debug!("requesting analysis of {repo} from {url}");
    let mut request = client.post(url).json(&AnalyzeRequest { repo_url: repo });
    if let Some(classification) = classification {
        request = request.query(&[("classification", classification.as_str())]);
    }
    let response = request.send().await?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ErrorResponse>(&body)
            .map(|error| error.message)
            .unwrap_or(body);
        return Err(format!("server returned {status}: {message}").into());
    }
    Ok(response.json::<AnalyzeResult>().await?)
}
