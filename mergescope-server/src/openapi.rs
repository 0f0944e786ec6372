//! OpenAPI specification for MergeScope server.

use utoipa::OpenApi;

use mergescope_core::{
    AnalyzeResult, Classification, CompetitionLevel, IssueActivity, MaintainerMetrics,
    PullRequestActivity, RawIssue, RepoActivity, RepoHealth, RepoSnapshot, ScoredIssue,
};

use crate::routes::{AnalyzeRequest, ErrorResponse, ReposResponse};

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::routes::analyze,
        crate::routes::score_snapshot,
        crate::routes::list_repos,
        crate::routes::repo_issue,
        crate::routes::openapi_json
    ),
    components(
        schemas(
            AnalyzeRequest,
            AnalyzeResult,
            RepoHealth,
            MaintainerMetrics,
            ScoredIssue,
            Classification,
            CompetitionLevel,
            RepoSnapshot,
            RepoActivity,
            IssueActivity,
            PullRequestActivity,
            RawIssue,
            ReposResponse,
            ErrorResponse
        )
    ),
    tags(
        (name = "analysis", description = "Issue scoring and classification"),
        (name = "system", description = "System endpoints")
    )
)]
/// OpenAPI specification for the MergeScope server.
pub struct ApiDoc;
