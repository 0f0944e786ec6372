//! HTTP handlers for MergeScope server.

use std::sync::Arc;

use actix_web::{HttpResponse, Responder, get, post, routes, web};
use log::{info, warn};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, OpenApi, ToSchema};

use mergescope_core::{
    AnalyzeResult, Classification, MergeScopeError, ProviderError, RepoRef, RepoSnapshot,
    ScoredIssue, SnapshotProvider, analyze_repo, score,
};

use crate::openapi::ApiDoc;

/// Shared application state for handlers.
#[derive(Clone)]
pub struct AppState {
    /// Source of repository snapshots.
    pub provider: Arc<dyn SnapshotProvider + Send + Sync>,
}

/// Request payload for repository analysis.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeRequest {
    /// Repository as `owner/name` or a repository URL.
    pub repo_url: String,
}

/// Optional classification filter.
#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ClassificationQuery {
    /// Keep only issues with this classification.
    pub classification: Option<String>,
}

/// Repositories with snapshots available.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ReposResponse {
    /// Repositories in `owner/name` form.
    pub repos: Vec<String>,
}

/// Error response payload.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    /// Error message.
    pub message: String,
}

fn error_response(err: &MergeScopeError) -> HttpResponse {
    let body = ErrorResponse {
        message: err.to_string(),
    };
    match err {
        MergeScopeError::InvalidRepo(_) => HttpResponse::BadRequest().json(body),
        MergeScopeError::InvalidSnapshot(_) => HttpResponse::UnprocessableEntity().json(body),
        MergeScopeError::Provider(ProviderError::NotFound(_)) => {
            HttpResponse::NotFound().json(body)
        }
        MergeScopeError::Provider(ProviderError::Unauthorized) => {
            HttpResponse::Unauthorized().json(body)
        }
        MergeScopeError::Provider(ProviderError::RateLimited) => {
            HttpResponse::TooManyRequests().json(body)
        }
        _ => {
            warn!("request failed: {err}");
            HttpResponse::InternalServerError().json(body)
        }
    }
}

fn bad_request(message: impl Into<String>) -> HttpResponse {
    HttpResponse::BadRequest().json(ErrorResponse {
        message: message.into(),
    })
}

fn parse_classification(
    query: &ClassificationQuery,
) -> Result<Option<Classification>, HttpResponse> {
    match query.classification.as_deref() {
        None | Some("") => Ok(None),
        Some(value) => Classification::parse(value)
            .map(Some)
            .ok_or_else(|| bad_request(format!("unknown classification: {value}"))),
    }
}

async fn analyze_blocking(
    state: &web::Data<AppState>,
    repo: RepoRef,
) -> Result<AnalyzeResult, HttpResponse> {
    let provider = Arc::clone(&state.provider);
    match web::block(move || analyze_repo(provider.as_ref(), &repo)).await {
        Ok(Ok(result)) => Ok(result),
        Ok(Err(err)) => Err(error_response(&err)),
        Err(err) => Err(HttpResponse::InternalServerError().json(ErrorResponse {
            message: format!("analysis task failed: {err}"),
        })),
    }
}

#[utoipa::path(
    post,
    path = "/analyze",
    request_body = AnalyzeRequest,
    params(ClassificationQuery),
    responses(
        (status = 200, description = "Scored issues", body = AnalyzeResult),
        (status = 400, description = "Invalid repository or filter", body = ErrorResponse),
        (status = 401, description = "Repository not readable", body = ErrorResponse),
        (status = 404, description = "No snapshot for repository", body = ErrorResponse),
        (status = 422, description = "Invalid snapshot", body = ErrorResponse),
        (status = 429, description = "Rate limited", body = ErrorResponse)
    ),
    tag = "analysis"
)]
#[routes]
#[post("/analyze")]
#[post("/api/analyze")]
/// Score the open issues of a repository.
pub async fn analyze(
    state: web::Data<AppState>,
    query: web::Query<ClassificationQuery>,
    payload: web::Json<AnalyzeRequest>,
) -> impl Responder {
    let filter = match parse_classification(&query) {
        Ok(filter) => filter,
        Err(response) => return response,
    };
    let repo = match RepoRef::parse(&payload.repo_url) {
        Ok(repo) => repo,
        Err(err) => return error_response(&err),
    };
    info!("analyzing {repo}");

    match analyze_blocking(&state, repo).await {
        Ok(result) => match filter {
            Some(classification) => HttpResponse::Ok().json(result.filtered(classification)),
            None => HttpResponse::Ok().json(result),
        },
        Err(response) => response,
    }
}

#[utoipa::path(
    post,
    path = "/score",
    request_body = RepoSnapshot,
    params(ClassificationQuery),
    responses(
        (status = 200, description = "Scored issues", body = AnalyzeResult),
        (status = 400, description = "Invalid filter", body = ErrorResponse),
        (status = 422, description = "Invalid snapshot", body = ErrorResponse)
    ),
    tag = "analysis"
)]
#[post("/api/score")]
/// Score a snapshot supplied in the request body.
pub async fn score_snapshot(
    query: web::Query<ClassificationQuery>,
    payload: web::Json<RepoSnapshot>,
) -> impl Responder {
    let filter = match parse_classification(&query) {
        Ok(filter) => filter,
        Err(response) => return response,
    };
    let snapshot = payload.into_inner();
    match web::block(move || score(&snapshot)).await {
        Ok(Ok(result)) => match filter {
            Some(classification) => HttpResponse::Ok().json(result.filtered(classification)),
            None => HttpResponse::Ok().json(result),
        },
        Ok(Err(err)) => error_response(&err),
        Err(err) => HttpResponse::InternalServerError().json(ErrorResponse {
            message: format!("scoring task failed: {err}"),
        }),
    }
}

#[utoipa::path(
    get,
    path = "/repos",
    responses(
        (status = 200, description = "Repositories with snapshots", body = ReposResponse),
        (status = 500, description = "Snapshot listing failed", body = ErrorResponse)
    ),
    tag = "analysis"
)]
#[get("/api/repos")]
/// List repositories that can be analyzed.
pub async fn list_repos(state: web::Data<AppState>) -> impl Responder {
    let provider = Arc::clone(&state.provider);
    match web::block(move || provider.available()).await {
        Ok(Ok(repos)) => HttpResponse::Ok().json(ReposResponse {
            repos: repos.iter().map(RepoRef::to_string).collect(),
        }),
        Ok(Err(err)) => error_response(&MergeScopeError::Provider(err)),
        Err(err) => HttpResponse::InternalServerError().json(ErrorResponse {
            message: format!("listing task failed: {err}"),
        }),
    }
}

#[utoipa::path(
    get,
    path = "/repos/{owner}/{name}/issues/{number}",
    params(
        ("owner" = String, Path, description = "Repository owner"),
        ("name" = String, Path, description = "Repository name"),
        ("number" = u64, Path, description = "Issue number")
    ),
    responses(
        (status = 200, description = "Scored issue", body = ScoredIssue),
        (status = 400, description = "Invalid repository", body = ErrorResponse),
        (status = 404, description = "Repository or issue not found", body = ErrorResponse)
    ),
    tag = "analysis"
)]
#[get("/api/repos/{owner}/{name}/issues/{number}")]
/// Fetch one scored issue.
pub async fn repo_issue(
    state: web::Data<AppState>,
    path: web::Path<(String, String, u64)>,
) -> impl Responder {
    let (owner, name, number) = path.into_inner();
    let repo = match RepoRef::new(owner, name) {
        Ok(repo) => repo,
        Err(err) => return error_response(&err),
    };
    let label = repo.to_string();

    match analyze_blocking(&state, repo).await {
        Ok(result) => match result.issue(number) {
            Some(issue) => HttpResponse::Ok().json(issue),
            None => HttpResponse::NotFound().json(ErrorResponse {
                message: format!("issue #{number} not found in {label}"),
            }),
        },
        Err(response) => response,
    }
}

#[utoipa::path(
    get,
    path = "/openapi.json",
    responses(
        (status = 200, description = "OpenAPI document", body = serde_json::Value)
    ),
    tag = "system"
)]
#[get("/api/openapi.json")]
/// Serve the OpenAPI document.
pub async fn openapi_json() -> impl Responder {
    HttpResponse::Ok().json(ApiDoc::openapi())
}
