#![deny(missing_docs)]
//! MergeScope server executable.
//!
//! Hosts HTTP endpoints that score and classify repository issues.

mod openapi;
mod routes;

use actix_cors::Cors;
use actix_web::http::header;
#[cfg(not(test))]
use actix_web::{App, HttpServer, web};
#[cfg(not(test))]
use dotenvy::dotenv;
#[cfg(not(test))]
use log::info;

#[allow(unused_imports)]
use std::str::FromStr;
#[cfg(not(test))]
use std::sync::Arc;

#[cfg(not(test))]
use mergescope_core::{DirectorySnapshotProvider, StdFileSystem};

#[cfg(not(test))]
use crate::routes::{AppState, analyze, list_repos, openapi_json, repo_issue, score_snapshot};

/// Largest accepted JSON body, sized for snapshots posted to `/api/score`.
#[cfg(not(test))]
const JSON_LIMIT_BYTES: usize = 8 * 1024 * 1024;

#[cfg(not(test))]
fn main() -> std::io::Result<()> {
    dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let snapshot_dir =
        std::env::var("MERGESCOPE_SNAPSHOT_DIR").unwrap_or_else(|_| "snapshots".to_string());
    info!("serving snapshots from {snapshot_dir}");
    let state = web::Data::new(AppState {
        provider: Arc::new(DirectorySnapshotProvider::new(
            StdFileSystem::new(),
            snapshot_dir,
        )),
    });

    let origins = std::env::var("MERGESCOPE_UI_ORIGINS")
        .unwrap_or_else(|_| DEFAULT_UI_ORIGINS.to_string());
    let allowed_origins = parse_origins(&origins);

    let listen_addr =
        std::env::var("MERGESCOPE_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
    let port_value = std::env::var("MERGESCOPE_PORT").unwrap_or_else(|_| "3000".to_string());
    let listen_port = u16::from_str(&port_value).map_err(|err| {
        std::io::Error::new(
            std::io::ErrorKind::InvalidInput,
            format!("MERGESCOPE_PORT must be a u16 number, got {port_value:?}: {err}"),
        )
    })?;

    actix_web::rt::System::new().block_on(async move {
        HttpServer::new(move || {
            App::new()
                .wrap(actix_web::middleware::Logger::default())
                .wrap(build_cors(&allowed_origins))
                .app_data(state.clone())
                .app_data(web::JsonConfig::default().limit(JSON_LIMIT_BYTES))
                .service(analyze)
                .service(score_snapshot)
                .service(list_repos)
                .service(repo_issue)
                .service(openapi_json)
        })
        .bind((listen_addr, listen_port))?
        .run()
        .await
    })
}

#[cfg(test)]
fn main() {}

const DEFAULT_UI_ORIGINS: &str = "http://127.0.0.1:5173,http://localhost:5173";

fn parse_origins(origins: &str) -> Vec<String> {
    origins
        .split(',')
        .map(|value| value.trim())
        .filter(|origin| !origin.is_empty())
        .map(String::from)
        .collect()
}

/// CORS policy for the browser client, which may send a bearer token.
fn build_cors(allowed_origins: &[String]) -> Cors {
    let mut cors = Cors::default()
        .allowed_methods(vec!["GET", "POST", "OPTIONS"])
        .allowed_headers(vec![header::AUTHORIZATION, header::CONTENT_TYPE])
        .max_age(3600);
    for origin in allowed_origins {
        cors = cors.allowed_origin(origin);
    }
    cors
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routes::{AppState, analyze};
    use actix_web::http::{Method, StatusCode};
    use actix_web::{App, test, web};
    use mergescope_core::{ProviderError, RepoRef, RepoSnapshot, SnapshotProvider};
    use std::sync::Arc;

    struct EmptyProvider;

    impl SnapshotProvider for EmptyProvider {
        fn fetch(&self, repo: &RepoRef) -> Result<RepoSnapshot, ProviderError> {
            Err(ProviderError::NotFound(repo.to_string()))
        }

        fn available(&self) -> Result<Vec<RepoRef>, ProviderError> {
            Ok(Vec::new())
        }
    }

    fn preflight(origin: &str) -> test::TestRequest {
        test::TestRequest::default()
            .method(Method::OPTIONS)
            .uri("/analyze")
            .insert_header((header::ORIGIN, origin))
            .insert_header((header::ACCESS_CONTROL_REQUEST_METHOD, "POST"))
            .insert_header((
                header::ACCESS_CONTROL_REQUEST_HEADERS,
                "authorization, content-type",
            ))
    }

    #[std::prelude::v1::test]
    fn parse_origins_trims_and_skips_empty_entries() {
        assert_eq!(
            parse_origins(" http://localhost:5173 ,, http://127.0.0.1:5173"),
            vec!["http://localhost:5173", "http://127.0.0.1:5173"]
        );
    }

    #[actix_web::test]
    async fn preflight_allows_bearer_token_from_ui_origin() {
        let app = test::init_service(
            App::new()
                .wrap(build_cors(&parse_origins(DEFAULT_UI_ORIGINS)))
                .app_data(web::Data::new(AppState {
                    provider: Arc::new(EmptyProvider),
                }))
                .service(analyze),
        )
        .await;

        let resp = test::call_service(&app, preflight("http://localhost:5173").to_request()).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let allowed = resp
            .headers()
            .get(header::ACCESS_CONTROL_ALLOW_HEADERS)
            .and_then(|value| value.to_str().ok())
            .unwrap_or_default()
            .to_ascii_lowercase();
        assert!(allowed.contains("authorization"));
        assert!(allowed.contains("content-type"));
    }

    #[actix_web::test]
    async fn preflight_rejects_unknown_origin() {
        let app = test::init_service(
            App::new()
                .wrap(build_cors(&parse_origins(DEFAULT_UI_ORIGINS)))
                .app_data(web::Data::new(AppState {
                    provider: Arc::new(EmptyProvider),
                }))
                .service(analyze),
        )
        .await;

        let resp = test::call_service(&app, preflight("http://evil.example").to_request()).await;
        assert!(resp.status().is_client_error());
    }
}
