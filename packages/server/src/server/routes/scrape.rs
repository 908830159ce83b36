//! POST /api/scrape
//!
//! Validates the target URL, runs one scrape job, and renders its outcome.

use axum::{
    extract::{rejection::JsonRejection, Extension},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use scrape_job::{Outcome, ScrapeRequest};
use url::Url;

use crate::server::app::AppState;
use crate::server::error::ApiError;

/// Renders a job outcome: 200 with the result, 500 for every failure.
#[derive(Debug)]
pub struct ScrapeResponse(pub Outcome);

impl IntoResponse for ScrapeResponse {
    fn into_response(self) -> Response {
        let status = if self.0.is_success() {
            StatusCode::OK
        } else {
            StatusCode::INTERNAL_SERVER_ERROR
        };
        (status, Json(self.0.into_body())).into_response()
    }
}

/// Whether `candidate` is an absolute URL with an http or https scheme.
pub fn is_valid_url(candidate: &str) -> bool {
    Url::parse(candidate)
        .map(|url| matches!(url.scheme(), "http" | "https"))
        .unwrap_or(false)
}

/// Scrape handler
///
/// Malformed bodies and bad URLs are rejected before any job is started.
pub async fn scrape_handler(
    Extension(state): Extension<AppState>,
    payload: Result<Json<ScrapeRequest>, JsonRejection>,
) -> Result<ScrapeResponse, ApiError> {
    let Json(request) = payload.map_err(|rejection| ApiError::InvalidUrl(rejection.body_text()))?;

    if !is_valid_url(&request.url) {
        return Err(ApiError::InvalidUrl(request.url));
    }

    tracing::info!(url = %request.url, "received scrape request");

    Ok(ScrapeResponse(state.runner.run(&request.url).await))
}

#[cfg(test)]
mod tests {
    use super::*;
    use scrape_job::ScrapeResult;

    #[test]
    fn accepts_http_and_https() {
        assert!(is_valid_url("https://example.com/shop/item"));
        assert!(is_valid_url("http://localhost:8080/p?id=1"));
    }

    #[test]
    fn rejects_other_schemes_and_garbage() {
        assert!(!is_valid_url("ftp://example.com/file"));
        assert!(!is_valid_url("javascript:alert(1)"));
        assert!(!is_valid_url("example.com/no-scheme"));
        assert!(!is_valid_url(""));
    }

    #[test]
    fn success_renders_200() {
        let response = ScrapeResponse(Outcome::Success(ScrapeResult::new(Vec::new(), None)))
            .into_response();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[test]
    fn failures_render_500() {
        for outcome in [
            Outcome::Timeout,
            Outcome::LaunchError {
                message: "spawn failed".into(),
            },
            Outcome::InvalidOutput {
                stdout_excerpt: "oops".into(),
            },
        ] {
            let response = ScrapeResponse(outcome).into_response();
            assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        }
    }
}
