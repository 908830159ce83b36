//! Request-level API errors.
//!
//! Scrape job failures are not errors at this level; they are outcomes and
//! are rendered by [`crate::server::routes::ScrapeResponse`].

use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use scrape_job::{ErrorCode, ErrorResponse};
use thiserror::Error;

/// Errors raised before a scrape job is started.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Body missing, malformed, or `url` not an absolute http(s) URL
    #[error("invalid url: {0}")]
    InvalidUrl(String),

    /// No route matched
    #[error("endpoint not found: {0}")]
    NotFound(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::InvalidUrl(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
        }
    }

    pub fn error_code(&self) -> ErrorCode {
        match self {
            ApiError::InvalidUrl(_) => ErrorCode::InvalidUrl,
            ApiError::NotFound(_) => ErrorCode::NotFound,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        tracing::debug!(error = %self, "rejecting request");
        (self.status(), Json(ErrorResponse::new(self.error_code()))).into_response()
    }
}
