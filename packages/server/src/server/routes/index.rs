use axum::{http::Uri, Json};
use serde::Serialize;

use crate::server::error::ApiError;

#[derive(Debug, Serialize)]
pub struct Endpoints {
    health: &'static str,
    scrape: &'static str,
}

#[derive(Debug, Serialize)]
pub struct ServiceInfo {
    service: &'static str,
    status: &'static str,
    endpoints: Endpoints,
    version: &'static str,
}

/// GET / - describes the API.
pub async fn index_handler() -> Json<ServiceInfo> {
    Json(ServiceInfo {
        service: "Universal E-commerce Scraper API",
        status: "Running",
        endpoints: Endpoints {
            health: "GET /api/health",
            scrape: "POST /api/scrape",
        },
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// Fallback for unknown routes.
pub async fn not_found_handler(uri: Uri) -> ApiError {
    ApiError::NotFound(uri.path().to_string())
}
