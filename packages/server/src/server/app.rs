//! Application setup and server configuration.

use std::sync::Arc;
use std::time::Instant;

use axum::{
    extract::Extension,
    http::{
        header::{ACCEPT, CONTENT_TYPE, ORIGIN},
        HeaderName, Method,
    },
    routing::{get, post},
    Router,
};
use scrape_job::{JobConfig, JobRunner};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::server::routes::{health_handler, index_handler, not_found_handler, scrape_handler};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub runner: Arc<JobRunner>,
    pub started_at: Instant,
}

impl AppState {
    pub fn new(job_config: JobConfig) -> Self {
        Self {
            runner: Arc::new(JobRunner::new(job_config)),
            started_at: Instant::now(),
        }
    }
}

/// Build the Axum application router
pub fn build_app(state: AppState) -> Router {
    // CORS configuration - any origin, browser clients call the API directly
    let cors = CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([
            ORIGIN,
            HeaderName::from_static("x-requested-with"),
            CONTENT_TYPE,
            ACCEPT,
        ]);

    Router::new()
        .route("/", get(index_handler))
        .route("/api/health", get(health_handler))
        .route("/api/scrape", post(scrape_handler))
        .fallback(not_found_handler)
        // Middleware layers (applied in reverse order - last added runs first)
        .layer(Extension(state))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}
