//! Test harness: the real router on an ephemeral port, driven over HTTP.
//!
//! Scrape jobs are shell fixtures from `tests/fixtures/` run through `sh`,
//! standing in for `python scraper.py <url>`.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use reqwest::Client;
use scrape_job::{JobCommand, JobConfig};
use scrape_server::server::{build_app, AppState};
use tokio::task::JoinHandle;

pub fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(format!("{name}.sh"))
}

/// Job config running the named fixture with a generous deadline.
pub fn fixture_config(name: &str) -> JobConfig {
    JobConfig::with_command(JobCommand::new("sh", fixture(name))).deadline(Duration::from_secs(10))
}

pub struct TestServer {
    pub address: SocketAddr,
    pub client: Client,
    server_handle: JoinHandle<()>,
}

impl TestServer {
    pub async fn start(job_config: JobConfig) -> Self {
        // Initialize tracing subscriber to respect RUST_LOG environment variable.
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind");
        let address = listener.local_addr().expect("Failed to get address");
        let app = build_app(AppState::new(job_config));

        let server_handle = tokio::spawn(async move {
            axum::serve(listener, app).await.expect("Server failed");
        });

        Self {
            address,
            client: Client::new(),
            server_handle,
        }
    }

    /// Server running the named fixture as its scrape job.
    pub async fn with_fixture(name: &str) -> Self {
        Self::start(fixture_config(name)).await
    }

    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.address, path)
    }

    pub async fn get(&self, path: &str) -> reqwest::Response {
        self.client
            .get(self.url(path))
            .send()
            .await
            .expect("GET request failed")
    }

    pub async fn scrape(&self, url: &str) -> reqwest::Response {
        self.client
            .post(self.url("/api/scrape"))
            .json(&serde_json::json!({ "url": url }))
            .send()
            .await
            .expect("POST request failed")
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.server_handle.abort();
    }
}
