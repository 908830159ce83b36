use anyhow::{ensure, Context, Result};
use dotenvy::dotenv;
use scrape_job::config::{
    DEFAULT_MAX_OUTPUT_BYTES, DEFAULT_STDERR_EXCERPT_CHARS, DEFAULT_STDOUT_EXCERPT_CHARS,
};
use scrape_job::{JobCommand, JobConfig};
use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

/// Application configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub python_cmd: PathBuf,
    pub scraper_script: PathBuf,
    pub scraper_timeout: Duration,
    pub max_output_bytes: usize,
    pub stderr_excerpt_chars: usize,
    pub stdout_excerpt_chars: usize,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        // Load .env file if present (development)
        let _ = dotenv();

        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build configuration from an arbitrary variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let timeout_ms: u64 = parse_or(&lookup, "SCRAPER_TIMEOUT_MS", 600_000)?;
        ensure!(timeout_ms > 0, "SCRAPER_TIMEOUT_MS must be greater than zero");

        let max_output_bytes: usize =
            parse_or(&lookup, "SCRAPER_MAX_OUTPUT_BYTES", DEFAULT_MAX_OUTPUT_BYTES)?;
        ensure!(
            max_output_bytes > 0,
            "SCRAPER_MAX_OUTPUT_BYTES must be greater than zero"
        );

        Ok(Self {
            port: parse_or(&lookup, "PORT", 3000)?,
            python_cmd: lookup("PYTHON_CMD")
                .unwrap_or_else(|| "python".to_string())
                .into(),
            scraper_script: lookup("SCRAPER_SCRIPT")
                .unwrap_or_else(|| "scraper/scraper.py".to_string())
                .into(),
            scraper_timeout: Duration::from_millis(timeout_ms),
            max_output_bytes,
            stderr_excerpt_chars: parse_or(
                &lookup,
                "SCRAPER_STDERR_EXCERPT",
                DEFAULT_STDERR_EXCERPT_CHARS,
            )?,
            stdout_excerpt_chars: parse_or(
                &lookup,
                "SCRAPER_STDOUT_EXCERPT",
                DEFAULT_STDOUT_EXCERPT_CHARS,
            )?,
        })
    }

    /// Settings handed to the scrape job runner.
    pub fn job_config(&self) -> JobConfig {
        JobConfig::with_command(JobCommand::new(&self.python_cmd, &self.scraper_script))
            .deadline(self.scraper_timeout)
            .max_output_bytes(self.max_output_bytes)
            .excerpt_chars(self.stderr_excerpt_chars, self.stdout_excerpt_chars)
    }
}

fn parse_or<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("{key} must be a valid number")),
        None => Ok(default),
    }
}
