//! Outcome classifier - turns a job termination into exactly one outcome.
//!
//! Decision order (first match wins):
//! 1. deadline fired                        -> `Timeout`
//! 2. exit code other than 0 (or a signal)  -> `ScraperFailed(Exit)`
//! 3. stdout is not JSON                    -> `InvalidOutput`
//! 4. JSON carries an `error_code`          -> `ScraperFailed(Reported)`
//! 5. JSON is not a scrape result           -> `InvalidOutput`
//! 6. otherwise                             -> `Success`

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

use crate::collector::OutputBuffer;
use crate::config::JobConfig;
use crate::deadline::Termination;
use crate::types::ScrapeResult;

/// Stable, machine-readable error codes of the scrape API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    InvalidUrl,
    InternalError,
    ScraperTimeout,
    ScraperFailed,
    InvalidOutput,
    NotFound,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::InvalidUrl => "INVALID_URL",
            ErrorCode::InternalError => "INTERNAL_ERROR",
            ErrorCode::ScraperTimeout => "SCRAPER_TIMEOUT",
            ErrorCode::ScraperFailed => "SCRAPER_FAILED",
            ErrorCode::InvalidOutput => "INVALID_OUTPUT",
            ErrorCode::NotFound => "NOT_FOUND",
        }
    }

    /// Human-readable message sent with this code.
    pub fn message(&self) -> &'static str {
        match self {
            ErrorCode::InvalidUrl => {
                "The provided URL is not valid. Must start with http:// or https://"
            }
            ErrorCode::InternalError => "Failed to start scraping engine.",
            ErrorCode::ScraperTimeout => "The scraping process took too long and was terminated.",
            ErrorCode::ScraperFailed => "The scraping process failed.",
            ErrorCode::InvalidOutput => "The scraper did not return valid JSON.",
            ErrorCode::NotFound => "Endpoint not found.",
        }
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// JSON error body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error_code: ErrorCode,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw_output: Option<String>,
}

impl ErrorResponse {
    pub fn new(error_code: ErrorCode) -> Self {
        Self {
            error_code,
            message: error_code.message().to_string(),
            details: None,
            raw_output: None,
        }
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    pub fn with_raw_output(mut self, raw_output: impl Into<String>) -> Self {
        self.raw_output = Some(raw_output.into());
        self
    }
}

/// Why a job that ran to completion is considered failed.
#[derive(Debug, Clone, PartialEq)]
pub enum JobFailure {
    /// Non-zero exit, or no exit code at all (killed by a signal).
    Exit {
        exit_code: Option<i32>,
        stderr_excerpt: String,
    },
    /// The job exited cleanly but printed its own error object.
    Reported(Value),
}

/// The single classified result of one scrape request.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Success(ScrapeResult),
    ScraperFailed(JobFailure),
    InvalidOutput { stdout_excerpt: String },
    Timeout,
    LaunchError { message: String },
}

/// What gets serialized back to the caller for an outcome.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ResponseBody {
    Result(ScrapeResult),
    Error(ErrorResponse),
    Passthrough(Value),
}

impl Outcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Success(_))
    }

    /// Short label for logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Outcome::Success(_) => "success",
            Outcome::ScraperFailed(JobFailure::Exit { .. }) => "scraper_failed",
            Outcome::ScraperFailed(JobFailure::Reported(_)) => "scraper_reported_error",
            Outcome::InvalidOutput { .. } => "invalid_output",
            Outcome::Timeout => "timeout",
            Outcome::LaunchError { .. } => "launch_error",
        }
    }

    /// Error code of a failed outcome. A job-reported error keeps its own
    /// code and is not mapped here.
    pub fn error_code(&self) -> Option<ErrorCode> {
        match self {
            Outcome::Success(_) | Outcome::ScraperFailed(JobFailure::Reported(_)) => None,
            Outcome::ScraperFailed(JobFailure::Exit { .. }) => Some(ErrorCode::ScraperFailed),
            Outcome::InvalidOutput { .. } => Some(ErrorCode::InvalidOutput),
            Outcome::Timeout => Some(ErrorCode::ScraperTimeout),
            Outcome::LaunchError { .. } => Some(ErrorCode::InternalError),
        }
    }

    /// Body sent to the caller. Launch error details stay in the logs.
    pub fn into_body(self) -> ResponseBody {
        match self {
            Outcome::Success(result) => ResponseBody::Result(result),
            Outcome::ScraperFailed(JobFailure::Reported(payload)) => {
                ResponseBody::Passthrough(payload)
            }
            Outcome::ScraperFailed(JobFailure::Exit { stderr_excerpt, .. }) => ResponseBody::Error(
                ErrorResponse::new(ErrorCode::ScraperFailed).with_details(stderr_excerpt),
            ),
            Outcome::InvalidOutput { stdout_excerpt } => ResponseBody::Error(
                ErrorResponse::new(ErrorCode::InvalidOutput).with_raw_output(stdout_excerpt),
            ),
            Outcome::Timeout => ResponseBody::Error(ErrorResponse::new(ErrorCode::ScraperTimeout)),
            Outcome::LaunchError { .. } => {
                ResponseBody::Error(ErrorResponse::new(ErrorCode::InternalError))
            }
        }
    }
}

/// First `max_chars` characters of `text`. Never splits a character.
pub fn excerpt(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect()
}

/// Classifies terminations using the configured excerpt caps.
#[derive(Debug, Clone, Copy)]
pub struct OutcomeClassifier {
    stderr_excerpt_chars: usize,
    stdout_excerpt_chars: usize,
}

impl OutcomeClassifier {
    pub fn new(stderr_excerpt_chars: usize, stdout_excerpt_chars: usize) -> Self {
        Self {
            stderr_excerpt_chars,
            stdout_excerpt_chars,
        }
    }

    pub fn from_config(config: &JobConfig) -> Self {
        Self::new(config.stderr_excerpt_chars, config.stdout_excerpt_chars)
    }

    pub fn classify(&self, termination: Termination) -> Outcome {
        match termination {
            Termination::TimedOut { .. } => Outcome::Timeout,
            Termination::Lost(e) => {
                // The wait error is internal; it goes to the log, not the client.
                warn!(error = %e, "lost track of scrape job");
                Outcome::ScraperFailed(JobFailure::Exit {
                    exit_code: None,
                    stderr_excerpt: String::new(),
                })
            }
            Termination::Exited {
                exit_code,
                stdout,
                stderr,
            } => self.classify_exit(exit_code, &stdout, &stderr),
        }
    }

    fn classify_exit(
        &self,
        exit_code: Option<i32>,
        stdout: &OutputBuffer,
        stderr: &OutputBuffer,
    ) -> Outcome {
        if exit_code != Some(0) {
            return Outcome::ScraperFailed(JobFailure::Exit {
                exit_code,
                stderr_excerpt: excerpt(&stderr.to_text(), self.stderr_excerpt_chars),
            });
        }

        let payload: Value = match serde_json::from_slice(stdout.as_bytes()) {
            Ok(payload) => payload,
            Err(_) => return self.invalid_output(stdout),
        };

        if reports_error(&payload) {
            return Outcome::ScraperFailed(JobFailure::Reported(payload));
        }

        match serde_json::from_value::<ScrapeResult>(payload) {
            Ok(mut result) => {
                if let Some(reported) = result.normalize_total() {
                    warn!(
                        reported,
                        actual = result.total_images,
                        "job reported wrong total_images, corrected"
                    );
                }
                Outcome::Success(result)
            }
            Err(e) => {
                warn!(error = %e, "job output is JSON but not a scrape result");
                self.invalid_output(stdout)
            }
        }
    }

    fn invalid_output(&self, stdout: &OutputBuffer) -> Outcome {
        Outcome::InvalidOutput {
            stdout_excerpt: excerpt(&stdout.to_text(), self.stdout_excerpt_chars),
        }
    }
}

/// Whether a parsed payload carries a truthy `error_code`.
fn reports_error(payload: &Value) -> bool {
    match payload.get("error_code") {
        None | Some(Value::Null) | Some(Value::Bool(false)) => false,
        Some(Value::String(code)) => !code.is_empty(),
        Some(Value::Number(n)) => n.as_f64() != Some(0.0),
        Some(_) => true,
    }
}
