//! Job runner - one supervised scrape job per request.
//!
//! # Architecture
//!
//! ```text
//! JobRunner::run(url)
//!     │
//!     ├─► launch            (spawn error      -> LaunchError)
//!     ├─► attach collector  (missing pipe     -> kill, LaunchError)
//!     ├─► supervise         (exit + drains  vs. deadline)
//!     └─► classify          (exactly one Outcome)
//! ```
//!
//! The runner holds only immutable configuration and can be shared freely
//! between concurrent requests.

use tracing::{error, info, info_span, warn, Instrument};
use uuid::Uuid;

use crate::collector::StreamCollector;
use crate::config::JobConfig;
use crate::deadline::DeadlineSupervisor;
use crate::launcher::{launch, JobHandle};
use crate::outcome::{JobFailure, Outcome, OutcomeClassifier};

/// Runs the external scrape job and classifies its result.
#[derive(Debug, Clone)]
pub struct JobRunner {
    config: JobConfig,
    supervisor: DeadlineSupervisor,
    classifier: OutcomeClassifier,
}

impl JobRunner {
    pub fn new(config: JobConfig) -> Self {
        Self {
            supervisor: DeadlineSupervisor::new(config.deadline),
            classifier: OutcomeClassifier::from_config(&config),
            config,
        }
    }

    pub fn config(&self) -> &JobConfig {
        &self.config
    }

    /// Scrape `url` with a fresh job. Always produces exactly one outcome.
    pub async fn run(&self, url: &str) -> Outcome {
        let job_id = Uuid::new_v4();
        let span = info_span!("scrape_job", job_id = %job_id, url = %url);
        self.run_job(job_id, url).instrument(span).await
    }

    async fn run_job(&self, job_id: Uuid, url: &str) -> Outcome {
        let mut job = match launch(&self.config.command, url, job_id) {
            Ok(job) => job,
            Err(e) => {
                error!(error = %e, "failed to start scrape job");
                return Outcome::LaunchError {
                    message: e.to_string(),
                };
            }
        };

        let collector = match job.take_streams() {
            Ok((stdout, stderr)) => {
                StreamCollector::attach(stdout, stderr, self.config.max_output_bytes)
            }
            Err(e) => return abandon(job, e.to_string()).await,
        };

        let termination = self.supervisor.supervise(job, collector).await;
        let outcome = self.classifier.classify(termination);
        log_outcome(&outcome);
        outcome
    }
}

/// Tear down a job that cannot be supervised.
async fn abandon(mut job: JobHandle, message: String) -> Outcome {
    error!(error = %message, "scrape job unusable, killing");
    if let Err(e) = job.kill_and_reap().await {
        error!(error = %e, "failed to reap abandoned job");
    }
    Outcome::LaunchError { message }
}

fn log_outcome(outcome: &Outcome) {
    match outcome {
        Outcome::Success(result) => {
            info!(
                total = result.total_images,
                strategy = ?result.strategy_used,
                "scraping successful"
            );
        }
        Outcome::ScraperFailed(JobFailure::Exit {
            exit_code,
            stderr_excerpt,
        }) => {
            error!(exit_code = ?exit_code, stderr = %stderr_excerpt, "scraper failed");
        }
        Outcome::ScraperFailed(JobFailure::Reported(payload)) => {
            warn!(payload = %payload, "scraper reported an error");
        }
        Outcome::InvalidOutput { stdout_excerpt } => {
            error!(stdout = %stdout_excerpt, "failed to parse scraper output");
        }
        Outcome::Timeout => error!("scraper timed out"),
        Outcome::LaunchError { message } => error!(error = %message, "scraper did not start"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::JobCommand;
    use std::time::Duration;

    #[test]
    fn runner_derives_limits_from_config() {
        let runner = JobRunner::new(JobConfig::default().deadline(Duration::from_secs(3)));
        assert_eq!(runner.supervisor.deadline(), Duration::from_secs(3));
        assert_eq!(runner.config().stderr_excerpt_chars, 200);
    }

    #[tokio::test]
    async fn misconfigured_executable_is_a_launch_error() {
        let runner = JobRunner::new(JobConfig::with_command(JobCommand::new(
            "/opt/missing/python3",
            "scraper.py",
        )));

        let outcome = runner.run("https://example.com/shop/item").await;

        match outcome {
            Outcome::LaunchError { message } => assert!(message.contains("/opt/missing/python3")),
            other => panic!("expected launch error, got {other:?}"),
        }
    }
}
