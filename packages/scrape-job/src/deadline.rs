//! Deadline supervisor - races job completion against a wall-clock budget.
//!
//! ```text
//!            job exited + streams drained
//!   Armed ───────────────────────────────► Disarmed
//!     │
//!     │ deadline reached
//!     └──────────────────────────────────► Fired ─► kill group, reap, Timeout
//! ```
//!
//! Completion and expiry are two futures raced in one biased `select!`, so
//! exactly one of them decides the result. When both are ready in the same
//! poll, completion wins.

use std::time::Duration;

use tracing::{debug, error, warn};

use crate::collector::{OutputBuffer, StreamCollector};
use crate::error::JobError;
use crate::launcher::JobHandle;

/// Supervisor states. `Disarmed` and `Fired` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeadlineState {
    Armed,
    Disarmed,
    Fired,
}

/// How a supervised job ended.
#[derive(Debug)]
pub enum Termination {
    /// The job exited on its own and both streams reached end-of-stream.
    /// `exit_code` is `None` when the job was killed by a signal.
    Exited {
        exit_code: Option<i32>,
        stdout: OutputBuffer,
        stderr: OutputBuffer,
    },
    /// The deadline fired; the job has been killed and reaped.
    TimedOut { elapsed: Duration },
    /// The job could not be waited on.
    Lost(JobError),
}

impl Termination {
    /// Terminal state of the supervisor that produced this termination.
    pub fn deadline_state(&self) -> DeadlineState {
        match self {
            Termination::TimedOut { .. } => DeadlineState::Fired,
            Termination::Exited { .. } | Termination::Lost(_) => DeadlineState::Disarmed,
        }
    }
}

enum Race {
    Completed(crate::error::Result<std::process::ExitStatus>, OutputBuffer, OutputBuffer),
    Expired,
}

/// Enforces the hard time limit of one job.
#[derive(Debug, Clone, Copy)]
pub struct DeadlineSupervisor {
    deadline: Duration,
}

impl DeadlineSupervisor {
    pub fn new(deadline: Duration) -> Self {
        Self { deadline }
    }

    pub fn deadline(&self) -> Duration {
        self.deadline
    }

    /// Run the job to completion or until the deadline, measured from launch.
    pub async fn supervise(&self, mut job: JobHandle, collector: StreamCollector) -> Termination {
        let expires_at = tokio::time::Instant::from_std(job.started_at() + self.deadline);
        debug!(job_id = %job.id(), deadline_ms = self.deadline.as_millis() as u64, "deadline armed");

        let race = {
            let job = &mut job;
            let completion = async move {
                let status = job.wait().await;
                let (stdout, stderr) = collector.finish().await;
                Race::Completed(status, stdout, stderr)
            };

            tokio::select! {
                biased;
                done = completion => done,
                _ = tokio::time::sleep_until(expires_at) => Race::Expired,
            }
        };

        match race {
            Race::Completed(Ok(status), stdout, stderr) => {
                debug!(
                    job_id = %job.id(),
                    exit_code = ?status.code(),
                    elapsed_ms = job.elapsed().as_millis() as u64,
                    "deadline disarmed"
                );
                Termination::Exited {
                    exit_code: status.code(),
                    stdout,
                    stderr,
                }
            }
            Race::Completed(Err(e), _, _) => {
                error!(job_id = %job.id(), error = %e, "lost track of scrape job");
                Termination::Lost(e)
            }
            Race::Expired => {
                // The completion future, and with it the stream drains, is gone.
                warn!(
                    job_id = %job.id(),
                    pid = ?job.pid(),
                    deadline_ms = self.deadline.as_millis() as u64,
                    "scrape job exceeded deadline, killing"
                );
                match job.kill_and_reap().await {
                    Ok(status) => debug!(job_id = %job.id(), status = %status, "killed job reaped"),
                    Err(e) => error!(job_id = %job.id(), error = %e, "failed to reap killed job"),
                }
                Termination::TimedOut {
                    elapsed: job.elapsed(),
                }
            }
        }
    }
}
