//! Typed errors for the scrape job core.
//!
//! These cover the failures of the plumbing around the child process
//! (spawning it, reaching its pipes, waiting on it). None of them escape
//! [`crate::JobRunner::run`]; the runner folds each one into an
//! [`crate::Outcome`] before returning.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while launching or supervising a scrape job.
#[derive(Debug, Error)]
pub enum JobError {
    /// The executable could not be started (not found, not executable,
    /// process table exhausted, ...)
    #[error("failed to spawn {program}: {source}")]
    Spawn {
        program: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The child started but one of its output pipes was not available
    #[error("job started without a piped {stream}")]
    MissingPipe { stream: &'static str },

    /// Waiting on the child process failed
    #[error("failed to wait on job: {0}")]
    Wait(#[source] std::io::Error),
}

/// Result type alias for job operations.
pub type Result<T> = std::result::Result<T, JobError>;
