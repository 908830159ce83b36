//! Configuration for running scrape jobs.

use std::path::PathBuf;
use std::time::Duration;

/// Default wall-clock budget for one job (10 minutes).
pub const DEFAULT_DEADLINE: Duration = Duration::from_secs(600);

/// Default cap on bytes kept per output stream (10 MiB).
pub const DEFAULT_MAX_OUTPUT_BYTES: usize = 10 * 1024 * 1024;

/// Default number of stderr characters surfaced on a failed job.
pub const DEFAULT_STDERR_EXCERPT_CHARS: usize = 200;

/// Default number of stdout characters surfaced on unparseable output.
pub const DEFAULT_STDOUT_EXCERPT_CHARS: usize = 100;

/// The fixed command template of the external job.
///
/// The job is invoked as `<program> <script> <url>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobCommand {
    pub program: PathBuf,
    pub script: PathBuf,
}

impl JobCommand {
    pub fn new(program: impl Into<PathBuf>, script: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            script: script.into(),
        }
    }
}

impl Default for JobCommand {
    fn default() -> Self {
        Self::new("python", "scraper/scraper.py")
    }
}

/// Configuration for the job runner.
#[derive(Debug, Clone)]
pub struct JobConfig {
    /// Executable + script to launch
    pub command: JobCommand,
    /// Hard wall-clock limit measured from launch
    pub deadline: Duration,
    /// Bytes kept per stream before truncation
    pub max_output_bytes: usize,
    /// Cap for the stderr excerpt of a failed job
    pub stderr_excerpt_chars: usize,
    /// Cap for the stdout excerpt of unparseable output
    pub stdout_excerpt_chars: usize,
}

impl Default for JobConfig {
    fn default() -> Self {
        Self {
            command: JobCommand::default(),
            deadline: DEFAULT_DEADLINE,
            max_output_bytes: DEFAULT_MAX_OUTPUT_BYTES,
            stderr_excerpt_chars: DEFAULT_STDERR_EXCERPT_CHARS,
            stdout_excerpt_chars: DEFAULT_STDOUT_EXCERPT_CHARS,
        }
    }
}

impl JobConfig {
    /// Create a config for a specific command, with default limits.
    pub fn with_command(command: JobCommand) -> Self {
        Self {
            command,
            ..Default::default()
        }
    }

    pub fn deadline(mut self, deadline: Duration) -> Self {
        self.deadline = deadline;
        self
    }

    pub fn max_output_bytes(mut self, bytes: usize) -> Self {
        self.max_output_bytes = bytes;
        self
    }

    pub fn excerpt_chars(mut self, stderr: usize, stdout: usize) -> Self {
        self.stderr_excerpt_chars = stderr;
        self.stdout_excerpt_chars = stdout;
        self
    }
}
