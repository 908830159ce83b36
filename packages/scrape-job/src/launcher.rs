//! Launcher - starts the external scrape job as a child process.
//!
//! On Unix the job becomes the leader of its own process group, so that
//! anything it starts (browsers, drivers, shells) is torn down with it.

use std::process::{ExitStatus, Stdio};
use std::time::{Duration, Instant};

use tokio::process::{Child, ChildStderr, ChildStdout, Command};
use tracing::{debug, info};
use uuid::Uuid;

use crate::config::JobCommand;
use crate::error::{JobError, Result};

/// Handle to a running scrape job.
///
/// Owns the child process. If the handle is dropped before the job was
/// reaped, the job (and its process group) is killed.
#[derive(Debug)]
pub struct JobHandle {
    id: Uuid,
    child: Child,
    pid: Option<u32>,
    started_at: Instant,
    reaped: bool,
}

/// Spawn `<program> <script> <url>` with piped stdout/stderr.
///
/// Nothing is written to the job's stdin; it is connected to `/dev/null`.
pub fn launch(command: &JobCommand, url: &str, id: Uuid) -> Result<JobHandle> {
    let mut cmd = Command::new(&command.program);
    cmd.arg(&command.script)
        .arg(url)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    #[cfg(unix)]
    cmd.process_group(0);

    let child = cmd.spawn().map_err(|source| JobError::Spawn {
        program: command.program.clone(),
        source,
    })?;

    let pid = child.id();
    info!(job_id = %id, pid = ?pid, program = %command.program.display(), "scrape job launched");

    Ok(JobHandle {
        id,
        child,
        pid,
        started_at: Instant::now(),
        reaped: false,
    })
}

impl JobHandle {
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// OS process id (and process group id on Unix).
    pub fn pid(&self) -> Option<u32> {
        self.pid
    }

    pub fn started_at(&self) -> Instant {
        self.started_at
    }

    pub fn elapsed(&self) -> Duration {
        self.started_at.elapsed()
    }

    /// Hand the output pipes over to the caller.
    ///
    /// Can only succeed once per job.
    pub fn take_streams(&mut self) -> Result<(ChildStdout, ChildStderr)> {
        let stdout = self
            .child
            .stdout
            .take()
            .ok_or(JobError::MissingPipe { stream: "stdout" })?;
        let stderr = self
            .child
            .stderr
            .take()
            .ok_or(JobError::MissingPipe { stream: "stderr" })?;
        Ok((stdout, stderr))
    }

    /// Wait for the job to exit on its own.
    pub async fn wait(&mut self) -> Result<ExitStatus> {
        let status = self.child.wait().await.map_err(JobError::Wait)?;
        self.reaped = true;
        Ok(status)
    }

    /// Kill the job and everything it started, then wait until the job
    /// process has been reaped.
    pub async fn kill_and_reap(&mut self) -> Result<ExitStatus> {
        self.kill_group();
        // Fails when the process already exited; the wait below still reaps it.
        if let Err(e) = self.child.start_kill() {
            debug!(job_id = %self.id, error = %e, "kill signal not delivered");
        }
        self.wait().await
    }

    #[cfg(unix)]
    fn kill_group(&self) {
        use nix::sys::signal::{killpg, Signal};
        use nix::unistd::Pid;

        let Some(pid) = self.pid else { return };
        // The job was started with process_group(0), so its pid is the pgid.
        if let Err(errno) = killpg(Pid::from_raw(pid as i32), Signal::SIGKILL) {
            debug!(job_id = %self.id, error = %errno, "process group kill failed");
        }
    }

    #[cfg(not(unix))]
    fn kill_group(&self) {}
}

impl Drop for JobHandle {
    fn drop(&mut self) {
        // kill_on_drop only reaches the direct child.
        if !self.reaped {
            self.kill_group();
        }
    }
}
