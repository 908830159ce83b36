//! Stream collector - drains a job's stdout and stderr concurrently.
//!
//! Each stream gets its own task, so a job flooding one pipe while leaving
//! the other idle can never block on a full pipe buffer. Buffers are capped:
//! bytes past the limit are still read (the job keeps making progress) but
//! are dropped and counted instead of stored.

use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::task::JoinError;
use tokio_util::task::AbortOnDropHandle;
use tracing::warn;

/// Read size per chunk.
const CHUNK_SIZE: usize = 8 * 1024;

/// Append-only, size-capped accumulation of one output stream.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OutputBuffer {
    bytes: Vec<u8>,
    limit: usize,
    dropped: u64,
}

impl OutputBuffer {
    pub fn with_limit(limit: usize) -> Self {
        Self {
            bytes: Vec::new(),
            limit,
            dropped: 0,
        }
    }

    /// Append a chunk, keeping only what still fits under the limit.
    pub fn push(&mut self, chunk: &[u8]) {
        let room = self.limit.saturating_sub(self.bytes.len());
        let keep = room.min(chunk.len());
        self.bytes.extend_from_slice(&chunk[..keep]);
        self.dropped += (chunk.len() - keep) as u64;
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn is_truncated(&self) -> bool {
        self.dropped > 0
    }

    /// Bytes that were read but not stored.
    pub fn dropped_bytes(&self) -> u64 {
        self.dropped
    }

    /// Lossy UTF-8 rendering, with a marker when output was cut off.
    pub fn to_text(&self) -> String {
        let mut text = String::from_utf8_lossy(&self.bytes).into_owned();
        if self.is_truncated() {
            text.push_str(&format!("\n...[truncated {} bytes]", self.dropped));
        }
        text
    }
}

/// Read `reader` to end-of-stream into a buffer capped at `limit` bytes.
///
/// A read error ends the drain; whatever was read before it is kept.
pub async fn drain<R>(mut reader: R, limit: usize, stream: &'static str) -> OutputBuffer
where
    R: AsyncRead + Unpin,
{
    let mut buffer = OutputBuffer::with_limit(limit);
    let mut chunk = vec![0u8; CHUNK_SIZE];

    loop {
        match reader.read(&mut chunk).await {
            Ok(0) => break,
            Ok(n) => buffer.push(&chunk[..n]),
            Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
            Err(e) => {
                warn!(stream, error = %e, "job stream read failed");
                break;
            }
        }
    }

    if buffer.is_truncated() {
        warn!(
            stream,
            kept = buffer.len(),
            dropped = buffer.dropped_bytes(),
            "job output exceeded buffer limit"
        );
    }

    buffer
}

/// The two drain tasks of one job.
///
/// Dropping the collector (or a pending [`StreamCollector::finish`]) aborts
/// any drain still running, which closes its end of the pipe.
pub struct StreamCollector {
    stdout: AbortOnDropHandle<OutputBuffer>,
    stderr: AbortOnDropHandle<OutputBuffer>,
}

impl StreamCollector {
    /// Spawn one drain task per stream.
    pub fn attach<O, E>(stdout: O, stderr: E, limit: usize) -> Self
    where
        O: AsyncRead + Unpin + Send + 'static,
        E: AsyncRead + Unpin + Send + 'static,
    {
        Self {
            stdout: AbortOnDropHandle::new(tokio::spawn(drain(stdout, limit, "stdout"))),
            stderr: AbortOnDropHandle::new(tokio::spawn(drain(stderr, limit, "stderr"))),
        }
    }

    /// Wait for both streams to reach end-of-stream.
    ///
    /// Returns `(stdout, stderr)`.
    pub async fn finish(self) -> (OutputBuffer, OutputBuffer) {
        let (stdout, stderr) = tokio::join!(self.stdout, self.stderr);
        (settle(stdout, "stdout"), settle(stderr, "stderr"))
    }
}

fn settle(joined: Result<OutputBuffer, JoinError>, stream: &'static str) -> OutputBuffer {
    joined.unwrap_or_else(|e| {
        warn!(stream, error = %e, "job stream drain did not complete");
        OutputBuffer::default()
    })
}
