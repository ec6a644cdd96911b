//! Capture backed by an external encoder process.
//!
//! Spawns a configured command (typically ffmpeg grabbing the screen and
//! writing WebM to stdout), slices its output into one chunk per timeslice,
//! and asks it to finish by writing `q` to its stdin.

use crate::{
    CoreResult, SessionError,
    capture::{Capture, CaptureConstraints, CaptureHandle, ChunkSender},
};

use std::{
    io,
    process::Stdio,
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
    time::Duration,
};

use async_trait::async_trait;
use tokio::{
    io::{AsyncReadExt, AsyncWriteExt},
    process::{Child, ChildStdout, Command},
    task::JoinHandle,
};
use tracing::{debug, info, instrument, warn};

/// Size of a single read from the encoder's stdout.
const READ_BUFFER_SIZE: usize = 64 * 1024;

/// How long the encoder gets to exit after being asked to quit.
pub const DEFAULT_STOP_GRACE: Duration = Duration::from_secs(3);

/// Launches an encoder process per recording attempt.
///
/// Arguments may contain `{frame_rate}` and `{cursor}` placeholders, filled
/// from the [`CaptureConstraints`] at acquisition time (`{cursor}` becomes
/// `1` or `0`).
#[derive(Debug, Clone)]
pub struct ProcessCapture {
    program: String,
    args: Vec<String>,
    stop_grace: Duration,
}

impl ProcessCapture {
    /// Capture that runs `program` with `args`.
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
            stop_grace: DEFAULT_STOP_GRACE,
        }
    }

    /// Override how long `stop` waits before killing the encoder.
    pub fn with_stop_grace(mut self, stop_grace: Duration) -> Self {
        self.stop_grace = stop_grace;
        self
    }

    fn expand_args(&self, constraints: &CaptureConstraints) -> Vec<String> {
        let cursor = if constraints.show_cursor { "1" } else { "0" };
        self.args
            .iter()
            .map(|arg| {
                arg.replace("{frame_rate}", &constraints.frame_rate.to_string())
                    .replace("{cursor}", cursor)
            })
            .collect()
    }
}

#[async_trait]
impl Capture for ProcessCapture {
    #[instrument(skip(self, chunks), fields(program = %self.program))]
    async fn acquire(
        &self,
        constraints: &CaptureConstraints,
        chunks: ChunkSender,
    ) -> CoreResult<Box<dyn CaptureHandle>> {
        let args = self.expand_args(constraints);

        let mut child = Command::new(&self.program)
            .args(&args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| match e.kind() {
                io::ErrorKind::PermissionDenied => SessionError::permission_denied(format!(
                    "Not allowed to launch {}: {}",
                    self.program, e
                )),
                _ => SessionError::device(format!("Failed to launch {}: {}", self.program, e)),
            })?;

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| SessionError::device("Failed to capture encoder stdout"))?;

        let paused = Arc::new(AtomicBool::new(false));
        let reader = tokio::spawn(pump_output(
            stdout,
            chunks,
            Arc::clone(&paused),
            constraints.timeslice,
        ));

        info!(pid = ?child.id(), "Encoder process started");

        Ok(Box::new(ProcessHandle {
            child: Some(child),
            reader: Some(reader),
            paused,
            stop_grace: self.stop_grace,
        }))
    }
}

/// Forward encoder output as one chunk per `timeslice`.
///
/// Output read while `paused` is set is discarded. Returning drops `chunks`,
/// which tells the session collector the recording is complete.
async fn pump_output(
    mut stdout: ChildStdout,
    chunks: ChunkSender,
    paused: Arc<AtomicBool>,
    timeslice: Duration,
) {
    let mut pending = Vec::new();
    let mut buf = vec![0u8; READ_BUFFER_SIZE];
    let mut ticker = tokio::time::interval(timeslice.max(Duration::from_millis(1)));
    // First tick completes immediately.
    ticker.tick().await;

    loop {
        tokio::select! {
            read = stdout.read(&mut buf) => match read {
                Ok(0) => break,
                Ok(n) => {
                    if !paused.load(Ordering::Acquire) {
                        pending.extend_from_slice(&buf[..n]);
                    }
                }
                Err(e) => {
                    warn!(error = ?e, "Encoder output read failed");
                    break;
                }
            },
            _ = ticker.tick() => {
                if !pending.is_empty() && chunks.send(std::mem::take(&mut pending)).await.is_err() {
                    debug!("Chunk collector closed, dropping encoder output");
                    return;
                }
            }
        }
    }

    if !pending.is_empty() && chunks.send(pending).await.is_err() {
        debug!("Chunk collector closed before final chunk");
    }

    debug!("Encoder output closed");
}

struct ProcessHandle {
    child: Option<Child>,
    reader: Option<JoinHandle<()>>,
    paused: Arc<AtomicBool>,
    stop_grace: Duration,
}

impl ProcessHandle {
    async fn join_reader(&mut self) {
        let Some(reader) = self.reader.take() else {
            return;
        };
        let abort = reader.abort_handle();
        match tokio::time::timeout(self.stop_grace, reader).await {
            Ok(Ok(())) => debug!("Encoder reader stopped cleanly"),
            Ok(Err(e)) => warn!(error = ?e, "Encoder reader task failed"),
            Err(_) => {
                warn!("Encoder reader did not finish in time, aborting");
                abort.abort();
            }
        }
    }
}

#[async_trait]
impl CaptureHandle for ProcessHandle {
    async fn pause(&mut self) -> CoreResult<()> {
        if self.child.is_none() {
            return Err(SessionError::device("Encoder already stopped"));
        }
        self.paused.store(true, Ordering::Release);
        debug!("Encoder output paused");
        Ok(())
    }

    async fn resume(&mut self) -> CoreResult<()> {
        if self.child.is_none() {
            return Err(SessionError::device("Encoder already stopped"));
        }
        self.paused.store(false, Ordering::Release);
        debug!("Encoder output resumed");
        Ok(())
    }

    #[instrument(skip(self))]
    async fn stop(&mut self) -> CoreResult<()> {
        let Some(mut child) = self.child.take() else {
            return Ok(());
        };

        // Keep data produced while finalizing.
        self.paused.store(false, Ordering::Release);

        if let Some(mut stdin) = child.stdin.take() {
            if let Err(e) = stdin.write_all(b"q\n").await {
                debug!(error = ?e, "Encoder stdin already closed");
            }
        }

        let result = match tokio::time::timeout(self.stop_grace, child.wait()).await {
            Ok(Ok(status)) => {
                info!(status = %status, "Encoder exited");
                Ok(())
            }
            Ok(Err(e)) => Err(SessionError::device(format!(
                "Failed to wait for encoder: {}",
                e
            ))),
            Err(_) => {
                warn!("Encoder did not exit in time, killing");
                child
                    .kill()
                    .await
                    .map_err(|e| SessionError::device(format!("Failed to kill encoder: {}", e)))
            }
        };

        // Dropping the child kills it if it is somehow still alive, which
        // closes stdout and lets the reader flush.
        drop(child);
        self.join_reader().await;

        result
    }

    async fn release(mut self: Box<Self>) {
        if let Some(mut child) = self.child.take() {
            if let Err(e) = child.kill().await {
                warn!(error = ?e, "Failed to kill encoder on release");
            }
        }
        if let Some(reader) = self.reader.take() {
            reader.abort();
        }
        info!("Capture device released");
    }
}
