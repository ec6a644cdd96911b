//! Screen-session Core Library
//!
//! Drives a single screen-recording session: capture, chunk buffering,
//! elapsed-time accounting, and synchronization with a remote recording
//! service, all behind one state machine that never lets an error escape.
//!
//! # Example
//!
//! ```no_run
//! use screen_session_core::{
//!     HttpRemoteSync, Notification, ProcessCapture, SessionConfig, SessionController, UiSink,
//!     CoreResult, DEFAULT_REQUEST_TIMEOUT,
//! };
//!
//! use std::sync::Arc;
//!
//! struct PrintSink;
//!
//! impl UiSink for PrintSink {
//!     fn notify(&self, notification: &Notification) {
//!         println!("[{}] {}", notification.state, notification.message);
//!     }
//! }
//!
//! #[tokio::main]
//! async fn main() -> CoreResult<()> {
//!     let remote = HttpRemoteSync::new("http://localhost:5000", DEFAULT_REQUEST_TIMEOUT)?;
//!     let capture = ProcessCapture::new("ffmpeg", vec!["-f".into(), "x11grab".into()]);
//!     let controller = SessionController::new(
//!         Arc::new(capture),
//!         Arc::new(remote),
//!         Arc::new(PrintSink),
//!         SessionConfig::default(),
//!     );
//!
//!     controller.start().await;
//!     tokio::time::sleep(std::time::Duration::from_secs(3)).await;
//!     controller.stop().await;
//!     controller.upload().await;
//!     Ok(())
//! }
//! ```

mod capture;
mod error;
mod remote;
mod session;

pub use {
    capture::{
        Capture, CaptureConstraints, CaptureHandle, Chunk, ChunkSender, DEFAULT_STOP_GRACE,
        ProcessCapture,
    },
    error::{ErrorKind, Result as CoreResult, SessionError},
    remote::{DEFAULT_REQUEST_TIMEOUT, HttpRemoteSync, Payload, RemoteReply, RemoteSync},
    session::{
        ACTIVE_RECORDING_WARNING, ControlMask, DEFAULT_CHUNK_CAPACITY, DEFAULT_COLLECT_TIMEOUT,
        DEFAULT_MAX_UPLOAD_BYTES, DEFAULT_SAMPLE_PERIOD, ElapsedClock, Notification, Outcome,
        SessionConfig, SessionController, SessionEvent, SessionState, Severity, ShutdownDecision,
        UiSink, format_elapsed,
    },
};

#[cfg(test)]
mod tests;
