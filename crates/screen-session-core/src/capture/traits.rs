//! Capture collaborator interface.

use crate::CoreResult;

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

/// One opaque segment of encoded media.
pub type Chunk = Vec<u8>;

/// Producer side of the session's bounded chunk channel.
pub type ChunkSender = mpsc::Sender<Chunk>;

/// Requested capture parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaptureConstraints {
    /// Target frame rate.
    pub frame_rate: u32,
    /// Whether to capture system audio alongside video.
    pub capture_audio: bool,
    /// Whether the cursor is drawn into the capture.
    pub show_cursor: bool,
    /// Container/codec the encoder should produce.
    pub mime_type: String,
    /// How often the encoder emits a chunk.
    pub timeslice: Duration,
}

impl Default for CaptureConstraints {
    fn default() -> Self {
        Self {
            frame_rate: 30,
            capture_audio: true,
            show_cursor: true,
            mime_type: "video/webm;codecs=vp9,opus".to_string(),
            timeslice: Duration::from_secs(1),
        }
    }
}

/// Screen/audio acquisition and encoding.
#[async_trait]
pub trait Capture: Send + Sync {
    /// Acquire the device and start encoding into `chunks`.
    ///
    /// Chunks must be pushed in order. The capture must drop `chunks` once
    /// the handle is stopped or released so the session can finish
    /// collecting.
    ///
    /// # Errors
    ///
    /// [`SessionError::PermissionDenied`](crate::SessionError::PermissionDenied)
    /// when access is refused, otherwise
    /// [`SessionError::DeviceError`](crate::SessionError::DeviceError).
    async fn acquire(
        &self,
        constraints: &CaptureConstraints,
        chunks: ChunkSender,
    ) -> CoreResult<Box<dyn CaptureHandle>>;
}

/// An acquired device + encoder, exclusively owned by the session.
#[async_trait]
pub trait CaptureHandle: Send {
    /// Stop emitting chunks without releasing the device.
    async fn pause(&mut self) -> CoreResult<()>;

    /// Resume emitting chunks.
    async fn resume(&mut self) -> CoreResult<()>;

    /// Finalize the encoder and flush any pending chunk.
    async fn stop(&mut self) -> CoreResult<()>;

    /// Release the device. Consumes the handle so it cannot be released twice.
    async fn release(self: Box<Self>);
}
