use crate::CoreResult;

use async_trait::async_trait;

/// Acknowledgement from the remote service.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RemoteReply {
    /// Human-readable message, surfaced verbatim for `notify-stop`.
    pub message: Option<String>,
    /// Name the service stored an uploaded payload under.
    pub filename: Option<String>,
}

impl RemoteReply {
    /// Reply carrying only a message.
    pub fn with_message(message: impl Into<String>) -> Self {
        Self {
            message: Some(message.into()),
            filename: None,
        }
    }
}

/// A finalized recording ready for submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Payload {
    /// Concatenated chunks.
    pub bytes: Vec<u8>,
    /// Filename announced to the service.
    pub filename: String,
    /// MIME type of `bytes`.
    pub content_type: String,
}

/// Out-of-band tracker of recording state.
///
/// Every call either succeeds with a [`RemoteReply`] or fails with
/// [`SessionError::RemoteError`](crate::SessionError::RemoteError).
#[async_trait]
pub trait RemoteSync: Send + Sync {
    /// Reserve a server-tracked recording session.
    async fn notify_start(&self) -> CoreResult<RemoteReply>;

    /// Mark the session paused.
    async fn notify_pause(&self) -> CoreResult<RemoteReply>;

    /// Mark the session resumed.
    async fn notify_resume(&self) -> CoreResult<RemoteReply>;

    /// Mark the session stopped.
    async fn notify_stop(&self) -> CoreResult<RemoteReply>;

    /// Mark the session discarded.
    async fn notify_discard(&self) -> CoreResult<RemoteReply>;

    /// Upload the finalized recording.
    async fn submit_payload(&self, payload: Payload) -> CoreResult<RemoteReply>;
}
