//! Collaborator doubles shared by the controller tests.

use crate::{
    Capture, CaptureConstraints, CaptureHandle, Chunk, ChunkSender, CoreResult, Notification,
    Payload, RemoteReply, RemoteSync, SessionConfig, SessionController, SessionError, UiSink,
};

use std::{
    collections::HashSet,
    sync::{Arc, Mutex},
    time::Duration,
};

use async_trait::async_trait;
use tokio::sync::Notify;

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|e| e.into_inner())
}

/// How [`MockCapture::acquire`] behaves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Acquire {
    Grant,
    PermissionDenied,
    DeviceError,
}

/// Capture that emits canned chunks and logs every call.
pub(crate) struct MockCapture {
    acquire: Acquire,
    /// Pushed as soon as capture is acquired.
    initial_chunks: Vec<Chunk>,
    /// Pushed when the handle is stopped.
    final_chunk: Option<Chunk>,
    fail_pause: bool,
    log: Arc<Mutex<Vec<&'static str>>>,
}

impl MockCapture {
    pub(crate) fn granting(initial_chunks: Vec<Chunk>, final_chunk: Option<Chunk>) -> Self {
        Self {
            acquire: Acquire::Grant,
            initial_chunks,
            final_chunk,
            fail_pause: false,
            log: Arc::default(),
        }
    }

    pub(crate) fn refusing(acquire: Acquire) -> Self {
        Self {
            acquire,
            ..Self::granting(Vec::new(), None)
        }
    }

    pub(crate) fn with_failing_pause(mut self) -> Self {
        self.fail_pause = true;
        self
    }

    pub(crate) fn log(&self) -> Vec<&'static str> {
        lock(&self.log).clone()
    }

    pub(crate) fn count(&self, call: &str) -> usize {
        lock(&self.log).iter().filter(|c| **c == call).count()
    }
}

#[async_trait]
impl Capture for MockCapture {
    async fn acquire(
        &self,
        _constraints: &CaptureConstraints,
        chunks: ChunkSender,
    ) -> CoreResult<Box<dyn CaptureHandle>> {
        lock(&self.log).push("acquire");
        match self.acquire {
            Acquire::Grant => {}
            Acquire::PermissionDenied => {
                return Err(SessionError::permission_denied("user dismissed the picker"));
            }
            Acquire::DeviceError => return Err(SessionError::device("no display found")),
        }

        for chunk in &self.initial_chunks {
            let _ = chunks.try_send(chunk.clone());
        }

        Ok(Box::new(MockHandle {
            chunks: Some(chunks),
            final_chunk: self.final_chunk.clone(),
            fail_pause: self.fail_pause,
            log: Arc::clone(&self.log),
        }))
    }
}

struct MockHandle {
    chunks: Option<ChunkSender>,
    final_chunk: Option<Chunk>,
    fail_pause: bool,
    log: Arc<Mutex<Vec<&'static str>>>,
}

#[async_trait]
impl CaptureHandle for MockHandle {
    async fn pause(&mut self) -> CoreResult<()> {
        lock(&self.log).push("pause");
        if self.fail_pause {
            return Err(SessionError::device("encoder refused to pause"));
        }
        Ok(())
    }

    async fn resume(&mut self) -> CoreResult<()> {
        lock(&self.log).push("resume");
        Ok(())
    }

    async fn stop(&mut self) -> CoreResult<()> {
        lock(&self.log).push("stop");
        if let (Some(chunks), Some(chunk)) = (self.chunks.as_ref(), self.final_chunk.take()) {
            let _ = chunks.send(chunk).await;
        }
        self.chunks = None;
        Ok(())
    }

    async fn release(self: Box<Self>) {
        lock(&self.log).push("release");
    }
}

/// Remote service double with switchable failures.
#[derive(Default)]
pub(crate) struct MockRemote {
    calls: Mutex<Vec<&'static str>>,
    failing: Mutex<HashSet<&'static str>>,
    stop_message: Option<String>,
    /// Operation held until the gate is notified.
    gate: Option<(&'static str, Arc<Notify>)>,
    uploads: Mutex<Vec<Payload>>,
}

impl MockRemote {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn failing(operations: &[&'static str]) -> Self {
        let remote = Self::new();
        for &operation in operations {
            remote.fail(operation);
        }
        remote
    }

    /// `operation` waits for `gate` before answering.
    pub(crate) fn gated(operation: &'static str, gate: Arc<Notify>) -> Self {
        Self {
            gate: Some((operation, gate)),
            ..Self::default()
        }
    }

    pub(crate) fn with_stop_message(mut self, message: &str) -> Self {
        self.stop_message = Some(message.to_string());
        self
    }

    pub(crate) fn fail(&self, operation: &'static str) {
        lock(&self.failing).insert(operation);
    }

    pub(crate) fn recover(&self, operation: &'static str) {
        lock(&self.failing).remove(operation);
    }

    pub(crate) fn calls(&self) -> Vec<&'static str> {
        lock(&self.calls).clone()
    }

    pub(crate) fn uploads(&self) -> Vec<Payload> {
        lock(&self.uploads).clone()
    }

    async fn hold(&self, operation: &'static str) {
        if let Some((gated, gate)) = &self.gate
            && *gated == operation
        {
            gate.notified().await;
        }
    }

    fn respond(&self, operation: &'static str) -> CoreResult<RemoteReply> {
        lock(&self.calls).push(operation);
        if lock(&self.failing).contains(operation) {
            return Err(SessionError::remote(operation, "Server error: service unavailable"));
        }
        Ok(RemoteReply::default())
    }
}

#[async_trait]
impl RemoteSync for MockRemote {
    async fn notify_start(&self) -> CoreResult<RemoteReply> {
        self.hold("notify-start").await;
        self.respond("notify-start")
    }

    async fn notify_pause(&self) -> CoreResult<RemoteReply> {
        self.hold("notify-pause").await;
        self.respond("notify-pause")
    }

    async fn notify_resume(&self) -> CoreResult<RemoteReply> {
        self.hold("notify-resume").await;
        self.respond("notify-resume")
    }

    async fn notify_stop(&self) -> CoreResult<RemoteReply> {
        self.hold("notify-stop").await;
        let mut reply = self.respond("notify-stop")?;
        reply.message = self.stop_message.clone();
        Ok(reply)
    }

    async fn notify_discard(&self) -> CoreResult<RemoteReply> {
        self.respond("notify-discard")
    }

    async fn submit_payload(&self, payload: Payload) -> CoreResult<RemoteReply> {
        self.hold("submit-payload").await;
        self.respond("submit-payload")?;
        lock(&self.uploads).push(payload);
        Ok(RemoteReply {
            message: Some("Video uploaded successfully".to_string()),
            filename: Some("stored.webm".to_string()),
        })
    }
}

/// UI sink that remembers every notification.
#[derive(Default)]
pub(crate) struct RecordingSink {
    notifications: Mutex<Vec<Notification>>,
}

impl RecordingSink {
    pub(crate) fn notifications(&self) -> Vec<Notification> {
        lock(&self.notifications).clone()
    }

    pub(crate) fn last(&self) -> Option<Notification> {
        lock(&self.notifications).last().cloned()
    }
}

impl UiSink for RecordingSink {
    fn notify(&self, notification: &Notification) {
        lock(&self.notifications).push(notification.clone());
    }
}

/// Controller config with short timeouts for tests.
pub(crate) fn test_config() -> SessionConfig {
    SessionConfig {
        collect_timeout: Duration::from_secs(1),
        ..SessionConfig::default()
    }
}

/// Controller wired to the given doubles plus a fresh [`RecordingSink`].
pub(crate) fn controller(
    capture: &Arc<MockCapture>,
    remote: &Arc<MockRemote>,
) -> (Arc<SessionController>, Arc<RecordingSink>) {
    controller_with(capture, remote, test_config())
}

pub(crate) fn controller_with(
    capture: &Arc<MockCapture>,
    remote: &Arc<MockRemote>,
    config: SessionConfig,
) -> (Arc<SessionController>, Arc<RecordingSink>) {
    let sink = Arc::new(RecordingSink::default());
    let controller = SessionController::new(
        Arc::clone(capture) as Arc<dyn Capture>,
        Arc::clone(remote) as Arc<dyn RemoteSync>,
        Arc::clone(&sink) as Arc<dyn UiSink>,
        config,
    );
    (Arc::new(controller), sink)
}
