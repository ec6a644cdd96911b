//! Session controller: the single owner of the recording session.
//!
//! Every user intent goes through the same gate: it must be legal for the
//! current state and no other transition may be in flight. Failures from the
//! capture or the remote service are converted into notifications and an
//! [`Outcome`]; nothing propagates past the controller.

use crate::{
    ErrorKind, SessionError,
    capture::{Capture, CaptureConstraints, CaptureHandle, Chunk},
    remote::{Payload, RemoteSync},
    session::{
        ACTIVE_RECORDING_WARNING, ChunkCollector, ControlMask, DEFAULT_CHUNK_CAPACITY,
        DEFAULT_SAMPLE_PERIOD, ElapsedClock, Notification, Outcome, SessionEvent, SessionState,
        Severity, ShutdownDecision, UiSink,
    },
};

use std::{
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
    time::Duration,
};

use tokio::sync::{Mutex, MutexGuard, watch};
use tokio_stream::Stream;
use tracing::{error, info, instrument, warn};
use uuid::Uuid;

/// Default upload size limit (300 MiB).
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 300 * 1024 * 1024;

/// Default wait for the capture to close its chunk channel after stop.
pub const DEFAULT_COLLECT_TIMEOUT: Duration = Duration::from_secs(5);

/// Tunables for a [`SessionController`].
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Parameters passed to [`Capture::acquire`].
    pub constraints: CaptureConstraints,
    /// Filename announced when uploading.
    pub upload_filename: String,
    /// MIME type of the uploaded blob.
    pub content_type: String,
    /// Largest blob `upload` will submit.
    pub max_upload_bytes: usize,
    /// Capacity of the capture → session chunk channel.
    pub chunk_capacity: usize,
    /// Period of the elapsed-time display feed.
    pub sample_period: Duration,
    /// How long `stop` waits for the last chunks.
    pub collect_timeout: Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            constraints: CaptureConstraints::default(),
            upload_filename: "recording.webm".to_string(),
            content_type: "video/webm".to_string(),
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            chunk_capacity: DEFAULT_CHUNK_CAPACITY,
            sample_period: DEFAULT_SAMPLE_PERIOD,
            collect_timeout: DEFAULT_COLLECT_TIMEOUT,
        }
    }
}

/// Resources of the current recording attempt.
#[derive(Default)]
struct Session {
    /// Log correlation id, fresh per attempt.
    id: Option<Uuid>,
    capture: Option<Box<dyn CaptureHandle>>,
    /// Live while capturing; drained into `buffer` on stop.
    collector: Option<ChunkCollector>,
    buffer: Vec<Chunk>,
}

impl Session {
    fn buffered_chunks(&self) -> usize {
        self.buffer.len() + self.collector.as_ref().map_or(0, ChunkCollector::len)
    }
}

/// Holds the transition slot until the transition settles, whichever way.
///
/// A transition future dropped before it commits leaves a transient state
/// behind; dropping the guard moves the session to that state's recovery
/// state so the controller stays usable.
struct InFlight<'a> {
    controller: &'a SessionController,
    _slot: MutexGuard<'a, ()>,
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.controller.recover_abandoned();
    }
}

/// Owns the session and drives its state machine.
///
/// Methods take `&self` so the controller can be shared (`Arc`) between the
/// task dispatching user intents and readers of state and elapsed time.
/// Only one transition runs at a time; an intent arriving while another is
/// pending is rejected as an invalid transition. [`teardown`](Self::teardown)
/// instead waits for the pending transition to settle.
pub struct SessionController {
    capture: Arc<dyn Capture>,
    remote: Arc<dyn RemoteSync>,
    sink: Arc<dyn UiSink>,
    config: SessionConfig,
    session: Mutex<Session>,
    clock: ElapsedClock,
    state_tx: watch::Sender<SessionState>,
    /// Held for the whole of a transition.
    transition: Mutex<()>,
    /// `notify-start` succeeded but capture never began.
    start_failed: AtomicBool,
}

impl SessionController {
    /// Create an idle controller wired to its collaborators.
    pub fn new(
        capture: Arc<dyn Capture>,
        remote: Arc<dyn RemoteSync>,
        sink: Arc<dyn UiSink>,
        config: SessionConfig,
    ) -> Self {
        let (state_tx, _) = watch::channel(SessionState::Idle);

        info!(
            chunk_capacity = config.chunk_capacity,
            max_upload_bytes = config.max_upload_bytes,
            "SessionController initialized"
        );

        Self {
            capture,
            remote,
            sink,
            config,
            session: Mutex::new(Session::default()),
            clock: ElapsedClock::new(),
            state_tx,
            transition: Mutex::new(()),
            start_failed: AtomicBool::new(false),
        }
    }

    /// Current state.
    pub fn state(&self) -> SessionState {
        *self.state_tx.borrow()
    }

    /// Watch state changes.
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.state_tx.subscribe()
    }

    /// Controls enabled in the current state.
    pub fn controls(&self) -> ControlMask {
        self.state().controls()
    }

    /// The session's elapsed clock. Clones observe the same clock.
    pub fn clock(&self) -> ElapsedClock {
        self.clock.clone()
    }

    /// Elapsed-time display feed at the configured period.
    pub fn elapsed_feed(&self) -> impl Stream<Item = String> + Send + 'static {
        self.clock.sample(self.config.sample_period)
    }

    /// Chunks held for the current attempt, collected or still arriving.
    pub async fn buffered_chunks(&self) -> usize {
        self.session.lock().await.buffered_chunks()
    }

    /// Total size of the finalized buffer.
    pub async fn buffered_bytes(&self) -> usize {
        self.session.lock().await.buffer.iter().map(Vec::len).sum()
    }

    /// Correlation id of the current attempt, if any.
    pub async fn session_id(&self) -> Option<Uuid> {
        self.session.lock().await.id
    }

    /// Whether a capture handle is currently held.
    pub async fn holds_capture(&self) -> bool {
        self.session.lock().await.capture.is_some()
    }

    /// Host shutdown hook: veto while a recording is running.
    pub fn request_shutdown(&self) -> ShutdownDecision {
        if self.state() == SessionState::Recording {
            warn!("Shutdown requested during an active recording");
            ShutdownDecision::Veto {
                message: ACTIVE_RECORDING_WARNING.to_string(),
            }
        } else {
            ShutdownDecision::Allow
        }
    }

    /// Begin a recording: reserve it remotely, then acquire capture.
    #[instrument(skip(self))]
    pub async fn start(&self) -> Outcome {
        let _in_flight = match self.admit(SessionEvent::Start) {
            Ok(guard) => guard,
            Err(e) => return self.reject(e),
        };

        let session_id = Uuid::new_v4();
        self.start_failed.store(false, Ordering::Release);
        {
            let mut session = self.session.lock().await;
            *session = Session {
                id: Some(session_id),
                ..Session::default()
            };
        }
        self.clock.reset();
        self.enter(SessionState::Starting, "Starting recording...");

        // Remote first: a refused reservation must never prompt for capture.
        if let Err(e) = self.remote.notify_start().await {
            let message = format!("Failed to start recording: {}", e.detail());
            return self.fail(SessionState::Idle, &e, message);
        }

        let (chunks, collector) = ChunkCollector::spawn(self.config.chunk_capacity);
        let handle = match self.capture.acquire(&self.config.constraints, chunks).await {
            Ok(handle) => handle,
            Err(e) => {
                collector.abort();
                self.start_failed.store(true, Ordering::Release);
                let message = match e.kind() {
                    ErrorKind::PermissionDenied => {
                        "Permission denied. Please allow screen recording.".to_string()
                    }
                    _ => format!("Failed to start recording: {}", e.detail()),
                };
                return self.fail(SessionState::Idle, &e, message);
            }
        };

        {
            let mut session = self.session.lock().await;
            session.capture = Some(handle);
            session.collector = Some(collector);
        }
        self.clock.start();

        info!(session_id = %session_id, "Recording started");

        self.commit(
            SessionState::Recording,
            "Recording started successfully",
            Severity::Success,
        )
    }

    /// Pause capture and freeze the clock, then tell the remote service.
    #[instrument(skip(self))]
    pub async fn pause(&self) -> Outcome {
        let _in_flight = match self.admit(SessionEvent::Pause) {
            Ok(guard) => guard,
            Err(e) => return self.reject(e),
        };

        let paused = match self.session.lock().await.capture.as_mut() {
            Some(handle) => handle.pause().await,
            None => Err(SessionError::device("No capture handle held")),
        };
        if let Err(e) = paused {
            let message = format!("Failed to pause: {}", e.detail());
            return self.fail(SessionState::Recording, &e, message);
        }
        self.clock.freeze();

        // Capture is paused locally whatever the service says.
        match self.remote.notify_pause().await {
            Ok(_) => self.commit(SessionState::Paused, "Recording paused", Severity::Info),
            Err(e) => {
                let message = format!("Failed to pause: {}", e.detail());
                self.fail(SessionState::Paused, &e, message)
            }
        }
    }

    /// Resume capture and the clock, then tell the remote service.
    #[instrument(skip(self))]
    pub async fn resume(&self) -> Outcome {
        let _in_flight = match self.admit(SessionEvent::Resume) {
            Ok(guard) => guard,
            Err(e) => return self.reject(e),
        };

        let resumed = match self.session.lock().await.capture.as_mut() {
            Some(handle) => handle.resume().await,
            None => Err(SessionError::device("No capture handle held")),
        };
        if let Err(e) = resumed {
            let message = format!("Failed to resume: {}", e.detail());
            return self.fail(SessionState::Paused, &e, message);
        }
        self.clock.resume();

        match self.remote.notify_resume().await {
            Ok(_) => self.commit(SessionState::Recording, "Recording resumed", Severity::Success),
            Err(e) => {
                let message = format!("Failed to resume: {}", e.detail());
                self.fail(SessionState::Recording, &e, message)
            }
        }
    }

    /// Finalize the recording.
    ///
    /// The device is released before the remote call, so a failed
    /// acknowledgement still ends in [`SessionState::Finished`].
    #[instrument(skip(self))]
    pub async fn stop(&self) -> Outcome {
        let _in_flight = match self.admit(SessionEvent::Stop) {
            Ok(guard) => guard,
            Err(e) => return self.reject(e),
        };

        let (handle, collector, session_id) = {
            let mut session = self.session.lock().await;
            (session.capture.take(), session.collector.take(), session.id)
        };

        self.enter(SessionState::Stopping, "Stopping recording...");

        let mut local_error = None;
        if let Some(mut handle) = handle {
            if let Err(e) = handle.stop().await {
                warn!(error = ?e, "Capture did not stop cleanly");
                local_error = Some(e);
            }
            handle.release().await;
        }
        self.clock.stop();

        let chunk_count = {
            let chunks = match collector {
                Some(collector) => Some(collector.finish(self.config.collect_timeout).await),
                None => None,
            };
            let mut session = self.session.lock().await;
            if let Some(chunks) = chunks {
                session.buffer = chunks;
            }
            session.buffer.len()
        };

        info!(
            session_id = ?session_id,
            chunk_count,
            elapsed = %self.clock.display(),
            "Recording finalized"
        );

        match (self.remote.notify_stop().await, local_error) {
            (Err(e), _) | (Ok(_), Some(e)) => {
                let message = format!("Failed to stop recording: {}", e.detail());
                self.fail(SessionState::Finished, &e, message)
            }
            (Ok(reply), None) => {
                let message = reply
                    .message
                    .unwrap_or_else(|| "Recording stopped successfully".to_string());
                self.commit(SessionState::Finished, message, Severity::Success)
            }
        }
    }

    /// Throw the recording away and return to idle.
    ///
    /// Legal from [`SessionState::Finished`], and from
    /// [`SessionState::Idle`] after a start whose capture never began.
    #[instrument(skip(self))]
    pub async fn discard(&self) -> Outcome {
        let _in_flight = match self.admit(SessionEvent::Discard) {
            Ok(guard) => guard,
            Err(e) => return self.reject(e),
        };

        let (handle, collector) = {
            let mut session = self.session.lock().await;
            let dropped = session.buffer.len();
            session.buffer.clear();
            session.id = None;
            if dropped > 0 {
                info!(chunk_count = dropped, "Buffered recording dropped");
            }
            (session.capture.take(), session.collector.take())
        };

        self.enter(SessionState::Discarding, "Discarding recording...");

        if let Some(collector) = collector {
            collector.abort();
        }
        if let Some(handle) = handle {
            warn!("Releasing residual capture handle on discard");
            handle.release().await;
        }
        self.clock.reset();
        self.start_failed.store(false, Ordering::Release);

        // Local state is already clean; the service result only affects the message.
        match self.remote.notify_discard().await {
            Ok(_) => self.commit(
                SessionState::Idle,
                "Recording discarded successfully",
                Severity::Success,
            ),
            Err(e) => {
                let message = format!("Failed to discard: {}", e.detail());
                self.fail(SessionState::Idle, &e, message)
            }
        }
    }

    /// Submit the finished recording. On failure the buffer is kept for a retry.
    #[instrument(skip(self))]
    pub async fn upload(&self) -> Outcome {
        let _in_flight = match self.admit(SessionEvent::Upload) {
            Ok(guard) => guard,
            Err(e) => return self.reject(e),
        };

        let payload = {
            let session = self.session.lock().await;
            let size: usize = session.buffer.iter().map(Vec::len).sum();

            if session.buffer.is_empty() || size == 0 {
                let e = SessionError::invalid_transition(
                    SessionEvent::Upload,
                    SessionState::Finished,
                    "No recording to upload",
                );
                return self.reject_with(e, "No recording to upload".to_string());
            }

            if size > self.config.max_upload_bytes {
                let e = SessionError::invalid_transition(
                    SessionEvent::Upload,
                    SessionState::Finished,
                    format!(
                        "Recording is {} bytes, the limit is {} bytes",
                        size, self.config.max_upload_bytes
                    ),
                );
                return self.reject(e);
            }

            Payload {
                bytes: session.buffer.concat(),
                filename: self.config.upload_filename.clone(),
                content_type: self.config.content_type.clone(),
            }
        };

        self.enter(SessionState::Uploading, "Uploading recording...");

        match self.remote.submit_payload(payload).await {
            Ok(reply) => {
                {
                    let mut session = self.session.lock().await;
                    session.buffer.clear();
                    session.id = None;
                }
                self.clock.reset();
                info!(stored_as = ?reply.filename, "Upload accepted");
                self.commit(
                    SessionState::Idle,
                    "Recording uploaded successfully",
                    Severity::Success,
                )
            }
            Err(e) => {
                let message = format!("Failed to upload: {}", e.detail());
                self.fail(SessionState::Finished, &e, message)
            }
        }
    }

    /// Release any live capture before the host exits.
    ///
    /// Waits for an in-flight transition to settle first. Local only: the
    /// remote service is not contacted. A recording that was
    /// running ends in [`SessionState::Finished`] with whatever was buffered.
    #[instrument(skip(self))]
    pub async fn teardown(&self) {
        // Wait out a pending transition so it cannot commit after us.
        let _slot = self.transition.lock().await;

        let (handle, collector) = {
            let mut session = self.session.lock().await;
            (session.capture.take(), session.collector.take())
        };

        let Some(mut handle) = handle else {
            info!("Teardown with no live capture");
            return;
        };

        if let Err(e) = handle.stop().await {
            warn!(error = ?e, "Capture did not stop cleanly during teardown");
        }
        handle.release().await;
        self.clock.stop();

        if let Some(collector) = collector {
            let chunks = collector.finish(self.config.collect_timeout).await;
            self.session.lock().await.buffer = chunks;
        }

        self.commit(
            SessionState::Finished,
            "Recording stopped for shutdown",
            Severity::Info,
        );
    }

    /// Check `event` against the current state and claim the in-flight slot.
    #[track_caller]
    fn admit(&self, event: SessionEvent) -> Result<InFlight<'_>, SessionError> {
        let Ok(slot) = self.transition.try_lock() else {
            return Err(SessionError::invalid_transition(
                event,
                self.state(),
                "another action is still in progress",
            ));
        };
        let guard = InFlight {
            controller: self,
            _slot: slot,
        };

        let state = self.state();
        let legal = state.permits(event)
            || (event == SessionEvent::Discard
                && state == SessionState::Idle
                && self.start_failed.load(Ordering::Acquire));

        if !legal {
            return Err(SessionError::invalid_transition(
                event,
                state,
                precondition(event),
            ));
        }

        Ok(guard)
    }

    /// Leave a transient state whose transition was dropped mid-flight.
    fn recover_abandoned(&self) {
        let state = self.state();
        let Some(target) = state.recovery() else {
            return;
        };

        match target {
            SessionState::Idle => self.clock.reset(),
            _ => self.clock.stop(),
        }
        self.state_tx.send_replace(target);
        warn!(from = %state, to = %target, "Transition abandoned before it settled");
        self.sink.notify(&Notification::new(
            target,
            "Previous action was interrupted",
            Severity::Error,
        ));
    }

    fn reject(&self, error: SessionError) -> Outcome {
        let message = match &error {
            SessionError::InvalidTransition { event, reason, .. } => {
                format!("Cannot {}: {}", event, reason)
            }
            other => other.detail().to_string(),
        };
        self.reject_with(error, message)
    }

    fn reject_with(&self, error: SessionError, message: String) -> Outcome {
        let state = self.state();
        warn!(state = %state, error = %error, "Intent rejected");
        self.sink.notify(&Notification::error(state, message, error.kind()));
        Outcome {
            state,
            error: Some(error.kind()),
        }
    }

    fn enter(&self, state: SessionState, message: &str) {
        self.state_tx.send_replace(state);
        self.sink
            .notify(&Notification::new(state, message, Severity::Info));
    }

    fn commit(&self, state: SessionState, message: impl Into<String>, severity: Severity) -> Outcome {
        let previous = self.state_tx.send_replace(state);
        info!(from = %previous, to = %state, "Session transition committed");
        self.sink.notify(&Notification::new(state, message, severity));
        Outcome { state, error: None }
    }

    fn fail(&self, state: SessionState, error: &SessionError, message: String) -> Outcome {
        let previous = self.state_tx.send_replace(state);
        error!(from = %previous, to = %state, error = ?error, "Session transition failed");
        self.sink
            .notify(&Notification::error(state, message, error.kind()));
        Outcome {
            state,
            error: Some(error.kind()),
        }
    }
}

/// Precondition text shown when `event` is illegal.
fn precondition(event: SessionEvent) -> &'static str {
    match event {
        SessionEvent::Start => "A recording is already in progress",
        SessionEvent::Pause => "No active recording",
        SessionEvent::Resume => "No paused recording",
        SessionEvent::Stop => "No active recording",
        SessionEvent::Discard => "No finished recording",
        SessionEvent::Upload => "No finished recording",
    }
}
