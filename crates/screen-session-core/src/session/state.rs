//! Session state machine vocabulary.
//!
//! Defines the eight session states, the six user intents, and the control
//! mask derived from a state.

use std::fmt;

use serde::Serialize;

/// Current state of the recording session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionState {
    /// No recording in progress.
    #[default]
    Idle,
    /// Remote reservation and capture acquisition in flight.
    Starting,
    /// Capture running, clock running.
    Recording,
    /// Capture paused, clock frozen.
    Paused,
    /// Capture being stopped and released.
    Stopping,
    /// Recording finalized and buffered, awaiting discard or upload.
    Finished,
    /// Buffer being disposed of.
    Discarding,
    /// Buffer being submitted to the remote service.
    Uploading,
}

impl SessionState {
    /// Whether `event` is legal from this state.
    ///
    /// Discarding a failed start from [`SessionState::Idle`] is decided by the
    /// controller, which knows whether the remote reservation succeeded.
    pub fn permits(self, event: SessionEvent) -> bool {
        use SessionEvent as E;
        use SessionState as S;

        matches!(
            (self, event),
            (S::Idle, E::Start)
                | (S::Recording, E::Pause)
                | (S::Paused, E::Resume)
                | (S::Recording | S::Paused, E::Stop)
                | (S::Finished, E::Discard | E::Upload)
        )
    }

    /// States that only exist while a transition is awaiting a collaborator.
    pub fn is_transient(self) -> bool {
        matches!(
            self,
            SessionState::Starting
                | SessionState::Stopping
                | SessionState::Discarding
                | SessionState::Uploading
        )
    }

    /// Stable state to fall back to when a transition is abandoned while
    /// in this transient state. `None` for stable states.
    ///
    /// Starting and discarding fall back to idle. Stopping and uploading
    /// fall back to finished, where nothing is owned but the buffer.
    pub fn recovery(self) -> Option<SessionState> {
        match self {
            SessionState::Starting | SessionState::Discarding => Some(SessionState::Idle),
            SessionState::Stopping | SessionState::Uploading => Some(SessionState::Finished),
            _ => None,
        }
    }

    /// States in which the session may own a capture handle.
    pub fn holds_capture(self) -> bool {
        matches!(
            self,
            SessionState::Starting
                | SessionState::Recording
                | SessionState::Paused
                | SessionState::Stopping
        )
    }

    /// Enable/disable mask for the six user-facing commands.
    pub fn controls(self) -> ControlMask {
        ControlMask {
            start: self.permits(SessionEvent::Start),
            pause: self.permits(SessionEvent::Pause),
            resume: self.permits(SessionEvent::Resume),
            stop: self.permits(SessionEvent::Stop),
            discard: self.permits(SessionEvent::Discard),
            upload: self.permits(SessionEvent::Upload),
        }
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SessionState::Idle => "idle",
            SessionState::Starting => "starting",
            SessionState::Recording => "recording",
            SessionState::Paused => "paused",
            SessionState::Stopping => "stopping",
            SessionState::Finished => "finished",
            SessionState::Discarding => "discarding",
            SessionState::Uploading => "uploading",
        };
        f.write_str(name)
    }
}

/// User intents accepted by the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionEvent {
    /// Begin a new recording.
    Start,
    /// Pause the active recording.
    Pause,
    /// Resume a paused recording.
    Resume,
    /// Finalize the recording.
    Stop,
    /// Throw the finished recording away.
    Discard,
    /// Submit the finished recording.
    Upload,
}

impl SessionEvent {
    /// All events, in control-mask order.
    pub const ALL: [SessionEvent; 6] = [
        SessionEvent::Start,
        SessionEvent::Pause,
        SessionEvent::Resume,
        SessionEvent::Stop,
        SessionEvent::Discard,
        SessionEvent::Upload,
    ];
}

impl fmt::Display for SessionEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SessionEvent::Start => "start",
            SessionEvent::Pause => "pause",
            SessionEvent::Resume => "resume",
            SessionEvent::Stop => "stop",
            SessionEvent::Discard => "discard",
            SessionEvent::Upload => "upload",
        };
        f.write_str(name)
    }
}

/// Which of the six commands the UI should offer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct ControlMask {
    /// Start enabled.
    pub start: bool,
    /// Pause enabled.
    pub pause: bool,
    /// Resume enabled.
    pub resume: bool,
    /// Stop enabled.
    pub stop: bool,
    /// Discard enabled.
    pub discard: bool,
    /// Upload enabled.
    pub upload: bool,
}

impl ControlMask {
    /// Whether the control for `event` is enabled.
    pub fn allows(&self, event: SessionEvent) -> bool {
        match event {
            SessionEvent::Start => self.start,
            SessionEvent::Pause => self.pause,
            SessionEvent::Resume => self.resume,
            SessionEvent::Stop => self.stop,
            SessionEvent::Discard => self.discard,
            SessionEvent::Upload => self.upload,
        }
    }

    /// Enabled events, in control-mask order.
    pub fn enabled(&self) -> impl Iterator<Item = SessionEvent> + '_ {
        SessionEvent::ALL
            .into_iter()
            .filter(|event| self.allows(*event))
    }
}
