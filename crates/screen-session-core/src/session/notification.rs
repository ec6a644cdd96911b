use crate::{
    ErrorKind,
    session::{ControlMask, SessionState},
};

use serde::Serialize;

/// How the UI should present a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Progress or neutral status.
    Info,
    /// A transition completed as requested.
    Success,
    /// A transition was refused or degraded.
    Error,
}

/// One state report delivered to the [`UiSink`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notification {
    /// State after the report.
    pub state: SessionState,
    /// User-facing message.
    pub message: String,
    /// Presentation severity.
    pub severity: Severity,
    /// Error category when `severity` is [`Severity::Error`].
    pub kind: Option<ErrorKind>,
    /// Controls enabled in `state`.
    pub controls: ControlMask,
}

impl Notification {
    pub(crate) fn new(state: SessionState, message: impl Into<String>, severity: Severity) -> Self {
        Self {
            state,
            message: message.into(),
            severity,
            kind: None,
            controls: state.controls(),
        }
    }

    pub(crate) fn error(state: SessionState, message: impl Into<String>, kind: ErrorKind) -> Self {
        Self {
            kind: Some(kind),
            ..Self::new(state, message, Severity::Error)
        }
    }

    /// Whether the UI should show a busy indicator.
    pub fn busy(&self) -> bool {
        self.state.is_transient()
    }
}

/// Passive consumer of state-transition notifications.
///
/// Called on the controller's task; implementations must not block.
pub trait UiSink: Send + Sync {
    /// Receive one notification.
    fn notify(&self, notification: &Notification);
}

/// Result of a user intent, as seen by the caller.
///
/// The controller never propagates errors; instead it reports the state it
/// settled in and the category of any failure on the way.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Outcome {
    /// State the controller settled in.
    pub state: SessionState,
    /// Failure category, if the intent did not fully succeed.
    pub error: Option<ErrorKind>,
}

impl Outcome {
    /// Whether the intent completed without any failure.
    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }
}
