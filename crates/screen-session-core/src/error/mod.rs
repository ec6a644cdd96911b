use crate::session::{SessionEvent, SessionState};

use std::panic::Location;

use error_location::ErrorLocation;
use serde::Serialize;
use thiserror::Error;

/// Session errors with source location tracking.
#[derive(Error, Debug)]
pub enum SessionError {
    /// Event is not legal in the current state. Never sent upstream.
    #[error("Cannot {event} while {state}: {reason} {location}")]
    InvalidTransition {
        /// The rejected event.
        event: SessionEvent,
        /// State the controller was in when the event arrived.
        state: SessionState,
        /// Human-readable precondition that was violated.
        reason: String,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// Capture access was refused by the user or the environment.
    #[error("Permission denied: {reason} {location}")]
    PermissionDenied {
        /// Description of the refusal.
        reason: String,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// Capture acquisition or a capture operation failed.
    #[error("Capture device error: {reason} {location}")]
    DeviceError {
        /// Description of the device error.
        reason: String,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// A synchronization call failed or returned non-success.
    #[error("Remote {operation} failed: {reason} {location}")]
    RemoteError {
        /// Remote operation that failed (e.g. `notify-start`).
        operation: &'static str,
        /// Server-provided or transport error detail.
        reason: String,
        /// Source location where error occurred.
        location: ErrorLocation,
    },
}

impl SessionError {
    /// Build an [`SessionError::InvalidTransition`] at the caller's location.
    #[track_caller]
    pub fn invalid_transition(
        event: SessionEvent,
        state: SessionState,
        reason: impl Into<String>,
    ) -> Self {
        SessionError::InvalidTransition {
            event,
            state,
            reason: reason.into(),
            location: ErrorLocation::from(Location::caller()),
        }
    }

    /// Build a [`SessionError::DeviceError`] at the caller's location.
    #[track_caller]
    pub fn device(reason: impl Into<String>) -> Self {
        SessionError::DeviceError {
            reason: reason.into(),
            location: ErrorLocation::from(Location::caller()),
        }
    }

    /// Build a [`SessionError::PermissionDenied`] at the caller's location.
    #[track_caller]
    pub fn permission_denied(reason: impl Into<String>) -> Self {
        SessionError::PermissionDenied {
            reason: reason.into(),
            location: ErrorLocation::from(Location::caller()),
        }
    }

    /// Build a [`SessionError::RemoteError`] at the caller's location.
    #[track_caller]
    pub fn remote(operation: &'static str, reason: impl Into<String>) -> Self {
        SessionError::RemoteError {
            operation,
            reason: reason.into(),
            location: ErrorLocation::from(Location::caller()),
        }
    }

    /// Classification used to pick the user-facing message category.
    pub fn kind(&self) -> ErrorKind {
        match self {
            SessionError::InvalidTransition { .. } => ErrorKind::InvalidTransition,
            SessionError::PermissionDenied { .. } => ErrorKind::PermissionDenied,
            SessionError::DeviceError { .. } => ErrorKind::DeviceError,
            SessionError::RemoteError { .. } => ErrorKind::RemoteError,
        }
    }

    /// Detail text without the source location, suitable for the UI sink.
    pub fn detail(&self) -> &str {
        match self {
            SessionError::InvalidTransition { reason, .. }
            | SessionError::PermissionDenied { reason, .. }
            | SessionError::DeviceError { reason, .. }
            | SessionError::RemoteError { reason, .. } => reason,
        }
    }
}

/// Error category reported to the UI sink.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Event illegal in the current state, rejected locally.
    InvalidTransition,
    /// Capture access refused.
    PermissionDenied,
    /// Capture failed for a non-permission reason.
    DeviceError,
    /// Remote synchronization failed.
    RemoteError,
}

/// Result type alias using [`SessionError`].
pub type Result<T> = std::result::Result<T, SessionError>;
