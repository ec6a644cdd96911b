mod buffer;
mod clock;
mod controller;
mod notification;
mod shutdown;
mod state;

pub(crate) use buffer::ChunkCollector;

pub use {
    buffer::DEFAULT_CHUNK_CAPACITY,
    clock::{DEFAULT_SAMPLE_PERIOD, ElapsedClock, format_elapsed},
    controller::{
        DEFAULT_COLLECT_TIMEOUT, DEFAULT_MAX_UPLOAD_BYTES, SessionConfig, SessionController,
    },
    notification::{Notification, Outcome, Severity, UiSink},
    shutdown::{ACTIVE_RECORDING_WARNING, ShutdownDecision},
    state::{ControlMask, SessionEvent, SessionState},
};
