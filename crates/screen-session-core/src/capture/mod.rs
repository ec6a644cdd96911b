mod process;
mod traits;

pub use {
    process::{DEFAULT_STOP_GRACE, ProcessCapture},
    traits::{Capture, CaptureConstraints, CaptureHandle, Chunk, ChunkSender},
};
