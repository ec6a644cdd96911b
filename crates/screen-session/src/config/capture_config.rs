use crate::config::{
    default_audio_args, default_capture_audio, default_frame_rate, default_input_args,
    default_output_args, default_program, default_show_cursor, default_timeslice_ms,
};

use std::time::Duration;

use screen_session_core::{CaptureConstraints, ProcessCapture};
use serde::{Deserialize, Serialize};

/// Encoder process configuration.
///
/// The command line is `input_args`, then `audio_args` when audio is
/// captured, then `output_args`. Output must go to stdout.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaptureConfig {
    /// Encoder executable.
    #[serde(default = "default_program")]
    pub program: String,
    /// Screen input arguments. `{frame_rate}` and `{cursor}` are substituted.
    #[serde(default = "default_input_args")]
    pub input_args: Vec<String>,
    /// Audio input arguments, used only when `capture_audio` is set.
    #[serde(default = "default_audio_args")]
    pub audio_args: Vec<String>,
    /// Encoding and output arguments.
    #[serde(default = "default_output_args")]
    pub output_args: Vec<String>,
    /// Target frame rate, substituted for `{frame_rate}`.
    #[serde(default = "default_frame_rate")]
    pub frame_rate: u32,
    /// Whether system audio is recorded.
    #[serde(default = "default_capture_audio")]
    pub capture_audio: bool,
    /// Whether the cursor is drawn, substituted for `{cursor}`.
    #[serde(default = "default_show_cursor")]
    pub show_cursor: bool,
    /// Chunk emission period in milliseconds.
    #[serde(default = "default_timeslice_ms")]
    pub timeslice_ms: u64,
}

impl CaptureConfig {
    /// Full encoder argument list.
    pub fn args(&self) -> Vec<String> {
        let mut args = self.input_args.clone();
        if self.capture_audio {
            args.extend(self.audio_args.iter().cloned());
        }
        args.extend(self.output_args.iter().cloned());
        args
    }

    /// Constraints handed to the session controller.
    pub fn constraints(&self) -> CaptureConstraints {
        CaptureConstraints {
            frame_rate: self.frame_rate,
            capture_audio: self.capture_audio,
            show_cursor: self.show_cursor,
            timeslice: Duration::from_millis(self.timeslice_ms),
            ..CaptureConstraints::default()
        }
    }

    /// Encoder-process capture built from this config.
    pub fn process_capture(&self) -> ProcessCapture {
        ProcessCapture::new(self.program.clone(), self.args())
    }
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            program: default_program(),
            input_args: default_input_args(),
            audio_args: default_audio_args(),
            output_args: default_output_args(),
            frame_rate: default_frame_rate(),
            capture_audio: default_capture_audio(),
            show_cursor: default_show_cursor(),
            timeslice_ms: default_timeslice_ms(),
        }
    }
}
