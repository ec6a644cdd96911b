mod capture_config;
#[allow(clippy::module_inception)]
mod config;
mod server_config;
mod session_config;

pub(crate) use {
    capture_config::CaptureConfig, config::Config, server_config::ServerConfig,
    session_config::SessionSettings,
};

pub(crate) const DEFAULT_BASE_URL: &str = "http://localhost:5000";
pub(crate) const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

pub(crate) const DEFAULT_PROGRAM: &str = "ffmpeg";
pub(crate) const DEFAULT_FRAME_RATE: u32 = 30;
pub(crate) const DEFAULT_CAPTURE_AUDIO: bool = true;
pub(crate) const DEFAULT_SHOW_CURSOR: bool = true;
pub(crate) const DEFAULT_TIMESLICE_MS: u64 = 1000;

pub(crate) const DEFAULT_UPLOAD_FILENAME: &str = "recording.webm";
pub(crate) const DEFAULT_CONTENT_TYPE: &str = "video/webm";
pub(crate) const DEFAULT_SAMPLE_PERIOD_MS: u64 = 1000;
pub(crate) const DEFAULT_COLLECT_TIMEOUT_MS: u64 = 5000;

/// Extensions the recording service accepts for uploads.
pub(crate) const ALLOWED_UPLOAD_EXTENSIONS: [&str; 2] = ["webm", "mp4"];

pub(crate) fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

pub(crate) fn default_request_timeout_secs() -> u64 {
    DEFAULT_REQUEST_TIMEOUT_SECS
}

pub(crate) fn default_program() -> String {
    DEFAULT_PROGRAM.to_string()
}

pub(crate) fn default_input_args() -> Vec<String> {
    to_strings(&[
        "-f",
        "x11grab",
        "-framerate",
        "{frame_rate}",
        "-draw_mouse",
        "{cursor}",
        "-i",
        ":0.0",
    ])
}

pub(crate) fn default_audio_args() -> Vec<String> {
    to_strings(&["-f", "pulse", "-i", "default"])
}

pub(crate) fn default_output_args() -> Vec<String> {
    to_strings(&[
        "-c:v",
        "libvpx-vp9",
        "-deadline",
        "realtime",
        "-c:a",
        "libopus",
        "-f",
        "webm",
        "-",
    ])
}

pub(crate) fn default_frame_rate() -> u32 {
    DEFAULT_FRAME_RATE
}

pub(crate) fn default_capture_audio() -> bool {
    DEFAULT_CAPTURE_AUDIO
}

pub(crate) fn default_show_cursor() -> bool {
    DEFAULT_SHOW_CURSOR
}

pub(crate) fn default_timeslice_ms() -> u64 {
    DEFAULT_TIMESLICE_MS
}

pub(crate) fn default_upload_filename() -> String {
    DEFAULT_UPLOAD_FILENAME.to_string()
}

pub(crate) fn default_content_type() -> String {
    DEFAULT_CONTENT_TYPE.to_string()
}

pub(crate) fn default_max_upload_bytes() -> usize {
    screen_session_core::DEFAULT_MAX_UPLOAD_BYTES
}

pub(crate) fn default_chunk_capacity() -> usize {
    screen_session_core::DEFAULT_CHUNK_CAPACITY
}

pub(crate) fn default_sample_period_ms() -> u64 {
    DEFAULT_SAMPLE_PERIOD_MS
}

pub(crate) fn default_collect_timeout_ms() -> u64 {
    DEFAULT_COLLECT_TIMEOUT_MS
}

fn to_strings(args: &[&str]) -> Vec<String> {
    args.iter().map(|a| a.to_string()).collect()
}
