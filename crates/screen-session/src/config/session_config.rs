use crate::config::{
    default_chunk_capacity, default_collect_timeout_ms, default_content_type,
    default_max_upload_bytes, default_sample_period_ms, default_upload_filename,
};

use serde::{Deserialize, Serialize};

/// Recording session tunables.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionSettings {
    /// Filename announced when uploading.
    #[serde(default = "default_upload_filename")]
    pub upload_filename: String,
    /// MIME type of the uploaded recording.
    #[serde(default = "default_content_type")]
    pub content_type: String,
    /// Largest recording that will be uploaded.
    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: usize,
    /// Chunks that may queue between capture and session.
    #[serde(default = "default_chunk_capacity")]
    pub chunk_capacity: usize,
    /// Elapsed-time display period in milliseconds.
    #[serde(default = "default_sample_period_ms")]
    pub sample_period_ms: u64,
    /// How long stop waits for the final chunks, in milliseconds.
    #[serde(default = "default_collect_timeout_ms")]
    pub collect_timeout_ms: u64,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            upload_filename: default_upload_filename(),
            content_type: default_content_type(),
            max_upload_bytes: default_max_upload_bytes(),
            chunk_capacity: default_chunk_capacity(),
            sample_period_ms: default_sample_period_ms(),
            collect_timeout_ms: default_collect_timeout_ms(),
        }
    }
}
