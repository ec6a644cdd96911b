//! Configuration management for screen-session.
//!
//! Handles loading and saving TOML configuration files with cross-platform
//! paths, validation, and atomic write operations.

use crate::{
    AppError, AppResult,
    config::{ALLOWED_UPLOAD_EXTENSIONS, CaptureConfig, ServerConfig, SessionSettings},
};

use std::{
    fs,
    io::Write,
    panic::Location,
    path::{Path, PathBuf},
    time::Duration,
};

use directories::ProjectDirs;
use error_location::ErrorLocation;
use screen_session_core::SessionConfig;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

/// Main configuration struct.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Remote recording service.
    #[serde(default)]
    pub server: ServerConfig,
    /// Encoder process.
    #[serde(default)]
    pub capture: CaptureConfig,
    /// Session tunables.
    #[serde(default)]
    pub session: SessionSettings,
}

impl Config {
    /// Load configuration from the platform config dir, creating a default
    /// file if none exists.
    #[track_caller]
    #[instrument]
    pub fn load() -> AppResult<Self> {
        let config_path = Self::config_path()?;

        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            info!("No config found, creating default");
            Self::create_default(&config_path)
        }
    }

    /// Load and validate configuration from `path`.
    #[track_caller]
    pub fn load_from(path: &Path) -> AppResult<Self> {
        let contents = fs::read_to_string(path).map_err(|e| AppError::ConfigError {
            reason: format!("Failed to read config: {}", e),
            location: ErrorLocation::from(Location::caller()),
        })?;

        let config: Config = toml::from_str(&contents).map_err(|e| AppError::ConfigError {
            reason: format!("Failed to parse config: {}", e),
            location: ErrorLocation::from(Location::caller()),
        })?;

        config.validate()?;

        info!(config_path = ?path, "Configuration loaded");

        Ok(config)
    }

    /// Reject values the session cannot run with.
    #[track_caller]
    pub fn validate(&self) -> AppResult<()> {
        let filename = &self.session.upload_filename;
        let extension = Path::new(filename)
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase);
        if !extension.is_some_and(|ext| ALLOWED_UPLOAD_EXTENSIONS.contains(&ext.as_str())) {
            return Err(AppError::ConfigError {
                reason: format!(
                    "Upload filename {:?} must end in one of: {}",
                    filename,
                    ALLOWED_UPLOAD_EXTENSIONS.join(", ")
                ),
                location: ErrorLocation::from(Location::caller()),
            });
        }

        let zero_fields = [
            ("server.request_timeout_secs", self.server.request_timeout_secs == 0),
            ("capture.frame_rate", self.capture.frame_rate == 0),
            ("capture.timeslice_ms", self.capture.timeslice_ms == 0),
            ("session.max_upload_bytes", self.session.max_upload_bytes == 0),
            ("session.chunk_capacity", self.session.chunk_capacity == 0),
            ("session.sample_period_ms", self.session.sample_period_ms == 0),
            ("session.collect_timeout_ms", self.session.collect_timeout_ms == 0),
        ];
        if let Some((field, _)) = zero_fields.iter().find(|(_, is_zero)| *is_zero) {
            return Err(AppError::ConfigError {
                reason: format!("{} must be greater than zero", field),
                location: ErrorLocation::from(Location::caller()),
            });
        }

        if self.capture.program.trim().is_empty() {
            return Err(AppError::ConfigError {
                reason: "capture.program must not be empty".to_string(),
                location: ErrorLocation::from(Location::caller()),
            });
        }

        Ok(())
    }

    /// Controller settings derived from this configuration.
    pub fn session_config(&self) -> SessionConfig {
        SessionConfig {
            constraints: self.capture.constraints(),
            upload_filename: self.session.upload_filename.clone(),
            content_type: self.session.content_type.clone(),
            max_upload_bytes: self.session.max_upload_bytes,
            chunk_capacity: self.session.chunk_capacity,
            sample_period: Duration::from_millis(self.session.sample_period_ms),
            collect_timeout: Duration::from_millis(self.session.collect_timeout_ms),
        }
    }

    /// Save configuration to `path` using atomic write pattern.
    ///
    /// Writes to a temporary file first, then renames to prevent corruption
    /// if the process crashes during the write.
    #[track_caller]
    pub fn save_to(&self, path: &Path) -> AppResult<()> {
        let contents = toml::to_string_pretty(self).map_err(|e| AppError::ConfigError {
            reason: format!("Failed to serialize config: {}", e),
            location: ErrorLocation::from(Location::caller()),
        })?;

        // Atomic write: write to temp file then rename
        let temp_path = path.with_extension("toml.tmp");

        let mut temp_file = fs::File::create(&temp_path).map_err(|e| AppError::ConfigError {
            reason: format!("Failed to create temp config file: {}", e),
            location: ErrorLocation::from(Location::caller()),
        })?;

        temp_file
            .write_all(contents.as_bytes())
            .map_err(|e| AppError::ConfigError {
                reason: format!("Failed to write temp config file: {}", e),
                location: ErrorLocation::from(Location::caller()),
            })?;

        temp_file.sync_all().map_err(|e| AppError::ConfigError {
            reason: format!("Failed to sync temp config file: {}", e),
            location: ErrorLocation::from(Location::caller()),
        })?;

        fs::rename(&temp_path, path).map_err(|e| AppError::ConfigError {
            reason: format!("Failed to rename temp config to final: {}", e),
            location: ErrorLocation::from(Location::caller()),
        })?;

        info!(config_path = ?path, "Configuration saved (atomic write)");

        Ok(())
    }

    #[track_caller]
    fn config_path() -> AppResult<PathBuf> {
        let proj_dirs =
            ProjectDirs::from("com", "screen-session", "Screen-Session").ok_or_else(|| {
                AppError::ConfigError {
                    reason: "Failed to get config directory".to_string(),
                    location: ErrorLocation::from(Location::caller()),
                }
            })?;

        let config_dir = proj_dirs.config_dir();

        if !config_dir.exists() {
            fs::create_dir_all(config_dir)?;
            debug!(config_dir = ?config_dir, "Created config directory");
        }

        Ok(config_dir.join("config.toml"))
    }

    #[track_caller]
    fn create_default(path: &Path) -> AppResult<Self> {
        let config = Config::default();
        config.save_to(path)?;

        info!(
            config_path = ?path,
            base_url = %config.server.base_url,
            "Default config created"
        );

        Ok(config)
    }
}
