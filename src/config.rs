//! Observer configuration
//!
//! Every field has a default, so an empty JSON object (or no file at all) is
//! a valid configuration.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Overrides `backend_url` when set
pub const BACKEND_URL_ENV: &str = "ACTIVITY_BACKEND_URL";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid config: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ObserverConfig {
    /// Where JSONL segments are written
    pub logs_dir: PathBuf,

    /// Where screenshots are written
    pub screenshots_dir: PathBuf,

    pub upload_interval_secs: u64,

    /// Endpoint that hands out upload destinations
    pub backend_url: String,

    pub request_timeout_secs: u64,

    /// Minimum spacing of recorded mouse moves
    pub mouse_throttle_ms: u64,

    pub window_poll_interval_secs: u64,

    /// Length of one screenshot scheduling window
    pub screenshot_window_secs: u64,

    pub captures_per_window: usize,
}

impl Default for ObserverConfig {
    fn default() -> Self {
        Self {
            logs_dir: PathBuf::from("./activity/logs"),
            screenshots_dir: PathBuf::from("./activity/screenshots"),
            upload_interval_secs: 30,
            backend_url: "http://localhost:8000/generate-upload-url".to_string(),
            request_timeout_secs: 30,
            mouse_throttle_ms: 250,
            window_poll_interval_secs: 1,
            screenshot_window_secs: 3600,
            captures_per_window: 4,
        }
    }
}

impl ObserverConfig {
    /// Read a JSON config file, apply environment overrides and validate.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = serde_json::from_str(&raw)?;
        config.with_env_overrides().validated()
    }

    /// Defaults plus environment overrides.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::default().with_env_overrides().validated()
    }

    fn with_env_overrides(mut self) -> Self {
        if let Ok(url) = std::env::var(BACKEND_URL_ENV) {
            if !url.trim().is_empty() {
                self.backend_url = url;
            }
        }
        self
    }

    pub fn validated(self) -> Result<Self, ConfigError> {
        let intervals = [
            ("upload_interval_secs", self.upload_interval_secs),
            ("request_timeout_secs", self.request_timeout_secs),
            ("window_poll_interval_secs", self.window_poll_interval_secs),
            ("screenshot_window_secs", self.screenshot_window_secs),
        ];
        if let Some((name, _)) = intervals.iter().find(|(_, value)| *value == 0) {
            return Err(ConfigError::Invalid(format!("{name} must be greater than zero")));
        }
        if self.backend_url.trim().is_empty() {
            return Err(ConfigError::Invalid("backend_url is empty".to_string()));
        }
        Ok(self)
    }

    pub fn upload_interval(&self) -> Duration {
        Duration::from_secs(self.upload_interval_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn mouse_throttle(&self) -> Duration {
        Duration::from_millis(self.mouse_throttle_ms)
    }

    pub fn window_poll_interval(&self) -> Duration {
        Duration::from_secs(self.window_poll_interval_secs)
    }

    pub fn screenshot_window(&self) -> Duration {
        Duration::from_secs(self.screenshot_window_secs)
    }
}
