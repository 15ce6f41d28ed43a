//! Shell configuration module.
//!
//! The shell keeps only its own window/connection preferences; everything the
//! user edits on the settings page belongs to the backend.
//!
//! # Module Structure
//!
//! - `loader`: settings path resolution and JSON (de)serialization
//!
//! # Settings Management
//!
//! The `SettingsManager` loads `ShellConfig` from `~/.config/logforge/shell.json`:
//! - missing file yields defaults
//! - unparseable file logs a warning and yields defaults
//! - `LOGFORGE_BACKEND_URL` and `LOGFORGE_LOG_LEVEL` override the file
//! - the merged config is validated; an invalid one logs a warning and yields defaults

pub mod loader;

use crate::error::ConfigError;
use crate::models::PageId;
use std::path::Path;
use std::time::Duration;

pub use loader::{get_global_settings_path, load_config_from_file, save_config_to_file};

/// Timer cadences of the readiness poller, job poller and status banners.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct PollTimings {
    pub readiness_interval_ms: u64,
    pub readiness_max_attempts: u32,
    pub ready_banner_ms: u64,
    pub failure_banner_ms: u64,
    pub job_poll_interval_ms: u64,
}

impl Default for PollTimings {
    fn default() -> Self {
        PollTimings {
            readiness_interval_ms: 1000,
            readiness_max_attempts: 60,
            ready_banner_ms: 3000,
            failure_banner_ms: 8000,
            job_poll_interval_ms: 1000,
        }
    }
}

impl PollTimings {
    pub fn readiness_interval(&self) -> Duration {
        Duration::from_millis(self.readiness_interval_ms)
    }

    pub fn ready_banner(&self) -> Duration {
        Duration::from_millis(self.ready_banner_ms)
    }

    pub fn failure_banner(&self) -> Duration {
        Duration::from_millis(self.failure_banner_ms)
    }

    pub fn job_poll_interval(&self) -> Duration {
        Duration::from_millis(self.job_poll_interval_ms)
    }
}

/// Persistent shell preferences
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct ShellConfig {
    /// Base URL of the backend bridge endpoint
    pub backend_url: String,
    /// Location token opened on startup
    pub start_page: String,
    /// Minimum level written by the log collector (error, warn, info, debug, trace)
    pub log_level: String,
    pub window_width: f32,
    pub window_height: f32,
    pub timings: PollTimings,
}

impl Default for ShellConfig {
    fn default() -> Self {
        ShellConfig {
            backend_url: "http://127.0.0.1:34115".to_string(),
            start_page: PageId::Sample.token().to_string(),
            log_level: "info".to_string(),
            window_width: 1200.0,
            window_height: 800.0,
            timings: PollTimings::default(),
        }
    }
}

impl ShellConfig {
    /// Level filter for the log collector; unknown names fall back to Info.
    pub fn level_filter(&self) -> log::LevelFilter {
        self.log_level.parse().unwrap_or(log::LevelFilter::Info)
    }

    /// Reject values the shell cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.backend_url.starts_with("http://") || self.backend_url.starts_with("https://")) {
            return Err(ConfigError::ValidationFailed(format!(
                "backend_url must be an http(s) URL, got '{}'",
                self.backend_url
            )));
        }
        if self.timings.readiness_max_attempts == 0 {
            return Err(ConfigError::ValidationFailed(
                "readiness_max_attempts must be at least 1".to_string(),
            ));
        }
        if self.timings.job_poll_interval_ms == 0 || self.timings.readiness_interval_ms == 0 {
            return Err(ConfigError::ValidationFailed(
                "poll intervals must be non-zero".to_string(),
            ));
        }
        Ok(())
    }

    /// Apply `LOGFORGE_*` overrides looked up through `var`. Blank values are ignored.
    fn apply_overrides(&mut self, var: impl Fn(&str) -> Option<String>) {
        let value = |key: &str| var(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        if let Some(url) = value("LOGFORGE_BACKEND_URL") {
            self.backend_url = url;
        }
        if let Some(level) = value("LOGFORGE_LOG_LEVEL") {
            self.log_level = level;
        }
    }
}

/// Loads and persists `ShellConfig` at the global settings path
pub struct SettingsManager;

impl SettingsManager {
    /// Load the shell config, or return defaults if the file doesn't exist.
    ///
    /// A file that fails to parse or validate logs a warning and yields defaults
    /// instead of preventing startup.
    pub fn load() -> Result<ShellConfig, ConfigError> {
        let path = get_global_settings_path()?;
        Self::load_from(&path)
    }

    /// Load from an explicit path with the same fallback rules as [`SettingsManager::load`].
    pub fn load_from(path: &Path) -> Result<ShellConfig, ConfigError> {
        Self::load_with(path, |key| std::env::var(key).ok())
    }

    /// Overrides are applied before validation, so an override is held to
    /// the same rules as the file.
    fn load_with(path: &Path, var: impl Fn(&str) -> Option<String>) -> Result<ShellConfig, ConfigError> {
        let mut config = match load_config_from_file(path) {
            Ok(config) => config,
            Err(ConfigError::FileNotFound(_)) => ShellConfig::default(),
            Err(ConfigError::InvalidJson(e)) => {
                log::warn!("[Config] Failed to parse shell config, falling back to defaults: {}", e);
                ShellConfig::default()
            }
            Err(e) => return Err(e),
        };
        config.apply_overrides(var);
        if let Err(e) = config.validate() {
            log::warn!("[Config] Invalid shell config, falling back to defaults: {}", e);
            return Ok(ShellConfig::default());
        }
        Ok(config)
    }

    pub fn save_to(config: &ShellConfig, path: &Path) -> Result<(), ConfigError> {
        config.validate()?;
        save_config_to_file(config, path)
    }
}
