//! # Configuration Module
//!
//! Handles loading and validating configuration from TOML files.

use serde::Deserialize;
use serde::de::Error;
use std::fs;
use std::path::Path;
use std::time::Duration;

use crate::error::{MapperError, Result};
use crate::output::uinput::MAX_DEVICE_NAME_LEN;

/// Main configuration structure
#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub controller: ControllerConfig,
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub profiles: ProfilesConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Controller configuration
#[derive(Debug, Deserialize, Clone)]
pub struct ControllerConfig {
    /// Empty means auto-detect.
    #[serde(default)]
    pub device_path: String,

    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,

    /// Delay between scans while no gamepad is connected.
    #[serde(default = "default_reconnect_interval_ms")]
    pub reconnect_interval_ms: u64,
}

/// Virtual output device configuration
#[derive(Debug, Deserialize, Clone)]
pub struct OutputConfig {
    #[serde(default = "default_device_name")]
    pub device_name: String,
}

/// Profile store configuration
#[derive(Debug, Deserialize, Clone)]
pub struct ProfilesConfig {
    #[serde(default = "default_profiles_path")]
    pub path: String,

    /// Overrides the store's selected profile when non-empty.
    #[serde(default)]
    pub selected: String,
}

/// Logging configuration
#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Empty means stderr only.
    #[serde(default)]
    pub log_dir: String,
}

// Default value functions
fn default_poll_interval_ms() -> u64 { 16 }
fn default_reconnect_interval_ms() -> u64 { 1000 }
fn default_device_name() -> String { "gamepad-mapper virtual input".to_string() }
fn default_profiles_path() -> String { "config/profiles.json".to_string() }
fn default_log_level() -> String { "info".to_string() }

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            device_path: String::new(),
            poll_interval_ms: default_poll_interval_ms(),
            reconnect_interval_ms: default_reconnect_interval_ms(),
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            device_name: default_device_name(),
        }
    }
}

impl Default for ProfilesConfig {
    fn default() -> Self {
        Self {
            path: default_profiles_path(),
            selected: String::new(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            log_dir: String::new(),
        }
    }
}

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

impl ControllerConfig {
    /// Explicit device path, or `None` to auto-detect.
    #[must_use]
    pub fn device_path(&self) -> Option<&str> {
        if self.device_path.is_empty() {
            None
        } else {
            Some(&self.device_path)
        }
    }

    /// Stick poller cadence.
    #[must_use]
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    /// Gamepad rescan cadence.
    #[must_use]
    pub fn reconnect_interval(&self) -> Duration {
        Duration::from_millis(self.reconnect_interval_ms)
    }
}

impl Config {
    /// Load configuration from a TOML file
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the configuration file
    ///
    /// # Returns
    ///
    /// * `Result<Config>` - Loaded and validated configuration
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - File cannot be read
    /// - TOML parsing fails
    /// - Validation fails
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use gamepad_mapper::config::Config;
    ///
    /// let config = Config::load("config/default.toml")?;
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration values
    ///
    /// # Errors
    ///
    /// Returns error if any configuration value is out of valid range
    pub fn validate(&self) -> Result<()> {
        if self.controller.poll_interval_ms == 0 || self.controller.poll_interval_ms > 1000 {
            return Err(MapperError::Config(
                toml::de::Error::custom("poll_interval_ms must be between 1 and 1000")
            ));
        }

        if self.controller.reconnect_interval_ms == 0
            || self.controller.reconnect_interval_ms > 60000 {
            return Err(MapperError::Config(
                toml::de::Error::custom("reconnect_interval_ms must be between 1 and 60000")
            ));
        }

        if self.output.device_name.is_empty()
            || self.output.device_name.len() > MAX_DEVICE_NAME_LEN {
            return Err(MapperError::Config(
                toml::de::Error::custom(format!(
                    "output device_name must be 1-{} bytes",
                    MAX_DEVICE_NAME_LEN
                ))
            ));
        }

        if self.profiles.path.is_empty() {
            return Err(MapperError::Config(
                toml::de::Error::custom("profiles path cannot be empty")
            ));
        }

        if !LOG_LEVELS.contains(&self.logging.level.as_str()) {
            return Err(MapperError::Config(
                toml::de::Error::custom("logging level must be one of: trace, debug, info, warn, error")
            ));
        }

        Ok(())
    }
}
