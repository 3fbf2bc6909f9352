//! # Error Types
//!
//! Custom error types for Gamepad Mapper using `thiserror`.

use thiserror::Error;

/// Main error type for Gamepad Mapper
#[derive(Debug, Error)]
pub enum MapperError {
    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] toml::de::Error),

    /// Profile store errors
    #[error("Profile error: {0}")]
    Profile(#[from] serde_json::Error),

    /// Profile store misuse (duplicate or empty name)
    #[error("Invalid profile: {0}")]
    InvalidProfile(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Controller device errors
    #[error("Controller error: {0}")]
    Controller(String),

    /// No usable gamepad was found
    #[error("No gamepad found under /dev/input")]
    ControllerNotFound,

    /// Output sink errors
    #[error("Output sink error: {0}")]
    Sink(String),
}

/// Result type alias for Gamepad Mapper
pub type Result<T> = std::result::Result<T, MapperError>;
