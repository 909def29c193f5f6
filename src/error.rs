// src/error.rs

//! Unified error handling for the watcher application.

use std::fmt;

use thiserror::Error;

/// Result type alias for watcher operations.
pub type Result<T> = std::result::Result<T, AppError>;

/// Unified application error type.
#[derive(Error, Debug)]
pub enum AppError {
    /// I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// HTTP request failed
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// TOML parsing failed
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// TOML serialization failed
    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    /// URL parsing failed
    #[error("URL parse error: {0}")]
    Url(#[from] url::ParseError),

    /// CSS selector or regex pattern failed to compile
    #[error("Invalid pattern '{pattern}': {message}")]
    Pattern { pattern: String, message: String },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Rejected user input to a control command. The display text is
    /// meant to be shown to the user as-is.
    #[error("{0}")]
    Validation(String),

    /// Transport or authentication failure while polling one target
    #[error("Fetch error for {target}: {message}")]
    Fetch { target: String, message: String },

    /// Page markup did not match the expected shape
    #[error("Parse error: {0}")]
    Parse(String),

    /// Worker did not exit within the stop grace period and was aborted
    #[error("watcher worker did not stop within {grace_secs}s and was aborted")]
    CancellationTimeout { grace_secs: u64 },
}

impl AppError {
    /// Create a pattern compilation error.
    pub fn pattern(pattern: impl Into<String>, message: impl fmt::Display) -> Self {
        Self::Pattern {
            pattern: pattern.into(),
            message: message.to_string(),
        }
    }

    /// Create a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Create a fetch error with its target attached.
    pub fn fetch(target: impl Into<String>, message: impl fmt::Display) -> Self {
        Self::Fetch {
            target: target.into(),
            message: message.to_string(),
        }
    }

    /// Create a parse error.
    pub fn parse(message: impl Into<String>) -> Self {
        Self::Parse(message.into())
    }
}
