//! Unified error type hierarchy for the LogForge shell
//!
//! Provides structured error handling with BridgeError, ConfigError and ShellError.

use std::io;
use thiserror::Error;

/// Failure of a backend bridge call.
///
/// The bridge carries no structured error codes, only a message.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{0}")]
pub struct BridgeError(pub String);

impl BridgeError {
    pub fn new(message: impl Into<String>) -> Self {
        BridgeError(message.into())
    }

    pub fn message(&self) -> &str {
        &self.0
    }
}

impl From<reqwest::Error> for BridgeError {
    fn from(e: reqwest::Error) -> Self {
        BridgeError(e.to_string())
    }
}

impl From<serde_json::Error> for BridgeError {
    fn from(e: serde_json::Error) -> Self {
        BridgeError(format!("Malformed backend response: {}", e))
    }
}

/// Shell configuration file parsing and persistence errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Configuration file not found: {0}")]
    FileNotFound(String),

    #[error("Invalid JSON in config: {0}")]
    InvalidJson(#[from] serde_json::Error),

    #[error("Configuration validation failed: {0}")]
    ValidationFailed(String),

    #[error("IO error during config operations: {0}")]
    IoError(#[from] io::Error),
}

/// Input field a batch submission cannot proceed without.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequiredInput {
    Target,
    InputDir,
    OutputDir,
}

/// Errors surfaced by shell operations.
#[derive(Error, Debug, Clone)]
pub enum ShellError {
    /// A required user input is missing; handled locally, the backend is never contacted
    #[error("Missing required input: {0:?}")]
    MissingInput(RequiredInput),

    /// A backend bridge call failed
    #[error("Backend call failed: {0}")]
    Bridge(#[from] BridgeError),

    /// Logging pipeline could not be set up or flushed
    #[error("Logging error: {0}")]
    Logging(String),
}

impl ShellError {
    /// Get a user-facing error message suitable for UI display
    pub fn user_message(&self) -> String {
        match self {
            ShellError::MissingInput(RequiredInput::Target) => "Please select a project".to_string(),
            ShellError::MissingInput(RequiredInput::InputDir) => {
                "Please select an input directory".to_string()
            }
            ShellError::MissingInput(RequiredInput::OutputDir) => {
                "Please select an output directory".to_string()
            }
            ShellError::Bridge(e) => e.to_string(),
            ShellError::Logging(msg) => format!("Logging failed: {}", msg),
        }
    }
}

/// Top-level result type for startup operations that may fail.
pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error>>;
