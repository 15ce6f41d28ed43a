//! LogForge desktop shell
//!
//! This crate provides the egui application shell for LogForge, which turns
//! pasted log samples into generated parsing programs and runs them over
//! directories of log files. All heavy lifting happens in the backend service,
//! reached through the [`bridge::BackendBridge`] trait.
//!
//! The system is organized into functional modules:
//! - **error**: Unified error type hierarchy
//! - **models**: Core data structures and wire types
//! - **bridge**: Backend bridge trait and HTTP implementation
//! - **config**: Shell configuration management
//! - **orchestrator**: Readiness and job progress pollers
//! - **ui**: Router, page registry, dialogs, pages and the egui app

// Core foundational modules
pub mod error;
pub mod models;

// Backend bridge
pub mod bridge;

// Shell configuration
pub mod config;

// Robust, decoupled logging system
pub mod log_collector;

// Background pollers
pub mod orchestrator;

// Router, pages and egui integration
pub mod ui;

// Re-export the log crate for macro usage
pub use log;

// Re-export log collector for use throughout the system
pub use log_collector::{LogCollector, LogLine};

// ============================================================================
// PUBLIC RE-EXPORTS FOR CONVENIENCE
// ============================================================================

pub use bridge::{BackendBridge, BridgeResult, HttpBridge};
pub use config::{PollTimings, SettingsManager, ShellConfig};
pub use error::{BridgeError, ConfigError, RequiredInput, Result, ShellError};
pub use models::{
    BackendSettings, EnvStatus, GenerateResult, JobProgress, JobRequest, JobStatus, JobTarget, LlmSettings,
    PageId, PageParams, StatusBadge, Tone,
};
pub use ui::{AppUI, ShellController, ShellEvent};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
