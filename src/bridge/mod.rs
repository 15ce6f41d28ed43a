//! Backend bridge contract
//!
//! Every backend capability the shell consumes goes through [`BackendBridge`].
//! Calls are asynchronous and resolve to a value or a [`BridgeError`] carrying
//! only a message. The production implementation is [`HttpBridge`]; tests
//! substitute scripted doubles.

pub mod http;

use crate::error::BridgeError;
use crate::models::{BackendSettings, EnvStatus, GenerateResult, JobProgress, JobRequest, JobTarget};
use futures::future::BoxFuture;

pub use http::HttpBridge;

/// Result of a bridge call.
pub type BridgeResult<T> = std::result::Result<T, BridgeError>;

/// Trait for backend operations (configuration, environment, job execution)
pub trait BackendBridge: Send + Sync {
    /// Whether the code-generation model connection is configured and usable.
    fn is_configured(&self) -> BoxFuture<'static, BridgeResult<bool>>;

    fn get_show_wizard(&self) -> BoxFuture<'static, BridgeResult<bool>>;
    fn set_show_wizard(&self, show: bool) -> BoxFuture<'static, BridgeResult<()>>;

    /// Readiness of the execution environment the generated programs run in.
    fn get_environment_ready(&self) -> BoxFuture<'static, BridgeResult<EnvStatus>>;

    /// Ordered list of runnable job targets.
    fn list_job_targets(&self) -> BoxFuture<'static, BridgeResult<Vec<JobTarget>>>;
    fn delete_job_target(&self, id: String) -> BoxFuture<'static, BridgeResult<()>>;

    /// Start a backend-side batch job. Returns once the job is accepted.
    fn submit_job(&self, request: JobRequest) -> BoxFuture<'static, BridgeResult<()>>;
    fn get_job_progress(&self) -> BoxFuture<'static, BridgeResult<JobProgress>>;

    /// Ask the user for a directory. An empty string means the picker was cancelled.
    fn select_directory(&self, prompt: String) -> BoxFuture<'static, BridgeResult<String>>;
    fn open_directory(&self, path: String) -> BoxFuture<'static, BridgeResult<()>>;

    fn test_remote_connection(&self) -> BoxFuture<'static, BridgeResult<()>>;

    fn get_settings(&self) -> BoxFuture<'static, BridgeResult<BackendSettings>>;
    fn save_settings(&self, settings: BackendSettings) -> BoxFuture<'static, BridgeResult<()>>;

    /// Generate a parsing program from a pasted log sample.
    fn analyze_sample(
        &self,
        project_name: String,
        sample: String,
    ) -> BoxFuture<'static, BridgeResult<GenerateResult>>;
}
