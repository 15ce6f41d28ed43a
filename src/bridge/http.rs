//! HTTP implementation of the backend bridge.
//!
//! Each bridge method maps to `POST {base_url}/api/{Method}` with a JSON object
//! body. A 2xx response carries the JSON result (an empty body stands for "no
//! value"); any other status carries the error message as plain text.
//! Directory picking and opening are host-local and never touch the backend.

use super::{BackendBridge, BridgeResult};
use crate::error::BridgeError;
use crate::models::{BackendSettings, EnvStatus, GenerateResult, JobProgress, JobRequest, JobTarget};
use futures::future::{BoxFuture, FutureExt};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use std::time::Duration;

/// Sample analysis involves a model round-trip, so allow generous time.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(180);

#[derive(Clone)]
pub struct HttpBridge {
    client: reqwest::Client,
    base_url: String,
}

impl HttpBridge {
    pub fn new(base_url: impl Into<String>) -> BridgeResult<Self> {
        let client = reqwest::Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        let base_url = base_url.into().trim_end_matches('/').to_string();
        log::info!("[Bridge] Using backend at {}", base_url);
        Ok(HttpBridge { client, base_url })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn call<T: DeserializeOwned>(&self, method: &'static str, args: Value) -> BridgeResult<T> {
        let url = format!("{}/api/{}", self.base_url, method);
        log::debug!("[Bridge] -> {}", method);

        let response = self.client.post(&url).json(&args).send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            let message = body.trim();
            log::debug!("[Bridge] <- {} failed ({}): {}", method, status, message);
            return Err(if message.is_empty() {
                BridgeError(format!("{} failed with status {}", method, status))
            } else {
                BridgeError(message.to_string())
            });
        }

        let body = if body.trim().is_empty() { "null" } else { body.as_str() };
        Ok(serde_json::from_str(body)?)
    }

    fn spawn_call<T>(&self, method: &'static str, args: Value) -> BoxFuture<'static, BridgeResult<T>>
    where
        T: DeserializeOwned + Send + 'static,
    {
        let this = self.clone();
        async move { this.call(method, args).await }.boxed()
    }
}

impl BackendBridge for HttpBridge {
    fn is_configured(&self) -> BoxFuture<'static, BridgeResult<bool>> {
        self.spawn_call("IsConfigured", json!({}))
    }

    fn get_show_wizard(&self) -> BoxFuture<'static, BridgeResult<bool>> {
        self.spawn_call("GetShowWizard", json!({}))
    }

    fn set_show_wizard(&self, show: bool) -> BoxFuture<'static, BridgeResult<()>> {
        self.spawn_call("SetShowWizard", json!({ "show": show }))
    }

    fn get_environment_ready(&self) -> BoxFuture<'static, BridgeResult<EnvStatus>> {
        self.spawn_call("GetEnvironmentReady", json!({}))
    }

    fn list_job_targets(&self) -> BoxFuture<'static, BridgeResult<Vec<JobTarget>>> {
        let call = self.spawn_call::<Option<Vec<JobTarget>>>("ListJobTargets", json!({}));
        async move { Ok(call.await?.unwrap_or_default()) }.boxed()
    }

    fn delete_job_target(&self, id: String) -> BoxFuture<'static, BridgeResult<()>> {
        self.spawn_call("DeleteJobTarget", json!({ "id": id }))
    }

    fn submit_job(&self, request: JobRequest) -> BoxFuture<'static, BridgeResult<()>> {
        match serde_json::to_value(&request) {
            Ok(args) => self.spawn_call("SubmitJob", args),
            Err(e) => async move { Err(BridgeError::from(e)) }.boxed(),
        }
    }

    fn get_job_progress(&self) -> BoxFuture<'static, BridgeResult<JobProgress>> {
        self.spawn_call("GetJobProgress", json!({}))
    }

    fn select_directory(&self, prompt: String) -> BoxFuture<'static, BridgeResult<String>> {
        async move {
            let picked = tokio::task::spawn_blocking(move || {
                rfd::FileDialog::new().set_title(&prompt).pick_folder()
            })
            .await
            .map_err(|e| BridgeError(format!("Directory picker failed: {}", e)))?;

            Ok(picked
                .map(|path| path.to_string_lossy().to_string())
                .unwrap_or_default())
        }
        .boxed()
    }

    fn open_directory(&self, path: String) -> BoxFuture<'static, BridgeResult<()>> {
        async move {
            tokio::task::spawn_blocking(move || open::that(&path))
                .await
                .map_err(|e| BridgeError(format!("Failed to open directory: {}", e)))?
                .map_err(|e| BridgeError(format!("Failed to open directory: {}", e)))
        }
        .boxed()
    }

    fn test_remote_connection(&self) -> BoxFuture<'static, BridgeResult<()>> {
        self.spawn_call("TestRemoteConnection", json!({}))
    }

    fn get_settings(&self) -> BoxFuture<'static, BridgeResult<BackendSettings>> {
        self.spawn_call("GetSettings", json!({}))
    }

    fn save_settings(&self, settings: BackendSettings) -> BoxFuture<'static, BridgeResult<()>> {
        self.spawn_call("SaveSettings", json!({ "settings": settings }))
    }

    fn analyze_sample(
        &self,
        project_name: String,
        sample: String,
    ) -> BoxFuture<'static, BridgeResult<GenerateResult>> {
        self.spawn_call(
            "AnalyzeSample",
            json!({ "project_name": project_name, "sample": sample }),
        )
    }
}
