//! Shared test fixtures: a scripted in-memory backend bridge.
//!
//! Every bridge method records its call and answers from a script. Queued
//! answers (environment readiness, job progress) are consumed in order and
//! fall back to a fixed default once the queue runs dry.

#![allow(dead_code)]

use futures::future::{BoxFuture, FutureExt};
use logforge::bridge::{BackendBridge, BridgeResult};
use logforge::config::{PollTimings, ShellConfig};
use logforge::error::BridgeError;
use logforge::ui::ShellController;
use logforge::models::{
    BackendSettings, EnvStatus, GenerateResult, JobProgress, JobRequest, JobStatus, JobTarget,
};
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub struct MockBridge {
    pub configured: Mutex<BridgeResult<bool>>,
    pub show_wizard: Mutex<BridgeResult<bool>>,
    pub env: Mutex<VecDeque<BridgeResult<EnvStatus>>>,
    pub progress: Mutex<VecDeque<BridgeResult<JobProgress>>>,
    /// Simulated latency of each progress query
    pub progress_delay: Mutex<Option<Duration>>,
    pub submit_result: Mutex<BridgeResult<()>>,
    pub targets: Mutex<BridgeResult<Vec<JobTarget>>>,
    pub settings: Mutex<BridgeResult<BackendSettings>>,
    pub connection: Mutex<BridgeResult<()>>,
    pub analysis: Mutex<BridgeResult<GenerateResult>>,
    pub picked_directory: Mutex<String>,

    calls: Mutex<HashMap<&'static str, usize>>,
    pub submitted: Mutex<Vec<JobRequest>>,
    pub wizard_writes: Mutex<Vec<bool>>,
    pub saved_settings: Mutex<Vec<BackendSettings>>,
    pub deleted: Mutex<Vec<String>>,
}

impl Default for MockBridge {
    fn default() -> Self {
        MockBridge {
            configured: Mutex::new(Ok(true)),
            show_wizard: Mutex::new(Ok(false)),
            env: Mutex::new(VecDeque::new()),
            progress: Mutex::new(VecDeque::new()),
            progress_delay: Mutex::new(None),
            submit_result: Mutex::new(Ok(())),
            targets: Mutex::new(Ok(vec![target("t1", "nginx"), target("t2", "syslog")])),
            settings: Mutex::new(Ok(BackendSettings::default())),
            connection: Mutex::new(Ok(())),
            analysis: Mutex::new(Ok(GenerateResult {
                project_id: "p-42".to_string(),
                code: "def parse(line): pass".to_string(),
                valid: true,
                errors: Vec::new(),
            })),
            picked_directory: Mutex::new(String::new()),
            calls: Mutex::new(HashMap::new()),
            submitted: Mutex::new(Vec::new()),
            wizard_writes: Mutex::new(Vec::new()),
            saved_settings: Mutex::new(Vec::new()),
            deleted: Mutex::new(Vec::new()),
        }
    }
}

impl MockBridge {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn unconfigured() -> Arc<Self> {
        let bridge = Self::default();
        *bridge.configured.lock().unwrap() = Ok(false);
        Arc::new(bridge)
    }

    pub fn calls(&self, method: &str) -> usize {
        self.calls.lock().unwrap().get(method).copied().unwrap_or(0)
    }

    pub fn script_env(&self, answers: impl IntoIterator<Item = BridgeResult<EnvStatus>>) {
        self.env.lock().unwrap().extend(answers);
    }

    pub fn script_progress(&self, answers: impl IntoIterator<Item = BridgeResult<JobProgress>>) {
        self.progress.lock().unwrap().extend(answers);
    }

    fn record(&self, method: &'static str) {
        *self.calls.lock().unwrap().entry(method).or_insert(0) += 1;
    }

    fn answer<T: Clone + Send + 'static>(
        &self,
        method: &'static str,
        slot: &Mutex<BridgeResult<T>>,
    ) -> BoxFuture<'static, BridgeResult<T>> {
        self.record(method);
        let result = slot.lock().unwrap().clone();
        async move { result }.boxed()
    }
}

impl BackendBridge for MockBridge {
    fn is_configured(&self) -> BoxFuture<'static, BridgeResult<bool>> {
        self.answer("IsConfigured", &self.configured)
    }

    fn get_show_wizard(&self) -> BoxFuture<'static, BridgeResult<bool>> {
        self.answer("GetShowWizard", &self.show_wizard)
    }

    fn set_show_wizard(&self, show: bool) -> BoxFuture<'static, BridgeResult<()>> {
        self.record("SetShowWizard");
        self.wizard_writes.lock().unwrap().push(show);
        async { Ok(()) }.boxed()
    }

    fn get_environment_ready(&self) -> BoxFuture<'static, BridgeResult<EnvStatus>> {
        self.record("GetEnvironmentReady");
        let result = self.env.lock().unwrap().pop_front().unwrap_or_else(|| Ok(EnvStatus::pending()));
        async move { result }.boxed()
    }

    fn list_job_targets(&self) -> BoxFuture<'static, BridgeResult<Vec<JobTarget>>> {
        self.answer("ListJobTargets", &self.targets)
    }

    fn delete_job_target(&self, id: String) -> BoxFuture<'static, BridgeResult<()>> {
        self.record("DeleteJobTarget");
        self.deleted.lock().unwrap().push(id);
        async { Ok(()) }.boxed()
    }

    fn submit_job(&self, request: JobRequest) -> BoxFuture<'static, BridgeResult<()>> {
        self.submitted.lock().unwrap().push(request);
        self.answer("SubmitJob", &self.submit_result)
    }

    fn get_job_progress(&self) -> BoxFuture<'static, BridgeResult<JobProgress>> {
        self.record("GetJobProgress");
        let result = self
            .progress
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(progress(JobStatus::Running, 0.0, None)));
        let delay = *self.progress_delay.lock().unwrap();
        async move {
            if let Some(delay) = delay {
                tokio::time::sleep(delay).await;
            }
            result
        }
        .boxed()
    }

    fn select_directory(&self, _prompt: String) -> BoxFuture<'static, BridgeResult<String>> {
        self.record("SelectDirectory");
        let path = self.picked_directory.lock().unwrap().clone();
        async move { Ok(path) }.boxed()
    }

    fn open_directory(&self, path: String) -> BoxFuture<'static, BridgeResult<()>> {
        self.record("OpenDirectory");
        async move {
            if path.starts_with("/missing") {
                Err(BridgeError::new(format!("no such directory: {}", path)))
            } else {
                Ok(())
            }
        }
        .boxed()
    }

    fn test_remote_connection(&self) -> BoxFuture<'static, BridgeResult<()>> {
        self.answer("TestRemoteConnection", &self.connection)
    }

    fn get_settings(&self) -> BoxFuture<'static, BridgeResult<BackendSettings>> {
        self.answer("GetSettings", &self.settings)
    }

    fn save_settings(&self, settings: BackendSettings) -> BoxFuture<'static, BridgeResult<()>> {
        self.record("SaveSettings");
        self.saved_settings.lock().unwrap().push(settings);
        async { Ok(()) }.boxed()
    }

    fn analyze_sample(
        &self,
        _project_name: String,
        _sample: String,
    ) -> BoxFuture<'static, BridgeResult<GenerateResult>> {
        self.answer("AnalyzeSample", &self.analysis)
    }
}

pub fn target(id: &str, name: &str) -> JobTarget {
    JobTarget { id: id.to_string(), name: name.to_string() }
}

pub fn progress(status: JobStatus, fraction: f64, message: Option<&str>) -> JobProgress {
    JobProgress {
        status,
        progress_fraction: fraction,
        message: message.map(str::to_string),
        ..Default::default()
    }
}

/// Shell config with fast timers for tests that do not pause time.
pub fn fast_config() -> ShellConfig {
    ShellConfig {
        timings: PollTimings {
            readiness_interval_ms: 10,
            readiness_max_attempts: 3,
            ready_banner_ms: 30,
            failure_banner_ms: 80,
            job_poll_interval_ms: 10,
        },
        ..ShellConfig::default()
    }
}

/// Pump shell events until `done` holds, failing after a generous timeout.
pub async fn pump_until(shell: &mut ShellController, done: impl Fn(&ShellController) -> bool) {
    tokio::time::timeout(Duration::from_secs(120), async {
        while !done(shell) {
            shell.pump().await;
        }
    })
    .await
    .expect("condition not reached");
}

/// Let spawned bridge calls finish, then apply what they sent.
pub async fn settle(shell: &mut ShellController) -> usize {
    tokio::time::sleep(Duration::from_millis(5)).await;
    shell.process_events()
}
