//! Batch job submission and progress polling.
//!
//! [`JobMonitor`] is the headless model behind the batch page. A submission
//! spawns one task that starts the job and then polls its progress once per
//! interval until a terminal status, strictly one query at a time. Results
//! come back as [`JobEvent`]s through the page's event sink and are applied
//! on the UI thread.
//!
//! Leaving the page cancels the session through [`SessionGuard::cancel`].
//! A cancelled session never issues another query, and anything already in
//! flight is discarded by the task, by the controller (stale mount) and by
//! the monitor (stale session id).

use crate::bridge::BackendBridge;
use crate::config::PollTimings;
use crate::error::{RequiredInput, ShellError};
use crate::models::{BackendSettings, JobProgress, JobRequest, JobStatus, JobTarget, StatusBadge, Tone};
use crate::ui::dialog::DialogHost;
use crate::ui::markup;
use chrono::Local;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::{Instant, MissedTickBehavior};

/// Feed lines kept before the oldest are dropped
pub const MAX_FEED_LINES: usize = 5000;

static NEXT_SESSION_ID: AtomicU64 = AtomicU64::new(1);

/// Results of background job work, addressed to the session that produced them
#[derive(Debug, Clone, PartialEq)]
pub enum JobEvent {
    Submitted { session: u64 },
    SubmitFailed { session: u64, error: String },
    Snapshot { session: u64, seq: u64, progress: JobProgress },
    PollFailed { session: u64, seq: u64, error: String },
    OpenFailed(String),
}

/// Where a monitor delivers its events
pub type JobSink = Arc<dyn Fn(JobEvent) + Send + Sync>;

/// Append-only, timestamped execution log.
#[derive(Debug, Clone, Default)]
pub struct LogFeed {
    lines: VecDeque<String>,
    last_snapshot_message: Option<String>,
}

impl LogFeed {
    pub fn push(&mut self, message: &str) {
        let time = Local::now().format("%H:%M:%S");
        self.lines.push_back(format!("[{}] {}", time, message));
        while self.lines.len() > MAX_FEED_LINES {
            self.lines.pop_front();
        }
    }

    /// Append a snapshot message unless it repeats the previous one.
    pub fn push_snapshot_message(&mut self, message: &str) -> bool {
        if self.last_snapshot_message.as_deref() == Some(message) {
            return false;
        }
        self.push(message);
        self.last_snapshot_message = Some(message.to_string());
        true
    }

    pub fn clear(&mut self) {
        self.lines.clear();
        self.last_snapshot_message = None;
    }

    pub fn lines(&self) -> impl Iterator<Item = &str> {
        self.lines.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn text(&self) -> String {
        self.lines.iter().fold(String::new(), |mut out, line| {
            out.push_str(line);
            out.push('\n');
            out
        })
    }
}

/// Final counts of a finished job
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JobSummary {
    pub total: u32,
    pub succeeded: u32,
    pub failed: u32,
}

/// One submission's poll loop
pub struct PollingSession {
    id: u64,
    cancel_tx: watch::Sender<bool>,
}

impl PollingSession {
    /// Signal the loop to stop. Safe to call any number of times.
    pub fn cancel(&self) {
        self.cancel_tx.send_replace(true);
    }
}

type SessionSlot = Arc<Mutex<Option<PollingSession>>>;

fn lock_slot(slot: &SessionSlot) -> MutexGuard<'_, Option<PollingSession>> {
    slot.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Cancels whatever session the monitor is running. Cloneable and `Send`,
/// so it can outlive the monitor inside a page teardown.
#[derive(Clone)]
pub struct SessionGuard {
    slot: SessionSlot,
}

impl SessionGuard {
    pub fn cancel(&self) {
        if let Some(session) = lock_slot(&self.slot).take() {
            log::debug!("[Job] Cancelling polling session {}", session.id);
            session.cancel();
        }
    }
}

fn is_cancelled(rx: &watch::Receiver<bool>) -> bool {
    *rx.borrow() || rx.has_changed().is_err()
}

async fn run_session(
    bridge: Arc<dyn BackendBridge>,
    request: JobRequest,
    interval: Duration,
    mut cancel_rx: watch::Receiver<bool>,
    session: u64,
    sink: JobSink,
) {
    let submitted = bridge.submit_job(request).await;
    if is_cancelled(&cancel_rx) {
        return;
    }
    match submitted {
        Ok(()) => sink(JobEvent::Submitted { session }),
        Err(e) => {
            log::warn!("[Job] Session {} failed to start: {}", session, e);
            sink(JobEvent::SubmitFailed { session, error: e.to_string() });
            return;
        }
    }

    let mut ticker = tokio::time::interval_at(Instant::now() + interval, interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut seq = 0u64;

    loop {
        tokio::select! {
            _ = ticker.tick() => {}
            changed = cancel_rx.changed() => {
                if changed.is_err() {
                    break;
                }
            }
        }
        if is_cancelled(&cancel_rx) {
            break;
        }

        seq += 1;
        let result = bridge.get_job_progress().await;
        if is_cancelled(&cancel_rx) {
            log::debug!("[Job] Session {} cancelled mid-query, dropping poll #{}", session, seq);
            break;
        }

        match result {
            Ok(progress) => {
                let terminal = progress.status.is_terminal();
                sink(JobEvent::Snapshot { session, seq, progress });
                if terminal {
                    break;
                }
            }
            Err(e) => sink(JobEvent::PollFailed { session, seq, error: e.to_string() }),
        }
    }
    log::debug!("[Job] Session {} loop exited after {} poll(s)", session, seq);
}

/// Headless batch job model: form inputs, submission, progress and result.
pub struct JobMonitor {
    bridge: Arc<dyn BackendBridge>,
    dialogs: DialogHost,
    sink: JobSink,
    poll_interval: Duration,

    pub targets: Vec<JobTarget>,
    pub selected_target: Option<String>,
    pub input_dir: String,
    pub output_dir: String,
    pub output_name: String,

    submit_enabled: bool,
    show_progress: bool,
    percent: u32,
    current_item: Option<String>,
    badge: Option<StatusBadge>,
    feed: LogFeed,
    summary: Option<JobSummary>,
    banner: Option<(Tone, String)>,
    output_to_open: Option<String>,

    slot: SessionSlot,
    active_session: Option<u64>,
    active_request: Option<JobRequest>,
    last_seq: u64,
}

impl JobMonitor {
    pub fn new(bridge: Arc<dyn BackendBridge>, dialogs: DialogHost, timings: &PollTimings, sink: JobSink) -> Self {
        JobMonitor {
            bridge,
            dialogs,
            sink,
            poll_interval: timings.job_poll_interval(),
            targets: Vec::new(),
            selected_target: None,
            input_dir: String::new(),
            output_dir: String::new(),
            output_name: String::new(),
            submit_enabled: true,
            show_progress: false,
            percent: 0,
            current_item: None,
            badge: None,
            feed: LogFeed::default(),
            summary: None,
            banner: None,
            output_to_open: None,
            slot: Arc::new(Mutex::new(None)),
            active_session: None,
            active_request: None,
            last_seq: 0,
        }
    }

    pub fn session_guard(&self) -> SessionGuard {
        SessionGuard { slot: self.slot.clone() }
    }

    /// Replace the target list, keeping the selection only if it still exists.
    pub fn set_targets(&mut self, targets: Vec<JobTarget>) {
        if let Some(selected) = &self.selected_target {
            if !targets.iter().any(|t| &t.id == selected) {
                self.selected_target = None;
            }
        }
        self.targets = targets;
    }

    pub fn preselect(&mut self, target_id: &str) {
        self.selected_target = Some(target_id.to_string());
    }

    /// Fill empty directory fields from backend defaults.
    pub fn apply_defaults(&mut self, settings: &BackendSettings) {
        if self.input_dir.trim().is_empty() && !settings.default_input_dir.is_empty() {
            self.input_dir = settings.default_input_dir.clone();
        }
        if self.output_dir.trim().is_empty() && !settings.default_output_dir.is_empty() {
            self.output_dir = settings.default_output_dir.clone();
        }
    }

    /// Check the form in field order, returning the assembled request.
    pub fn validate(&self) -> Result<JobRequest, ShellError> {
        let target_id = self
            .selected_target
            .as_deref()
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .ok_or(ShellError::MissingInput(RequiredInput::Target))?;
        let input_dir = self.input_dir.trim();
        if input_dir.is_empty() {
            return Err(ShellError::MissingInput(RequiredInput::InputDir));
        }
        let output_dir = self.output_dir.trim();
        if output_dir.is_empty() {
            return Err(ShellError::MissingInput(RequiredInput::OutputDir));
        }
        let output_name = self.output_name.trim();

        Ok(JobRequest {
            target_id: target_id.to_string(),
            input_dir: input_dir.to_string(),
            output_dir: output_dir.to_string(),
            output_name: (!output_name.is_empty()).then(|| output_name.to_string()),
        })
    }

    /// Validate the form and start a polling session.
    ///
    /// A missing input opens a warning dialog and nothing is sent to the backend.
    pub fn submit(&mut self) -> Result<u64, ShellError> {
        let request = match self.validate() {
            Ok(request) => request,
            Err(e) => {
                // Acknowledgement carries no information; the reply is not awaited.
                drop(self.dialogs.alert(e.user_message()));
                return Err(e);
            }
        };

        self.session_guard().cancel();

        self.submit_enabled = false;
        self.show_progress = true;
        self.summary = None;
        self.banner = None;
        self.output_to_open = None;
        self.feed.clear();
        self.percent = 0;
        self.current_item = None;
        self.badge = None;
        self.last_seq = 0;

        let id = NEXT_SESSION_ID.fetch_add(1, Ordering::Relaxed);
        let (cancel_tx, cancel_rx) = watch::channel(false);
        log::info!(
            "[Job] Session {}: target={} input={} output={}",
            id, request.target_id, request.input_dir, request.output_dir
        );
        // Detached: the loop ends on its own at a terminal status or on cancel.
        tokio::spawn(run_session(
            self.bridge.clone(),
            request.clone(),
            self.poll_interval,
            cancel_rx,
            id,
            self.sink.clone(),
        ));

        *lock_slot(&self.slot) = Some(PollingSession { id, cancel_tx });
        self.active_session = Some(id);
        self.active_request = Some(request);
        Ok(id)
    }

    /// Apply a job event. Returns false when the event was stale and ignored.
    pub fn handle_event(&mut self, event: JobEvent) -> bool {
        match event {
            JobEvent::OpenFailed(error) => {
                drop(self.dialogs.error(format!("Failed to open directory: {}", error)));
                true
            }
            JobEvent::Submitted { session } => {
                if !self.is_current(session) {
                    return false;
                }
                self.feed.push("Batch started...");
                true
            }
            JobEvent::SubmitFailed { session, error } => {
                if !self.is_current(session) {
                    return false;
                }
                self.feed.push(&format!("Failed to start: {}", error));
                self.end_session();
                true
            }
            JobEvent::PollFailed { session, seq, error } => {
                if !self.accept_seq(session, seq) {
                    return false;
                }
                self.feed.push(&format!("Failed to fetch progress: {}", error));
                true
            }
            JobEvent::Snapshot { session, seq, progress } => {
                if !self.accept_seq(session, seq) {
                    return false;
                }
                self.apply_snapshot(progress);
                true
            }
        }
    }

    fn is_current(&self, session: u64) -> bool {
        let current = self.active_session == Some(session);
        if !current {
            log::debug!("[Job] Ignoring event for stale session {}", session);
        }
        current
    }

    fn accept_seq(&mut self, session: u64, seq: u64) -> bool {
        if !self.is_current(session) || seq <= self.last_seq {
            return false;
        }
        self.last_seq = seq;
        true
    }

    fn apply_snapshot(&mut self, progress: JobProgress) {
        self.percent = progress.percent();
        if let Some(item) = &progress.current_item {
            self.current_item = Some(item.clone());
        }
        self.badge = Some(progress.status.badge());
        if let Some(message) = &progress.message {
            self.feed.push_snapshot_message(message);
        }

        if progress.status.is_terminal() {
            self.finish(&progress);
        }
    }

    fn finish(&mut self, progress: &JobProgress) {
        self.summary = Some(JobSummary {
            total: progress.total_items,
            succeeded: progress.succeeded_items(),
            failed: progress.failed_items,
        });

        match progress.status {
            JobStatus::Completed => {
                log::info!("[Job] Completed: {} file(s)", progress.total_items);
                self.banner = Some((Tone::Success, "Batch processing completed".to_string()));
                self.output_to_open = self.active_request.as_ref().map(|r| r.output_dir.clone());
            }
            _ => {
                log::warn!("[Job] Failed: {}", progress.message.as_deref().unwrap_or("no message"));
                let detail = progress
                    .message
                    .as_deref()
                    .map(|m| format!(": {}", markup::escape(m)))
                    .unwrap_or_default();
                self.banner = Some((Tone::Error, format!("Batch processing failed{}", detail)));
            }
        }
        self.end_session();
    }

    fn end_session(&mut self) {
        lock_slot(&self.slot).take();
        self.active_session = None;
        self.submit_enabled = true;
    }

    /// Open the output directory of the last completed job.
    pub fn open_output(&self) {
        let Some(dir) = self.output_to_open.clone() else {
            return;
        };
        let open = self.bridge.open_directory(dir);
        let sink = self.sink.clone();
        tokio::spawn(async move {
            if let Err(e) = open.await {
                sink(JobEvent::OpenFailed(e.to_string()));
            }
        });
    }

    pub fn submit_enabled(&self) -> bool {
        self.submit_enabled
    }

    pub fn show_progress(&self) -> bool {
        self.show_progress
    }

    pub fn percent(&self) -> u32 {
        self.percent
    }

    pub fn current_item(&self) -> Option<&str> {
        self.current_item.as_deref()
    }

    pub fn badge(&self) -> Option<StatusBadge> {
        self.badge
    }

    pub fn feed(&self) -> &LogFeed {
        &self.feed
    }

    pub fn summary(&self) -> Option<JobSummary> {
        self.summary
    }

    /// Result banner as (tone, markup)
    pub fn banner(&self) -> Option<(Tone, &str)> {
        self.banner.as_ref().map(|(tone, text)| (*tone, text.as_str()))
    }

    pub fn can_open_output(&self) -> bool {
        self.output_to_open.is_some()
    }

    pub fn active_session(&self) -> Option<u64> {
        self.active_session
    }

    /// Whether a polling session is registered
    pub fn is_polling(&self) -> bool {
        lock_slot(&self.slot).is_some()
    }
}
