//! Decoupled logging pipeline for the shell.
//!
//! ```text
//! log::info!() / log_info!()
//!     |
//! [LogCollector] (log::Log impl, non-blocking)
//!     | (crossbeam unbounded channel)
//!     v
//! [DiskPersister thread] -> logs/shell_<timestamp>.log
//! ```
//!
//! Logging never blocks the UI thread: records are pushed onto an unbounded
//! channel and a dedicated OS thread appends them to disk. `wait_for_empty`
//! pushes a flush marker and returns once everything before it is on disk.

use crate::error::ShellError;
use chrono::Local;
use crossbeam_channel::{unbounded, Sender};
use log::{Level, LevelFilter, Log, Metadata, Record};
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

enum LogMessage {
    Line(LogLine),
    /// Flush marker; the sender is signalled once all earlier lines are written
    Flush(std::sync::mpsc::Sender<()>),
}

/// Get the global logs path: ~/.config/logforge/logs
pub fn get_global_logs_path() -> Result<PathBuf, ShellError> {
    let home = dirs::home_dir().ok_or_else(|| ShellError::Logging("Cannot determine home directory".to_string()))?;
    Ok(home.join(".config/logforge").join("logs"))
}

/// Ensure the global logs directory exists
pub fn ensure_logs_dir_exists(log_dir: &Path) -> Result<(), ShellError> {
    std::fs::create_dir_all(log_dir)
        .map_err(|e| ShellError::Logging(format!("Failed to create logs directory: {}", e)))
}

/// A log line with metadata
#[derive(Clone, Debug)]
pub struct LogLine {
    pub level: Level,
    pub target: String,
    pub message: String,
    /// HH:MM:SS.mmm at creation
    pub timestamp: String,
}

impl LogLine {
    pub fn new(level: Level, target: impl Into<String>, message: impl Into<String>) -> Self {
        LogLine {
            level,
            target: target.into(),
            message: message.into(),
            timestamp: Local::now().format("%H:%M:%S%.3f").to_string(),
        }
    }

    fn format(&self) -> String {
        format!("[{}] [{}] {}\n", self.timestamp, self.level, self.message)
    }
}

/// `log` backend that persists every record to the session log file
#[derive(Clone)]
pub struct LogCollector {
    tx: Sender<LogMessage>,
    log_path: PathBuf,
    max_level: LevelFilter,
}

impl LogCollector {
    /// Create the session log file and start the disk persister thread
    pub fn new(log_dir: PathBuf, max_level: LevelFilter) -> Result<Self, ShellError> {
        ensure_logs_dir_exists(&log_dir)?;

        let timestamp = Local::now().format("%Y%m%d_%H%M%S");
        let log_path = log_dir.join(format!("shell_{}.log", timestamp));
        let mut file: File = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&log_path)
            .map_err(|e| ShellError::Logging(format!("Failed to open log file {}: {}", log_path.display(), e)))?;

        let (tx, rx) = unbounded::<LogMessage>();

        // OS thread rather than a tokio task: records may arrive from any thread,
        // before the runtime starts and after it shuts down.
        std::thread::spawn(move || {
            while let Ok(msg) = rx.recv() {
                match msg {
                    LogMessage::Line(line) => {
                        let _ = file.write_all(line.format().as_bytes());
                    }
                    LogMessage::Flush(done) => {
                        let _ = file.flush();
                        let _ = done.send(());
                    }
                }
            }
            let _ = file.flush();
        });

        Ok(LogCollector { tx, log_path, max_level })
    }

    /// Path of the file this session writes to
    pub fn log_path(&self) -> &Path {
        &self.log_path
    }

    /// Send a log line (non-blocking, never fails)
    pub fn push(&self, line: LogLine) {
        let _ = self.tx.send(LogMessage::Line(line));
    }

    /// Wait for all pending lines to be written to disk.
    ///
    /// The wait happens on the blocking pool so it is safe from async contexts.
    pub async fn wait_for_empty(&self) -> Result<(), ShellError> {
        let (done_tx, done_rx) = std::sync::mpsc::channel::<()>();
        self.tx
            .send(LogMessage::Flush(done_tx))
            .map_err(|e| ShellError::Logging(format!("Failed to send flush marker: {}", e)))?;

        tokio::task::spawn_blocking(move || done_rx.recv())
            .await
            .map_err(|e| ShellError::Logging(format!("Flush task failed: {}", e)))?
            .map_err(|e| ShellError::Logging(format!("Flush signal interrupted: {}", e)))
    }

    /// Install this collector as the global `log` backend
    pub fn install(&self) -> Result<(), ShellError> {
        log::set_boxed_logger(Box::new(self.clone()))
            .map(|()| log::set_max_level(self.max_level))
            .map_err(|e| ShellError::Logging(format!("Failed to install logger: {}", e)))
    }
}

impl Log for LogCollector {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.max_level
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            self.push(LogLine::new(record.level(), record.target(), record.args().to_string()));
        }
    }

    fn flush(&self) {}
}

/// Convenience macro mirroring `log::info!` with eager formatting
#[macro_export]
macro_rules! log_info {
    ($($arg:tt)*) => {{
        let msg = format!($($arg)*);
        $crate::log::info!("{}", msg);
    }}
}
