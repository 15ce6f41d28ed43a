//! Core data types for the LogForge shell.

use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Addressable pages of the shell.
///
/// Closed set; any unrecognised location token resolves to [`PageId::Sample`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub enum PageId {
    #[default]
    Sample,
    Batch,
    Projects,
    Settings,
}

impl PageId {
    pub const ALL: [PageId; 4] = [PageId::Sample, PageId::Batch, PageId::Projects, PageId::Settings];

    /// Resolve a location token, falling back to the default page.
    pub fn resolve(token: &str) -> PageId {
        match token.trim().trim_start_matches('#') {
            "sample" => PageId::Sample,
            "batch" => PageId::Batch,
            "projects" => PageId::Projects,
            "settings" => PageId::Settings,
            _ => PageId::default(),
        }
    }

    /// Location token for this page.
    pub fn token(&self) -> &'static str {
        match self {
            PageId::Sample => "sample",
            PageId::Batch => "batch",
            PageId::Projects => "projects",
            PageId::Settings => "settings",
        }
    }

    /// Navigation label shown in the sidebar.
    pub fn label(&self) -> &'static str {
        match self {
            PageId::Sample => "Sample Analysis",
            PageId::Batch => "Batch Processing",
            PageId::Projects => "Projects",
            PageId::Settings => "Settings",
        }
    }
}

impl fmt::Display for PageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

/// Parameters handed from one page to the next on programmatic navigation.
pub type PageParams = BTreeMap<String, String>;

/// Treat `""` the same as an absent field.
fn empty_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value: Option<String> = Option::deserialize(deserializer)?;
    Ok(value.filter(|s| !s.is_empty()))
}

/// Backend execution environment readiness, as reported by the bridge.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnvStatus {
    #[serde(default)]
    pub ready: bool,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub error: Option<String>,
}

impl EnvStatus {
    pub fn pending() -> Self {
        EnvStatus::default()
    }

    pub fn ready() -> Self {
        EnvStatus { ready: true, error: None }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        EnvStatus { ready: false, error: Some(message.into()) }
    }
}

/// A runnable job target (a project with generated code).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobTarget {
    pub id: String,
    #[serde(default)]
    pub name: String,
}

impl JobTarget {
    /// Display label: the name, or a short id prefix when unnamed.
    pub fn label(&self) -> String {
        if self.name.is_empty() {
            self.id.chars().take(8).collect()
        } else {
            self.name.clone()
        }
    }
}

/// Parameters of one batch job submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobRequest {
    pub target_id: String,
    pub input_dir: String,
    pub output_dir: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_name: Option<String>,
}

/// Batch job lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    #[default]
    Idle,
    Running,
    Fixing,
    Completed,
    Failed,
}

impl JobStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, JobStatus::Completed | JobStatus::Failed)
    }

    /// Status badge shown next to the progress bar.
    pub fn badge(&self) -> StatusBadge {
        match self {
            JobStatus::Running => StatusBadge { label: "Processing", tone: Tone::Info },
            JobStatus::Completed => StatusBadge { label: "Completed", tone: Tone::Success },
            JobStatus::Failed => StatusBadge { label: "Failed", tone: Tone::Error },
            JobStatus::Fixing => StatusBadge { label: "Fixing", tone: Tone::Warning },
            JobStatus::Idle => StatusBadge { label: "Idle", tone: Tone::Info },
        }
    }
}

/// Visual tone of badges and banners.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    Info,
    Success,
    Warning,
    Error,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusBadge {
    pub label: &'static str,
    pub tone: Tone,
}

/// Snapshot of a backend batch job.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct JobProgress {
    #[serde(default)]
    pub status: JobStatus,
    #[serde(default, rename = "progress")]
    pub progress_fraction: f64,
    #[serde(default, rename = "current_file", deserialize_with = "empty_as_none")]
    pub current_item: Option<String>,
    #[serde(default, rename = "total_files")]
    pub total_items: u32,
    #[serde(default, rename = "processed")]
    pub processed_items: u32,
    #[serde(default, rename = "failed")]
    pub failed_items: u32,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub message: Option<String>,
}

impl JobProgress {
    /// Whole percent derived from the progress fraction.
    pub fn percent(&self) -> u32 {
        let pct = (self.progress_fraction * 100.0).round();
        if pct.is_nan() {
            0
        } else {
            pct.clamp(0.0, 100.0) as u32
        }
    }

    /// Items that finished without error.
    pub fn succeeded_items(&self) -> u32 {
        self.processed_items.saturating_sub(self.failed_items)
    }
}

/// Connection settings for the code-generation model.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LlmSettings {
    #[serde(default)]
    pub base_url: String,
    #[serde(default)]
    pub api_key: String,
    #[serde(default)]
    pub model_name: String,
}

impl LlmSettings {
    pub fn is_complete(&self) -> bool {
        !self.base_url.trim().is_empty()
            && !self.api_key.trim().is_empty()
            && !self.model_name.trim().is_empty()
    }
}

/// Backend-owned settings edited on the settings page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackendSettings {
    #[serde(default)]
    pub llm: LlmSettings,
    #[serde(default)]
    pub default_input_dir: String,
    #[serde(default)]
    pub default_output_dir: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub show_wizard: Option<bool>,
}

/// Result of generating a parser from a pasted sample.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerateResult {
    pub project_id: String,
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub valid: bool,
    #[serde(default)]
    pub errors: Vec<String>,
}
