//! Background pollers: environment readiness and batch job progress.
//!
//! Both run as spawned tokio tasks and report back through `ShellEvent`s,
//! so they never hold a reference to shell state.

pub mod job;
pub mod readiness;

pub use job::{JobEvent, JobMonitor, JobSummary, LogFeed, PollingSession, SessionGuard};
pub use readiness::{ReadinessEvent, ReadinessHandle, ReadinessPollState, ReadinessStatus};
