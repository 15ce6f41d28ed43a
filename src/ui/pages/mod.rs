//! Page implementations and the default page registry.
//!
//! Each page is a [`PageView`](super::registry::PageView) holding its own
//! form state. Bridge calls run in spawned tasks whose results come back as
//! [`PageEvent`]s tagged with the mount id of the page that started them.

pub mod batch;
pub mod projects;
pub mod sample;
pub mod settings;

pub use batch::{BatchEvent, BatchPage};
pub use projects::{ProjectsEvent, ProjectsPage};
pub use sample::{SampleEvent, SamplePage};
pub use settings::{SettingsEvent, SettingsPage};

use super::registry::{PageRegistry, PageSink};
use crate::bridge::BridgeResult;
use crate::models::PageId;
use futures::future::BoxFuture;

/// Results of page-scoped background work
#[derive(Debug, Clone, PartialEq)]
pub enum PageEvent {
    Sample(SampleEvent),
    Batch(BatchEvent),
    Projects(ProjectsEvent),
    Settings(SettingsEvent),
}

/// Which directory field a picker result belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DirField {
    Input,
    Output,
}

/// Run a bridge call and deliver its mapped result to the page that asked.
pub(crate) fn spawn_page_task<T, F>(sink: &PageSink, call: BoxFuture<'static, BridgeResult<T>>, map: F)
where
    T: Send + 'static,
    F: FnOnce(BridgeResult<T>) -> Option<PageEvent> + Send + 'static,
{
    let sink = sink.clone();
    tokio::spawn(async move {
        if let Some(event) = map(call.await) {
            sink.send(event);
        }
    });
}

/// Registry with all four pages.
pub fn default_registry() -> PageRegistry {
    let mut registry = PageRegistry::new();
    registry.register(PageId::Sample, sample::render);
    registry.register(PageId::Batch, batch::render);
    registry.register(PageId::Projects, projects::render);
    registry.register(PageId::Settings, settings::render);
    registry
}
