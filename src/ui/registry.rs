//! Page registry and page container.
//!
//! Pages register a render function under their [`PageId`]. Rendering mounts
//! a [`PageView`] into the [`PageContainer`] and may hand back a [`Teardown`]
//! that the router runs right before the next page is rendered.

use super::controller::{ShellEvent, ShellSender};
use super::dialog::DialogHost;
use super::pages::PageEvent;
use crate::bridge::BackendBridge;
use crate::config::PollTimings;
use crate::models::{PageId, PageParams};
use std::any::Any;
use std::collections::HashMap;
use std::sync::Arc;

/// A mounted page instance.
pub trait PageView {
    /// Draw the page. Called once per frame while mounted.
    fn ui(&mut self, ui: &mut egui::Ui);

    /// Apply the result of background work this page started.
    fn handle_event(&mut self, event: PageEvent);

    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

/// Cleanup hook returned by a render function. Runs at most once.
pub struct Teardown(Box<dyn FnOnce() + Send>);

impl Teardown {
    pub fn new(f: impl FnOnce() + Send + 'static) -> Self {
        Teardown(Box::new(f))
    }

    pub fn run(self) {
        (self.0)()
    }
}

/// Render function: mounts a view into the container.
pub type RenderFn = Box<dyn Fn(&mut PageContainer, PageContext) -> Option<Teardown>>;

/// Shared services every page gets handed
#[derive(Clone)]
pub struct PageServices {
    pub bridge: Arc<dyn BackendBridge>,
    pub dialogs: DialogHost,
    pub events: ShellSender,
    pub timings: PollTimings,
}

/// Event sender scoped to one mount of a page.
///
/// Page events carry the mount id so results arriving after the page was
/// replaced can be recognised and dropped.
#[derive(Clone)]
pub struct PageSink {
    mount: u64,
    tx: ShellSender,
}

impl PageSink {
    pub fn new(mount: u64, tx: ShellSender) -> Self {
        PageSink { mount, tx }
    }

    pub fn mount(&self) -> u64 {
        self.mount
    }

    pub fn send(&self, event: PageEvent) {
        let _ = self.tx.send(ShellEvent::Page { mount: self.mount, event });
    }

    /// Ask the shell to navigate, replacing the pending params.
    pub fn navigate(&self, page: PageId, params: PageParams) {
        let _ = self.tx.send(ShellEvent::Navigate { page, params: Some(params) });
    }

    pub fn notify_configured(&self) {
        let _ = self.tx.send(ShellEvent::ConfigurationVerified);
    }
}

/// Everything a render function needs to build its view
#[derive(Clone)]
pub struct PageContext {
    pub bridge: Arc<dyn BackendBridge>,
    pub dialogs: DialogHost,
    pub sink: PageSink,
    pub params: PageParams,
    pub configured: bool,
    pub timings: PollTimings,
}

impl PageContext {
    pub fn new(services: &PageServices, mount: u64, params: PageParams, configured: bool) -> Self {
        PageContext {
            bridge: services.bridge.clone(),
            dialogs: services.dialogs.clone(),
            sink: PageSink::new(mount, services.events.clone()),
            params,
            configured,
            timings: services.timings.clone(),
        }
    }

    pub fn param(&self, key: &str) -> Option<&str> {
        self.params.get(key).map(String::as_str).filter(|v| !v.is_empty())
    }
}

/// Region the current page is mounted into
#[derive(Default)]
pub struct PageContainer {
    mount: u64,
    page: Option<PageId>,
    view: Option<Box<dyn PageView>>,
}

impl PageContainer {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn prepare(&mut self, mount: u64, page: PageId) {
        self.mount = mount;
        self.page = Some(page);
    }

    pub fn mount(&mut self, view: Box<dyn PageView>) {
        self.view = Some(view);
    }

    /// Drop the mounted view.
    pub fn clear(&mut self) {
        self.view = None;
    }

    pub fn is_empty(&self) -> bool {
        self.view.is_none()
    }

    pub fn mount_id(&self) -> u64 {
        self.mount
    }

    pub fn page(&self) -> Option<PageId> {
        self.page
    }

    pub fn view_mut(&mut self) -> Option<&mut (dyn PageView + 'static)> {
        self.view.as_deref_mut()
    }

    pub fn downcast_ref<T: 'static>(&self) -> Option<&T> {
        self.view.as_ref().and_then(|v| v.as_any().downcast_ref::<T>())
    }

    pub fn downcast_mut<T: 'static>(&mut self) -> Option<&mut T> {
        self.view.as_mut().and_then(|v| v.as_any_mut().downcast_mut::<T>())
    }
}

/// Map from page id to its render function
#[derive(Default)]
pub struct PageRegistry {
    pages: HashMap<PageId, RenderFn>,
}

impl PageRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register (or replace) the render function for a page.
    pub fn register<F>(&mut self, page: PageId, render: F)
    where
        F: Fn(&mut PageContainer, PageContext) -> Option<Teardown> + 'static,
    {
        self.pages.insert(page, Box::new(render));
    }

    pub fn get(&self, page: PageId) -> Option<&RenderFn> {
        self.pages.get(&page)
    }

    pub fn contains(&self, page: PageId) -> bool {
        self.pages.contains_key(&page)
    }
}
