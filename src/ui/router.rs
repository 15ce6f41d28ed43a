//! Router and navigation guard.
//!
//! The location token is the desktop stand-in for a URL fragment: the
//! sidebar writes it, and every change queues a `LocationChanged` event that
//! the controller answers with [`Router::evaluate_route`]. Until the backend
//! reports a usable configuration every route resolves to the settings page.

use super::controller::ShellEvent;
use super::registry::{PageContainer, PageContext, PageRegistry, PageServices, Teardown};
use crate::models::{PageId, PageParams};

/// Router-owned navigation state
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NavigationState {
    pub current_page: PageId,
    /// Replaced only by navigations that explicitly pass params
    pub pending_params: Option<PageParams>,
    pub configured: bool,
}

pub struct Router {
    registry: PageRegistry,
    container: PageContainer,
    state: NavigationState,
    location: String,
    services: PageServices,
    teardown: Option<Teardown>,
    next_mount: u64,
    activations: u64,
}

impl Router {
    pub fn new(registry: PageRegistry, services: PageServices) -> Self {
        Router {
            registry,
            container: PageContainer::new(),
            state: NavigationState::default(),
            location: String::new(),
            services,
            teardown: None,
            next_mount: 0,
            activations: 0,
        }
    }

    pub fn location(&self) -> &str {
        &self.location
    }

    /// Set the location token. Emits `LocationChanged` only if the token changed.
    pub fn request_location(&mut self, token: &str) {
        if self.location == token {
            return;
        }
        self.location = token.to_string();
        let _ = self.services.events.send(ShellEvent::LocationChanged(self.location.clone()));
    }

    /// Set the location token without triggering a re-route.
    pub fn sync_location(&mut self, token: &str) {
        self.location = token.to_string();
    }

    /// Re-route from the current location, applying the configuration guard.
    pub fn evaluate_route(&mut self) {
        let token = self.location.trim().trim_start_matches('#').to_string();
        if !self.state.configured && token != PageId::Settings.token() {
            log::debug!("[Router] '{}' blocked until configured, redirecting to settings", token);
            self.request_location(PageId::Settings.token());
            return;
        }
        self.activate(PageId::resolve(&token), None);
    }

    /// Mount `page`, replacing the current one.
    ///
    /// The old view is dropped and its teardown runs before the new render
    /// function is invoked.
    pub fn activate(&mut self, page: PageId, params: Option<PageParams>) {
        let page = if self.registry.contains(page) { page } else { PageId::default() };

        self.state.current_page = page;
        if let Some(params) = params {
            self.state.pending_params = Some(params);
        }

        self.container.clear();
        if let Some(teardown) = self.teardown.take() {
            teardown.run();
        }

        self.next_mount += 1;
        self.activations += 1;
        let mount = self.next_mount;
        self.container.prepare(mount, page);

        let Some(render) = self.registry.get(page) else {
            log::warn!("[Router] No render function registered for '{}'", page);
            return;
        };
        let params = self.state.pending_params.clone().unwrap_or_default();
        let ctx = PageContext::new(&self.services, mount, params, self.state.configured);
        log::debug!("[Router] Activate '{}' (mount {})", page, mount);
        self.teardown = render(&mut self.container, ctx);
    }

    /// Programmatic navigation used by pages.
    pub fn navigate(&mut self, page: PageId, params: Option<PageParams>) {
        let page = if !self.state.configured && page != PageId::Settings {
            PageId::Settings
        } else {
            page
        };
        self.sync_location(page.token());
        self.activate(page, params);
    }

    /// Sidebar click. Clicks on disabled items are ignored.
    pub fn nav_click(&mut self, page: PageId) -> bool {
        if !self.is_nav_enabled(page) {
            return false;
        }
        self.request_location(page.token());
        true
    }

    pub fn set_configured(&mut self, configured: bool) {
        self.state.configured = configured;
    }

    pub fn is_configured(&self) -> bool {
        self.state.configured
    }

    pub fn is_nav_enabled(&self, page: PageId) -> bool {
        self.state.configured || page == PageId::Settings
    }

    /// Whether the nav item for `page` should be highlighted.
    pub fn is_active(&self, page: PageId) -> bool {
        self.activations > 0 && self.state.current_page == page
    }

    pub fn state(&self) -> &NavigationState {
        &self.state
    }

    pub fn current_mount(&self) -> u64 {
        self.container.mount_id()
    }

    /// Number of page activations so far.
    pub fn activations(&self) -> u64 {
        self.activations
    }

    pub fn container(&self) -> &PageContainer {
        &self.container
    }

    pub fn container_mut(&mut self) -> &mut PageContainer {
        &mut self.container
    }

    pub fn services(&self) -> &PageServices {
        &self.services
    }

    /// Unmount the current page and run its teardown.
    pub fn shutdown(&mut self) {
        self.container.clear();
        if let Some(teardown) = self.teardown.take() {
            teardown.run();
        }
    }
}

impl Drop for Router {
    fn drop(&mut self) {
        self.shutdown();
    }
}
