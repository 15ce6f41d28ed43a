//! ShellController: single owner of all shell state
//!
//! Background work (bridge calls, pollers, banner timers) never touches
//! shell state directly. It sends [`ShellEvent`]s over an unbounded channel
//! and the controller applies them on the UI thread, one at a time, in
//! [`ShellController::process_events`] (once per frame) or
//! [`ShellController::pump`] (tests).

use super::dialog::DialogHost;
use super::markup;
use super::pages::{default_registry, PageEvent};
use super::registry::{PageRegistry, PageServices, PageView};
use super::router::Router;
use crate::bridge::BackendBridge;
use crate::config::ShellConfig;
use crate::models::{PageId, PageParams, Tone};
use crate::orchestrator::readiness::{self, ReadinessEvent, ReadinessHandle, ReadinessPollState, ReadinessStatus};
use crate::log_info;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

/// Represents discrete events delivered to the controller
#[derive(Debug, Clone, PartialEq)]
pub enum ShellEvent {
    /// The location token changed
    LocationChanged(String),
    Readiness(ReadinessEvent),
    /// Auto-dismiss timer of the banner with this id fired
    BannerExpired(u64),
    /// Result of the startup wizard preference check
    WizardCheck(bool),
    /// The settings page verified the model connection
    ConfigurationVerified,
    /// Programmatic navigation requested by a page
    Navigate { page: PageId, params: Option<PageParams> },
    /// Result of page-scoped work, addressed to one mount
    Page { mount: u64, event: PageEvent },
}

pub type ShellSender = mpsc::UnboundedSender<ShellEvent>;

/// Top-of-window status banner. `text` is trusted markup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Banner {
    pub id: u64,
    pub tone: Tone,
    pub text: String,
    pub spinner: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnvState {
    Checking,
    Pending,
    Ready,
    Error,
}

/// Sidebar environment indicator
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvIndicator {
    pub state: EnvState,
    pub label: String,
}

impl Default for EnvIndicator {
    fn default() -> Self {
        EnvIndicator { state: EnvState::Checking, label: "Checking environment".to_string() }
    }
}

/// First-run wizard overlay
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WizardState {
    pub visible: bool,
    pub dont_show_again: bool,
}

pub struct ShellController {
    router: Router,
    dialogs: DialogHost,
    bridge: Arc<dyn BackendBridge>,
    config: ShellConfig,
    events_tx: ShellSender,
    events_rx: mpsc::UnboundedReceiver<ShellEvent>,
    banner: Option<Banner>,
    next_banner_id: u64,
    env: EnvIndicator,
    wizard: WizardState,
    readiness: Option<ReadinessHandle>,
    post_config_started: bool,
}

impl ShellController {
    /// Controller with the four standard pages.
    pub fn new(bridge: Arc<dyn BackendBridge>, config: ShellConfig) -> Self {
        Self::with_registry(bridge, config, default_registry())
    }

    pub fn with_registry(bridge: Arc<dyn BackendBridge>, config: ShellConfig, registry: PageRegistry) -> Self {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let dialogs = DialogHost::new();
        let services = PageServices {
            bridge: bridge.clone(),
            dialogs: dialogs.clone(),
            events: events_tx.clone(),
            timings: config.timings.clone(),
        };
        let mut router = Router::new(registry, services);
        router.sync_location(&config.start_page);

        ShellController {
            router,
            dialogs,
            bridge,
            config,
            events_tx,
            events_rx,
            banner: None,
            next_banner_id: 0,
            env: EnvIndicator::default(),
            wizard: WizardState::default(),
            readiness: None,
            post_config_started: false,
        }
    }

    /// Startup sequence.
    ///
    /// An unconfigured backend (or a failed check) confines the shell to the
    /// settings page. Otherwise the current location is routed and the
    /// readiness poll and wizard check start.
    pub async fn bootstrap(&mut self) {
        let configured = match self.bridge.is_configured().await {
            Ok(configured) => configured,
            Err(e) => {
                log::warn!("[Bootstrap] Configuration check failed, treating as unconfigured: {}", e);
                false
            }
        };
        self.router.set_configured(configured);

        if !configured {
            log_info!("[Bootstrap] Backend not configured, opening settings");
            self.router.navigate(PageId::Settings, None);
            return;
        }

        log_info!("[Bootstrap] Backend configured, routing to '{}'", self.router.location());
        self.router.evaluate_route();
        self.start_post_config();
    }

    /// Readiness poll and wizard check, at most once per controller.
    fn start_post_config(&mut self) {
        if self.post_config_started {
            return;
        }
        self.post_config_started = true;

        self.readiness = Some(readiness::spawn(self.bridge.clone(), &self.config.timings, self.events_tx.clone()));

        let bridge = self.bridge.clone();
        let tx = self.events_tx.clone();
        tokio::spawn(async move {
            match bridge.get_show_wizard().await {
                Ok(show) => {
                    let _ = tx.send(ShellEvent::WizardCheck(show));
                }
                Err(e) => log::debug!("[Wizard] Preference check failed, not showing: {}", e),
            }
        });
    }

    /// The connection was verified after startup: unlock navigation.
    pub fn on_configuration_verified(&mut self) {
        log_info!("[Shell] Configuration verified, navigation unlocked");
        self.router.set_configured(true);
        self.start_post_config();
    }

    /// Apply every queued event. Returns how many were applied.
    pub fn process_events(&mut self) -> usize {
        let mut applied = 0;
        while let Ok(event) = self.events_rx.try_recv() {
            self.apply(event);
            applied += 1;
        }
        applied
    }

    /// Wait for the next event and apply it.
    pub async fn pump(&mut self) -> bool {
        match self.events_rx.recv().await {
            Some(event) => {
                self.apply(event);
                true
            }
            None => false,
        }
    }

    pub fn apply(&mut self, event: ShellEvent) {
        match event {
            ShellEvent::LocationChanged(token) => {
                log::debug!("[Shell] Location changed to '{}'", token);
                self.router.evaluate_route();
            }
            ShellEvent::Readiness(ReadinessEvent::Started) => {
                self.env = EnvIndicator { state: EnvState::Pending, label: "Initializing Python environment...".to_string() };
                self.show_banner(Tone::Info, "Automatically initializing Python environment...".to_string(), true, None);
            }
            ShellEvent::Readiness(ReadinessEvent::Finished(state)) => self.on_readiness_finished(state),
            ShellEvent::BannerExpired(id) => {
                if self.banner.as_ref().map(|b| b.id) == Some(id) {
                    self.banner = None;
                }
            }
            ShellEvent::WizardCheck(show) => {
                if show {
                    self.wizard.visible = true;
                }
            }
            ShellEvent::ConfigurationVerified => self.on_configuration_verified(),
            ShellEvent::Navigate { page, params } => self.router.navigate(page, params),
            ShellEvent::Page { mount, event } => {
                if mount != self.router.current_mount() {
                    log::debug!("[Shell] Dropping event for unmounted page (mount {})", mount);
                    return;
                }
                if let Some(view) = self.router.container_mut().view_mut() {
                    view.handle_event(event);
                }
            }
        }
    }

    fn on_readiness_finished(&mut self, state: ReadinessPollState) {
        let timings = self.config.timings.clone();
        match state.status {
            ReadinessStatus::Ready => {
                self.env = EnvIndicator { state: EnvState::Ready, label: "Python environment ready".to_string() };
                self.show_banner(Tone::Success, "✅ Python environment ready".to_string(), false, Some(timings.ready_banner()));
            }
            ReadinessStatus::Error(message) => {
                self.env = EnvIndicator { state: EnvState::Error, label: "Environment error".to_string() };
                self.show_banner(
                    Tone::Error,
                    format!("❌ Environment initialization failed: {}", markup::escape(&message)),
                    false,
                    Some(timings.failure_banner()),
                );
            }
            ReadinessStatus::TimedOut => {
                self.env = EnvIndicator { state: EnvState::Error, label: "Initialization timeout".to_string() };
                self.show_banner(
                    Tone::Warning,
                    "⏱ Environment initialization timeout, please initialize manually in <b>Settings</b>".to_string(),
                    false,
                    Some(timings.failure_banner()),
                );
            }
            ReadinessStatus::Pending => {}
        }
    }

    /// Replace the banner. With `auto_dismiss` it is removed after the delay
    /// unless another banner replaced it first.
    pub fn show_banner(&mut self, tone: Tone, text: String, spinner: bool, auto_dismiss: Option<Duration>) -> u64 {
        self.next_banner_id += 1;
        let id = self.next_banner_id;
        self.banner = Some(Banner { id, tone, text, spinner });

        if let Some(delay) = auto_dismiss {
            let tx = self.events_tx.clone();
            tokio::spawn(async move {
                tokio::time::sleep(delay).await;
                let _ = tx.send(ShellEvent::BannerExpired(id));
            });
        }
        id
    }

    pub fn dismiss_banner(&mut self) {
        self.banner = None;
    }

    /// Close the wizard, persisting "don't show again" if it was ticked.
    pub fn close_wizard(&mut self) {
        if !self.wizard.visible {
            return;
        }
        self.wizard.visible = false;
        if self.wizard.dont_show_again {
            let call = self.bridge.set_show_wizard(false);
            tokio::spawn(async move {
                if let Err(e) = call.await {
                    log::debug!("[Wizard] Failed to persist preference: {}", e);
                }
            });
        }
    }

    /// Sidebar click
    pub fn nav_click(&mut self, page: PageId) -> bool {
        self.router.nav_click(page)
    }

    pub fn router(&self) -> &Router {
        &self.router
    }

    pub fn router_mut(&mut self) -> &mut Router {
        &mut self.router
    }

    pub fn dialogs(&self) -> &DialogHost {
        &self.dialogs
    }

    pub fn banner(&self) -> Option<&Banner> {
        self.banner.as_ref()
    }

    pub fn env(&self) -> &EnvIndicator {
        &self.env
    }

    pub fn wizard(&self) -> &WizardState {
        &self.wizard
    }

    pub fn wizard_mut(&mut self) -> &mut WizardState {
        &mut self.wizard
    }

    pub fn config(&self) -> &ShellConfig {
        &self.config
    }

    pub fn events_sender(&self) -> ShellSender {
        self.events_tx.clone()
    }

    /// Handle of the readiness poll, once started.
    pub fn take_readiness(&mut self) -> Option<ReadinessHandle> {
        self.readiness.take()
    }

    pub fn readiness_started(&self) -> bool {
        self.post_config_started
    }

    pub fn current_view<T: 'static>(&self) -> Option<&T> {
        self.router.container().downcast_ref::<T>()
    }

    pub fn current_view_mut<T: 'static>(&mut self) -> Option<&mut T> {
        self.router.container_mut().downcast_mut::<T>()
    }

    /// Draw the mounted page.
    pub fn page_ui(&mut self, ui: &mut egui::Ui) {
        match self.router.container_mut().view_mut() {
            Some(view) => PageView::ui(view, ui),
            None => {
                ui.label("Nothing to show.");
            }
        }
    }
}

impl Drop for ShellController {
    fn drop(&mut self) {
        if let Some(handle) = &self.readiness {
            handle.abort();
        }
    }
}
