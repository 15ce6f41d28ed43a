//! Shell bootstrap, configuration guard, wizard and banner tests

mod common;

use common::{fast_config, pump_until, MockBridge};
use logforge::config::ShellConfig;
use logforge::error::BridgeError;
use logforge::models::{EnvStatus, PageId, Tone};
use logforge::ui::controller::{EnvState, ShellEvent};
use logforge::ui::pages::{PageEvent, SampleEvent};
use logforge::ui::registry::{PageRegistry, PageView};
use logforge::ui::ShellController;
use std::any::Any;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Page stub that records the events delivered to it.
struct RecordingPage {
    received: Arc<Mutex<Vec<PageEvent>>>,
}

impl PageView for RecordingPage {
    fn ui(&mut self, _ui: &mut egui::Ui) {}
    fn handle_event(&mut self, event: PageEvent) {
        self.received.lock().unwrap().push(event);
    }
    fn as_any(&self) -> &dyn Any {
        self
    }
    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

fn stub_registry(received: &Arc<Mutex<Vec<PageEvent>>>) -> PageRegistry {
    let mut registry = PageRegistry::new();
    for page in PageId::ALL {
        let received = received.clone();
        registry.register(page, move |container, _ctx| {
            container.mount(Box::new(RecordingPage { received: received.clone() }));
            None
        });
    }
    registry
}

fn controller(bridge: &Arc<MockBridge>, config: ShellConfig) -> ShellController {
    ShellController::with_registry(bridge.clone(), config, stub_registry(&Arc::default()))
}

#[tokio::test(start_paused = true)]
async fn test_failed_configuration_check_fails_closed() {
    let bridge = MockBridge::new();
    *bridge.configured.lock().unwrap() = Err(BridgeError::new("backend unreachable"));
    let mut shell = controller(&bridge, ShellConfig::default());

    shell.bootstrap().await;

    assert!(!shell.router().is_configured());
    assert_eq!(shell.router().state().current_page, PageId::Settings);
    assert!(!shell.readiness_started());
    assert!(!shell.nav_click(PageId::Batch));
    tokio::time::sleep(Duration::from_secs(5)).await;
    assert_eq!(bridge.calls("GetEnvironmentReady"), 0);
    assert_eq!(bridge.calls("GetShowWizard"), 0);
}

#[tokio::test(start_paused = true)]
async fn test_unconfigured_start_opens_settings_only() {
    let bridge = MockBridge::unconfigured();
    let mut config = ShellConfig::default();
    config.start_page = "batch".to_string();
    let mut shell = controller(&bridge, config);

    shell.bootstrap().await;

    assert_eq!(shell.router().state().current_page, PageId::Settings);
    assert_eq!(shell.router().location(), "settings");
    for page in [PageId::Sample, PageId::Batch, PageId::Projects] {
        assert!(!shell.router().is_nav_enabled(page));
    }
    assert!(shell.router().is_nav_enabled(PageId::Settings));
}

#[tokio::test(start_paused = true)]
async fn test_configured_start_routes_to_start_page() {
    let bridge = MockBridge::new();
    let mut config = ShellConfig::default();
    config.start_page = "projects".to_string();
    let mut shell = controller(&bridge, config);

    shell.bootstrap().await;

    assert_eq!(shell.router().state().current_page, PageId::Projects);
    assert!(shell.readiness_started());
}

#[tokio::test(start_paused = true)]
async fn test_ready_environment_banner_and_indicator() {
    let bridge = MockBridge::new();
    bridge.script_env([Ok(EnvStatus::pending()), Ok(EnvStatus::ready())]);
    let mut shell = controller(&bridge, ShellConfig::default());

    shell.bootstrap().await;
    assert_eq!(shell.env().state, EnvState::Checking);

    pump_until(&mut shell, |s| s.env().state == EnvState::Pending).await;
    let banner = shell.banner().unwrap();
    assert_eq!(banner.tone, Tone::Info);
    assert!(banner.spinner);

    pump_until(&mut shell, |s| s.env().state == EnvState::Ready).await;
    let banner = shell.banner().unwrap();
    assert_eq!(banner.tone, Tone::Success);
    assert_eq!(banner.text, "✅ Python environment ready");
    assert_eq!(bridge.calls("GetEnvironmentReady"), 2);

    // Auto-dismissed after the ready delay.
    pump_until(&mut shell, |s| s.banner().is_none()).await;
}

#[tokio::test(start_paused = true)]
async fn test_environment_error_is_escaped() {
    let bridge = MockBridge::new();
    bridge.script_env([Ok(EnvStatus::failed("missing <python3>"))]);
    let mut shell = controller(&bridge, ShellConfig::default());

    shell.bootstrap().await;
    pump_until(&mut shell, |s| s.env().state == EnvState::Error).await;

    let banner = shell.banner().unwrap();
    assert_eq!(banner.tone, Tone::Error);
    assert_eq!(banner.text, "❌ Environment initialization failed: missing &lt;python3&gt;");
}

#[tokio::test(start_paused = true)]
async fn test_timeout_banner_points_to_settings() {
    let bridge = MockBridge::new();
    let mut shell = controller(&bridge, fast_config());

    shell.bootstrap().await;
    pump_until(&mut shell, |s| s.env().state == EnvState::Error).await;

    let banner = shell.banner().unwrap();
    assert_eq!(banner.tone, Tone::Warning);
    assert!(banner.text.contains("<b>Settings</b>"));
    assert_eq!(bridge.calls("GetEnvironmentReady"), 3);
}

#[tokio::test(start_paused = true)]
async fn test_newer_banner_outlives_old_timer() {
    let bridge = MockBridge::new();
    let mut shell = controller(&bridge, ShellConfig::default());

    shell.show_banner(Tone::Success, "first".to_string(), false, Some(Duration::from_secs(1)));
    shell.show_banner(Tone::Info, "second".to_string(), false, None);
    tokio::time::sleep(Duration::from_secs(2)).await;
    shell.process_events();

    assert_eq!(shell.banner().map(|b| b.text.as_str()), Some("second"));
}

#[tokio::test(start_paused = true)]
async fn test_verification_unlocks_navigation_once() {
    let bridge = MockBridge::unconfigured();
    bridge.script_env([Ok(EnvStatus::ready())]);
    let mut shell = controller(&bridge, ShellConfig::default());
    shell.bootstrap().await;
    assert!(!shell.readiness_started());

    shell.events_sender().send(ShellEvent::ConfigurationVerified).unwrap();
    shell.pump().await;
    assert!(shell.router().is_configured());
    assert!(shell.readiness_started());

    let handle = shell.take_readiness().unwrap();
    handle.join().await.unwrap();

    // A second verification does not start another poll or wizard check.
    shell.on_configuration_verified();
    assert!(shell.take_readiness().is_none());
    tokio::time::sleep(Duration::from_secs(5)).await;
    assert_eq!(bridge.calls("GetEnvironmentReady"), 1);
    assert_eq!(bridge.calls("GetShowWizard"), 1);

    assert!(shell.nav_click(PageId::Batch));
    pump_until(&mut shell, |s| s.router().state().current_page == PageId::Batch).await;
}

#[tokio::test(start_paused = true)]
async fn test_wizard_shown_and_preference_persisted() {
    let bridge = MockBridge::new();
    *bridge.show_wizard.lock().unwrap() = Ok(true);
    bridge.script_env([Ok(EnvStatus::ready())]);
    let mut shell = controller(&bridge, ShellConfig::default());

    shell.bootstrap().await;
    pump_until(&mut shell, |s| s.wizard().visible).await;

    shell.wizard_mut().dont_show_again = true;
    shell.close_wizard();
    assert!(!shell.wizard().visible);
    tokio::time::sleep(Duration::from_millis(10)).await;
    assert_eq!(*bridge.wizard_writes.lock().unwrap(), vec![false]);
}

#[tokio::test(start_paused = true)]
async fn test_closing_wizard_without_opt_out_writes_nothing() {
    let bridge = MockBridge::new();
    let mut shell = controller(&bridge, ShellConfig::default());
    shell.apply(ShellEvent::WizardCheck(true));
    assert!(shell.wizard().visible);

    shell.close_wizard();
    tokio::time::sleep(Duration::from_millis(10)).await;
    assert!(bridge.wizard_writes.lock().unwrap().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_wizard_check_failure_is_quiet() {
    let bridge = MockBridge::new();
    *bridge.show_wizard.lock().unwrap() = Err(BridgeError::new("no preference store"));
    bridge.script_env([Ok(EnvStatus::ready())]);
    let mut shell = controller(&bridge, ShellConfig::default());

    shell.bootstrap().await;
    pump_until(&mut shell, |s| s.env().state == EnvState::Ready).await;
    tokio::time::sleep(Duration::from_millis(10)).await;
    shell.process_events();

    assert!(!shell.wizard().visible);
    assert!(!shell.dialogs().is_open());
}

#[tokio::test(start_paused = true)]
async fn test_events_for_replaced_page_are_dropped() {
    let bridge = MockBridge::new();
    let received = Arc::new(Mutex::new(Vec::new()));
    let mut shell = ShellController::with_registry(bridge.clone(), ShellConfig::default(), stub_registry(&received));
    shell.bootstrap().await;

    let stale_mount = shell.router().current_mount();
    shell.router_mut().navigate(PageId::Projects, None);
    let event = PageEvent::Sample(SampleEvent::Analyzed(Err("late".to_string())));

    shell.apply(ShellEvent::Page { mount: stale_mount, event: event.clone() });
    assert!(received.lock().unwrap().is_empty());

    let current = shell.router().current_mount();
    shell.apply(ShellEvent::Page { mount: current, event: event.clone() });
    assert_eq!(*received.lock().unwrap(), vec![event]);
}
