use std::sync::Arc;

use logforge::bridge::{BackendBridge, HttpBridge};
use logforge::config::SettingsManager;
use logforge::log_collector::get_global_logs_path;
use logforge::ui::{AppUI, ShellController};
use logforge::LogCollector;

#[tokio::main]
async fn main() -> logforge::Result<()> {
    // =========================================================================
    // CONFIGURATION - needed first for the log level
    // =========================================================================
    let config = SettingsManager::load()?;

    // =========================================================================
    // ROBUST LOG COLLECTOR - DECOUPLED FROM UI
    // =========================================================================
    let log_dir = get_global_logs_path()?;
    let log_collector = LogCollector::new(log_dir, config.level_filter())?;
    if let Err(e) = log_collector.install() {
        eprintln!("[Main] WARNING: {}", e.user_message());
    }
    log::info!("LogForge {} starting, logging to {}", logforge::VERSION, log_collector.log_path().display());

    // =========================================================================
    // BRIDGE AND CONTROLLER
    // =========================================================================
    let bridge: Arc<dyn BackendBridge> = Arc::new(HttpBridge::new(config.backend_url.clone())?);
    let mut controller = ShellController::new(bridge, config.clone());
    controller.bootstrap().await;

    // =========================================================================
    // LAUNCH EGUI
    // =========================================================================
    let app_ui = AppUI::new(controller);
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title("LogForge")
            .with_inner_size([config.window_width, config.window_height])
            .with_min_inner_size([900.0, 600.0]),
        ..Default::default()
    };

    let result = eframe::run_native("LogForge", options, Box::new(move |_cc| Box::new(app_ui)));

    // =========================================================================
    // SHUTDOWN - flush pending log lines
    // =========================================================================
    log::info!("LogForge shutting down");
    if let Err(e) = log_collector.wait_for_empty().await {
        eprintln!("[Main] WARNING: {}", e.user_message());
    }

    result.map_err(|e| e.into())
}
