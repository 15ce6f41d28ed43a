//! Batch processing page: target/directory form, progress and result.

use super::{spawn_page_task, DirField, PageEvent};
use crate::models::{BackendSettings, JobTarget, Tone};
use crate::orchestrator::job::{JobEvent, JobMonitor, JobSink};
use crate::ui::registry::{PageContainer, PageContext, PageView, Teardown};
use crate::ui::widgets;
use eframe::egui;
use std::any::Any;
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq)]
pub enum BatchEvent {
    TargetsLoaded(Result<Vec<JobTarget>, String>),
    DefaultsLoaded(BackendSettings),
    DirectoryPicked { field: DirField, path: String },
    Job(JobEvent),
}

pub struct BatchPage {
    ctx: PageContext,
    monitor: JobMonitor,
    loading_targets: bool,
    targets_error: Option<String>,
}

/// Mount the batch page. Its teardown cancels any running polling session.
pub fn render(container: &mut PageContainer, ctx: PageContext) -> Option<Teardown> {
    let page = BatchPage::new(ctx);
    let guard = page.monitor.session_guard();
    container.mount(Box::new(page));
    Some(Teardown::new(move || guard.cancel()))
}

impl BatchPage {
    pub fn new(ctx: PageContext) -> Self {
        let sink = ctx.sink.clone();
        let job_sink: JobSink = Arc::new(move |event| sink.send(PageEvent::Batch(BatchEvent::Job(event))));
        let mut monitor = JobMonitor::new(ctx.bridge.clone(), ctx.dialogs.clone(), &ctx.timings, job_sink);
        if let Some(target) = ctx.param("target") {
            monitor.preselect(target);
        }

        spawn_page_task(&ctx.sink, ctx.bridge.list_job_targets(), |result| {
            Some(PageEvent::Batch(BatchEvent::TargetsLoaded(result.map_err(|e| e.to_string()))))
        });
        spawn_page_task(&ctx.sink, ctx.bridge.get_settings(), |result| match result {
            Ok(settings) => Some(PageEvent::Batch(BatchEvent::DefaultsLoaded(settings))),
            Err(e) => {
                log::debug!("[Batch] No default directories: {}", e);
                None
            }
        });

        BatchPage { ctx, monitor, loading_targets: true, targets_error: None }
    }

    pub fn monitor(&self) -> &JobMonitor {
        &self.monitor
    }

    pub fn monitor_mut(&mut self) -> &mut JobMonitor {
        &mut self.monitor
    }

    pub fn is_loading_targets(&self) -> bool {
        self.loading_targets
    }

    pub fn browse(&self, field: DirField) {
        let prompt = match field {
            DirField::Input => "Select Input Directory",
            DirField::Output => "Select Output Directory",
        };
        spawn_page_task(&self.ctx.sink, self.ctx.bridge.select_directory(prompt.to_string()), move |result| {
            match result {
                Ok(path) if !path.is_empty() => Some(PageEvent::Batch(BatchEvent::DirectoryPicked { field, path })),
                Ok(_) => None,
                Err(e) => {
                    log::debug!("[Batch] Directory picker failed: {}", e);
                    None
                }
            }
        });
    }

    fn target_label(&self) -> String {
        self.monitor
            .selected_target
            .as_ref()
            .and_then(|id| self.monitor.targets.iter().find(|t| &t.id == id))
            .map(JobTarget::label)
            .unwrap_or_else(|| "-- Select a project --".to_string())
    }
}

impl PageView for BatchPage {
    fn ui(&mut self, ui: &mut egui::Ui) {
        ui.heading("Batch Processing");
        ui.label("Use generated programs to batch process log files into spreadsheets");
        ui.add_space(8.0);

        let mut browse = None;
        let mut start = false;
        widgets::card(ui, "Processing Configuration", |ui| {
            ui.label("Select Project");
            if self.loading_targets {
                ui.horizontal(|ui| {
                    ui.spinner();
                    ui.label("Loading...");
                });
            } else if let Some(err) = &self.targets_error {
                ui.colored_label(widgets::tone_color(Tone::Error), format!("Failed to load projects: {}", err));
            } else {
                let selected_text = self.target_label();
                egui::ComboBox::from_id_source("batch_target")
                    .selected_text(selected_text)
                    .width(ui.available_width() - 20.0)
                    .show_ui(ui, |ui| {
                        for target in &self.monitor.targets {
                            let selected = self.monitor.selected_target.as_deref() == Some(target.id.as_str());
                            if ui.selectable_label(selected, target.label()).clicked() {
                                self.monitor.selected_target = Some(target.id.clone());
                            }
                        }
                    });
            }
            ui.add_space(6.0);
            if widgets::directory_field(ui, "Input Directory", &mut self.monitor.input_dir, "Directory containing log files") {
                browse = Some(DirField::Input);
            }
            ui.add_space(6.0);
            if widgets::directory_field(ui, "Output Directory", &mut self.monitor.output_dir, "Directory for spreadsheet output") {
                browse = Some(DirField::Output);
            }
            ui.add_space(6.0);
            ui.label("Output Filename (without extension)");
            ui.add(egui::TextEdit::singleline(&mut self.monitor.output_name).hint_text("Defaults to project name"));
            ui.add_space(10.0);
            start = ui
                .add_enabled(self.monitor.submit_enabled(), egui::Button::new("▶ Start Processing"))
                .clicked();
        });

        if let Some(field) = browse {
            self.browse(field);
        }
        if start {
            if let Err(e) = self.monitor.submit() {
                log::debug!("[Batch] Submission rejected: {}", e);
            }
        }

        if self.monitor.show_progress() {
            ui.add_space(10.0);
            widgets::card(ui, "Processing Progress", |ui| {
                ui.horizontal(|ui| {
                    if let Some(badge) = self.monitor.badge() {
                        widgets::status_badge(ui, badge);
                    }
                    if let Some(item) = self.monitor.current_item() {
                        ui.label(egui::RichText::new(format!("Current: {}", item)).small().weak());
                    }
                });
                widgets::progress_bar(ui, self.monitor.percent());
                ui.separator();
                ui.label(egui::RichText::new("EXECUTION LOG").small().strong());
                widgets::terminal_viewport(ui, &self.monitor.feed().text());
            });
        }

        if let Some(summary) = self.monitor.summary() {
            ui.add_space(10.0);
            let mut open = false;
            widgets::card(ui, "Processing Result", |ui| {
                ui.horizontal(|ui| {
                    stat(ui, summary.total, "Total Files", None);
                    stat(ui, summary.succeeded, "Success", Some(Tone::Success));
                    stat(ui, summary.failed, "Failed", Some(Tone::Error));
                });
                if let Some((tone, text)) = self.monitor.banner() {
                    widgets::banner(ui, tone, text, false, false);
                }
                if self.monitor.can_open_output() {
                    open = ui.button("📂 Open Output Directory").clicked();
                }
            });
            if open {
                self.monitor.open_output();
            }
        }
    }

    fn handle_event(&mut self, event: PageEvent) {
        let PageEvent::Batch(event) = event else {
            return;
        };
        match event {
            BatchEvent::TargetsLoaded(Ok(targets)) => {
                self.loading_targets = false;
                self.targets_error = None;
                self.monitor.set_targets(targets);
            }
            BatchEvent::TargetsLoaded(Err(e)) => {
                log::warn!("[Batch] Failed to load projects: {}", e);
                self.loading_targets = false;
                self.targets_error = Some(e);
            }
            BatchEvent::DefaultsLoaded(settings) => self.monitor.apply_defaults(&settings),
            BatchEvent::DirectoryPicked { field: DirField::Input, path } => self.monitor.input_dir = path,
            BatchEvent::DirectoryPicked { field: DirField::Output, path } => self.monitor.output_dir = path,
            BatchEvent::Job(event) => {
                self.monitor.handle_event(event);
            }
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

fn stat(ui: &mut egui::Ui, value: u32, label: &str, tone: Option<Tone>) {
    egui::Frame::group(ui.style()).inner_margin(egui::Margin::same(10.0)).show(ui, |ui| {
        ui.vertical_centered(|ui| {
            let mut text = egui::RichText::new(value.to_string()).size(22.0).strong();
            if let Some(tone) = tone {
                text = text.color(widgets::tone_color(tone));
            }
            ui.label(text);
            ui.label(egui::RichText::new(label).small().weak());
        });
    });
}
