//! Sample analysis page: paste a log sample, generate a parsing program.

use super::{spawn_page_task, PageEvent};
use crate::models::{GenerateResult, PageId, PageParams, StatusBadge, Tone};
use crate::ui::registry::{PageContainer, PageContext, PageView, Teardown};
use crate::ui::{markup, widgets};
use eframe::egui;
use std::any::Any;

#[derive(Debug, Clone, PartialEq)]
pub enum SampleEvent {
    Analyzed(Result<GenerateResult, String>),
}

pub struct SamplePage {
    ctx: PageContext,
    pub project_name: String,
    pub sample: String,
    analyzing: bool,
    analyzed_name: String,
    result: Option<GenerateResult>,
    error: Option<String>,
}

pub fn render(container: &mut PageContainer, ctx: PageContext) -> Option<Teardown> {
    container.mount(Box::new(SamplePage::new(ctx)));
    None
}

impl SamplePage {
    pub fn new(ctx: PageContext) -> Self {
        SamplePage {
            ctx,
            project_name: String::new(),
            sample: String::new(),
            analyzing: false,
            analyzed_name: String::new(),
            result: None,
            error: None,
        }
    }

    /// Send the sample for analysis. Empty inputs open a warning instead.
    pub fn analyze(&mut self) -> bool {
        let name = self.project_name.trim().to_string();
        if name.is_empty() {
            drop(self.ctx.dialogs.alert("Please enter project name"));
            return false;
        }
        let sample = self.sample.trim().to_string();
        if sample.is_empty() {
            drop(self.ctx.dialogs.alert("Please enter sample log content"));
            return false;
        }

        self.analyzing = true;
        self.result = None;
        self.error = None;
        self.analyzed_name = name.clone();
        log::info!("[Sample] Analyzing sample for '{}' ({} bytes)", name, sample.len());

        spawn_page_task(&self.ctx.sink, self.ctx.bridge.analyze_sample(name, sample), |result| {
            Some(PageEvent::Sample(SampleEvent::Analyzed(result.map_err(|e| e.to_string()))))
        });
        true
    }

    /// Jump to the batch page with the generated project preselected.
    pub fn batch_process(&self) {
        if let Some(result) = &self.result {
            let mut params = PageParams::new();
            params.insert("target".to_string(), result.project_id.clone());
            self.ctx.sink.navigate(PageId::Batch, params);
        }
    }

    pub fn is_analyzing(&self) -> bool {
        self.analyzing
    }

    pub fn result(&self) -> Option<&GenerateResult> {
        self.result.as_ref()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }
}

impl PageView for SamplePage {
    fn ui(&mut self, ui: &mut egui::Ui) {
        ui.heading("Sample Analysis");
        ui.label("Paste sample log entries and a parsing program will be generated for their format");
        ui.add_space(8.0);

        let mut analyze = false;
        widgets::card(ui, "Sample Log Input", |ui| {
            ui.label("Project Name");
            ui.add(
                egui::TextEdit::singleline(&mut self.project_name)
                    .hint_text("Name this analysis, e.g., nginx-access-logs"),
            );
            ui.add_space(6.0);
            ui.label("Paste sample log entries");
            ui.add(
                egui::TextEdit::multiline(&mut self.sample)
                    .code_editor()
                    .desired_rows(10)
                    .desired_width(f32::INFINITY)
                    .hint_text("2024-01-15 10:23:45 INFO [nginx] 192.168.1.100 GET /api/users 200 0.032s"),
            );
            ui.add_space(8.0);
            analyze = ui.add_enabled(!self.analyzing, egui::Button::new("Analyze")).clicked();
        });
        if analyze {
            self.analyze();
        }

        if self.analyzing {
            ui.add_space(8.0);
            ui.horizontal(|ui| {
                ui.spinner();
                ui.label("Analyzing sample and generating code, please wait...");
            });
        }

        if let Some(err) = &self.error {
            ui.add_space(8.0);
            widgets::banner(ui, Tone::Error, &markup::escape(err), false, false);
        }

        let mut batch = false;
        if let Some(result) = &self.result {
            ui.add_space(10.0);
            widgets::card(ui, "Generated Code", |ui| {
                ui.horizontal(|ui| {
                    ui.label(format!("Project Name: {}", self.analyzed_name));
                    let badge = if result.valid {
                        StatusBadge { label: "Validated", tone: Tone::Success }
                    } else {
                        StatusBadge { label: "Not Validated", tone: Tone::Warning }
                    };
                    widgets::status_badge(ui, badge);
                });
                if !result.errors.is_empty() {
                    let text = result.errors.iter().map(|e| markup::escape(e)).collect::<Vec<_>>().join("\n");
                    widgets::banner(ui, Tone::Error, &text, false, false);
                }
                egui::ScrollArea::vertical().max_height(320.0).show(ui, |ui| {
                    let mut code = result.code.as_str();
                    ui.add(egui::TextEdit::multiline(&mut code).code_editor().desired_width(f32::INFINITY));
                });
                ui.add_space(6.0);
                batch = ui.button("Batch process").clicked();
            });
        }
        if batch {
            self.batch_process();
        }
    }

    fn handle_event(&mut self, event: PageEvent) {
        let PageEvent::Sample(SampleEvent::Analyzed(result)) = event else {
            return;
        };
        self.analyzing = false;
        match result {
            Ok(result) => {
                log::info!("[Sample] Generated project {} (valid: {})", result.project_id, result.valid);
                self.result = Some(result);
            }
            Err(e) => {
                log::warn!("[Sample] Analysis failed: {}", e);
                self.error = Some(e);
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
