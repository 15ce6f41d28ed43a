//! Projects page: list job targets, hand one to the batch page, or delete it.

use super::{spawn_page_task, PageEvent};
use crate::models::{JobTarget, PageId, PageParams, Tone};
use crate::ui::registry::{PageContainer, PageContext, PageView, Teardown};
use crate::ui::{markup, widgets};
use eframe::egui;
use std::any::Any;

#[derive(Debug, Clone, PartialEq)]
pub enum ProjectsEvent {
    Loaded(Result<Vec<JobTarget>, String>),
    Deleted { id: String, result: Result<(), String> },
}

pub struct ProjectsPage {
    ctx: PageContext,
    targets: Vec<JobTarget>,
    loading: bool,
    error: Option<String>,
}

pub fn render(container: &mut PageContainer, ctx: PageContext) -> Option<Teardown> {
    let mut page = ProjectsPage::new(ctx);
    page.refresh();
    container.mount(Box::new(page));
    None
}

impl ProjectsPage {
    pub fn new(ctx: PageContext) -> Self {
        ProjectsPage { ctx, targets: Vec::new(), loading: false, error: None }
    }

    pub fn refresh(&mut self) {
        self.loading = true;
        spawn_page_task(&self.ctx.sink, self.ctx.bridge.list_job_targets(), |result| {
            Some(PageEvent::Projects(ProjectsEvent::Loaded(result.map_err(|e| e.to_string()))))
        });
    }

    /// Open the batch page with `id` preselected.
    pub fn process(&self, id: &str) {
        let mut params = PageParams::new();
        params.insert("target".to_string(), id.to_string());
        self.ctx.sink.navigate(PageId::Batch, params);
    }

    /// Ask for confirmation, then delete the target.
    pub fn delete(&self, id: &str) {
        let reply = self.ctx.dialogs.confirm("Are you sure you want to delete this project?");
        let bridge = self.ctx.bridge.clone();
        let sink = self.ctx.sink.clone();
        let id = id.to_string();
        tokio::spawn(async move {
            if !reply.await {
                return;
            }
            let result = bridge.delete_job_target(id.clone()).await.map_err(|e| e.to_string());
            sink.send(PageEvent::Projects(ProjectsEvent::Deleted { id, result }));
        });
    }

    pub fn targets(&self) -> &[JobTarget] {
        &self.targets
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }
}

impl PageView for ProjectsPage {
    fn ui(&mut self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            ui.heading("Project Management");
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                if ui.add_enabled(!self.loading, egui::Button::new("⟳ Refresh")).clicked() {
                    self.refresh();
                }
            });
        });
        ui.label("Manage generated log processing programs");
        ui.add_space(8.0);

        if let Some(err) = &self.error {
            widgets::banner(ui, Tone::Error, &format!("Failed to load projects: {}", markup::escape(err)), false, false);
            return;
        }
        if self.loading && self.targets.is_empty() {
            ui.horizontal(|ui| {
                ui.spinner();
                ui.label("Loading...");
            });
            return;
        }
        if self.targets.is_empty() {
            ui.label(egui::RichText::new("No projects").strong());
            ui.label(egui::RichText::new("Generate code on the \"Sample Analysis\" page first").weak());
            return;
        }

        let mut process = None;
        let mut delete = None;
        egui::ScrollArea::vertical().show(ui, |ui| {
            egui::Grid::new("projects_grid").striped(true).num_columns(2).spacing([24.0, 8.0]).show(ui, |ui| {
                ui.label(egui::RichText::new("Project Name").strong());
                ui.label(egui::RichText::new("Actions").strong());
                ui.end_row();
                for target in &self.targets {
                    ui.label(target.label());
                    ui.horizontal(|ui| {
                        if ui.button("Process files").clicked() {
                            process = Some(target.id.clone());
                        }
                        if ui.button("Delete").clicked() {
                            delete = Some(target.id.clone());
                        }
                    });
                    ui.end_row();
                }
            });
        });

        if let Some(id) = process {
            self.process(&id);
        }
        if let Some(id) = delete {
            self.delete(&id);
        }
    }

    fn handle_event(&mut self, event: PageEvent) {
        let PageEvent::Projects(event) = event else {
            return;
        };
        match event {
            ProjectsEvent::Loaded(Ok(targets)) => {
                self.loading = false;
                self.error = None;
                self.targets = targets;
            }
            ProjectsEvent::Loaded(Err(e)) => {
                log::warn!("[Projects] Failed to load projects: {}", e);
                self.loading = false;
                self.error = Some(e);
            }
            ProjectsEvent::Deleted { id, result: Ok(()) } => {
                log::info!("[Projects] Deleted {}", id);
                self.refresh();
            }
            ProjectsEvent::Deleted { id, result: Err(e) } => {
                log::warn!("[Projects] Failed to delete {}: {}", id, e);
                drop(self.ctx.dialogs.error(format!("Delete failed: {}", e)));
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
