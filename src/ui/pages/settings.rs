//! Settings page: model connection, default directories, wizard toggle.
//!
//! A successful connection test is what unlocks the rest of the shell.

use super::{spawn_page_task, DirField, PageEvent};
use crate::models::{BackendSettings, Tone};
use crate::ui::registry::{PageContainer, PageContext, PageView, Teardown};
use crate::ui::{markup, widgets};
use eframe::egui;
use futures::FutureExt;
use std::any::Any;

#[derive(Debug, Clone, PartialEq)]
pub enum SettingsEvent {
    Loaded(Result<BackendSettings, String>),
    WizardFlag(bool),
    Saved(Result<(), String>),
    Tested(Result<(), String>),
    DirectoryPicked { field: DirField, path: String },
}

pub struct SettingsPage {
    ctx: PageContext,
    pub form: BackendSettings,
    pub show_wizard: bool,
    configured: bool,
    testing: bool,
    message: Option<(Tone, String)>,
    test_result: Option<(Tone, String)>,
}

pub fn render(container: &mut PageContainer, ctx: PageContext) -> Option<Teardown> {
    container.mount(Box::new(SettingsPage::new(ctx)));
    None
}

impl SettingsPage {
    pub fn new(ctx: PageContext) -> Self {
        spawn_page_task(&ctx.sink, ctx.bridge.get_settings(), |result| {
            Some(PageEvent::Settings(SettingsEvent::Loaded(result.map_err(|e| e.to_string()))))
        });
        spawn_page_task(&ctx.sink, ctx.bridge.get_show_wizard(), |result| {
            Some(PageEvent::Settings(SettingsEvent::WizardFlag(result.unwrap_or(true))))
        });

        let configured = ctx.configured;
        SettingsPage {
            ctx,
            form: BackendSettings::default(),
            show_wizard: true,
            configured,
            testing: false,
            message: None,
            test_result: None,
        }
    }

    /// Form contents with surrounding whitespace removed.
    pub fn gather(&self) -> BackendSettings {
        let mut settings = self.form.clone();
        settings.llm.base_url = settings.llm.base_url.trim().to_string();
        settings.llm.api_key = settings.llm.api_key.trim().to_string();
        settings.llm.model_name = settings.llm.model_name.trim().to_string();
        settings.default_input_dir = settings.default_input_dir.trim().to_string();
        settings.default_output_dir = settings.default_output_dir.trim().to_string();
        settings.show_wizard = None;
        settings
    }

    pub fn save(&mut self) {
        spawn_page_task(&self.ctx.sink, self.ctx.bridge.save_settings(self.gather()), |result| {
            Some(PageEvent::Settings(SettingsEvent::Saved(result.map_err(|e| e.to_string()))))
        });
    }

    /// Save the form, then test the model connection.
    pub fn test_connection(&mut self) -> bool {
        let settings = self.gather();
        if !settings.llm.is_complete() {
            self.test_result = Some((Tone::Error, "Please fill in complete LLM configuration".to_string()));
            return false;
        }

        self.testing = true;
        self.test_result = Some((Tone::Info, "Saving settings and testing connection...".to_string()));
        let bridge = self.ctx.bridge.clone();
        let call = async move {
            bridge.save_settings(settings).await?;
            bridge.test_remote_connection().await
        }
        .boxed();
        spawn_page_task(&self.ctx.sink, call, |result| {
            Some(PageEvent::Settings(SettingsEvent::Tested(result.map_err(|e| e.to_string()))))
        });
        true
    }

    /// Persist the wizard toggle. Failures are ignored.
    pub fn set_show_wizard(&mut self, show: bool) {
        self.show_wizard = show;
        spawn_page_task(&self.ctx.sink, self.ctx.bridge.set_show_wizard(show), |result| {
            if let Err(e) = result {
                log::debug!("[Settings] Failed to persist wizard flag: {}", e);
            }
            None
        });
    }

    pub fn browse(&self, field: DirField) {
        let prompt = match field {
            DirField::Input => "Select Default Input Directory",
            DirField::Output => "Select Default Output Directory",
        };
        spawn_page_task(&self.ctx.sink, self.ctx.bridge.select_directory(prompt.to_string()), move |result| {
            match result {
                Ok(path) if !path.is_empty() => {
                    Some(PageEvent::Settings(SettingsEvent::DirectoryPicked { field, path }))
                }
                _ => None,
            }
        });
    }

    pub fn is_testing(&self) -> bool {
        self.testing
    }

    pub fn test_result(&self) -> Option<(Tone, &str)> {
        self.test_result.as_ref().map(|(tone, text)| (*tone, text.as_str()))
    }

    pub fn message(&self) -> Option<(Tone, &str)> {
        self.message.as_ref().map(|(tone, text)| (*tone, text.as_str()))
    }
}

impl PageView for SettingsPage {
    fn ui(&mut self, ui: &mut egui::Ui) {
        ui.heading("Settings");
        ui.label("Configure the LLM connection and default directories");
        ui.add_space(8.0);

        if !self.configured {
            widgets::banner(
                ui,
                Tone::Warning,
                "<b>First time setup:</b> Please configure LLM parameters and test the connection before using other features.",
                false,
                false,
            );
            ui.add_space(8.0);
        }

        let mut test = false;
        widgets::card(ui, "LLM Configuration", |ui| {
            ui.label("Base URL");
            ui.add(egui::TextEdit::singleline(&mut self.form.llm.base_url).hint_text("e.g., https://api.deepseek.com/v1"));
            ui.label("API Key");
            ui.add(egui::TextEdit::singleline(&mut self.form.llm.api_key).password(true).hint_text("Enter API Key"));
            ui.label("Model Name");
            ui.add(egui::TextEdit::singleline(&mut self.form.llm.model_name).hint_text("e.g., deepseek-chat"));
            ui.add_space(8.0);
            ui.horizontal(|ui| {
                let label = if self.testing { "Testing..." } else { "Test Connection" };
                test = ui.add_enabled(!self.testing, egui::Button::new(label)).clicked();
                if self.testing {
                    ui.spinner();
                }
            });
            if let Some((tone, text)) = &self.test_result {
                widgets::banner(ui, *tone, text, false, false);
            }
        });
        if test {
            self.test_connection();
        }

        ui.add_space(10.0);
        let mut browse = None;
        widgets::card(ui, "Default Directories", |ui| {
            if widgets::directory_field(
                ui,
                "Default Input Directory",
                &mut self.form.default_input_dir,
                "Default directory for log files",
            ) {
                browse = Some(DirField::Input);
            }
            if widgets::directory_field(
                ui,
                "Default Output Directory",
                &mut self.form.default_output_dir,
                "Default directory for spreadsheet output",
            ) {
                browse = Some(DirField::Output);
            }
        });
        if let Some(field) = browse {
            self.browse(field);
        }

        ui.add_space(10.0);
        let mut toggled = None;
        widgets::card(ui, "Other", |ui| {
            let mut show = self.show_wizard;
            if ui.checkbox(&mut show, "Show wizard on startup").changed() {
                toggled = Some(show);
            }
        });
        if let Some(show) = toggled {
            self.set_show_wizard(show);
        }

        ui.add_space(10.0);
        if ui.button("💾 Save Settings").clicked() {
            self.save();
        }
        if let Some((tone, text)) = &self.message {
            widgets::banner(ui, *tone, text, false, false);
        }
    }

    fn handle_event(&mut self, event: PageEvent) {
        let PageEvent::Settings(event) = event else {
            return;
        };
        match event {
            SettingsEvent::Loaded(Ok(settings)) => {
                self.form = settings;
            }
            SettingsEvent::Loaded(Err(e)) => {
                self.message = Some((Tone::Error, format!("Failed to load settings: {}", markup::escape(&e))));
            }
            SettingsEvent::WizardFlag(show) => self.show_wizard = show,
            SettingsEvent::Saved(Ok(())) => {
                log::info!("[Settings] Settings saved");
                self.message = Some((Tone::Success, "Settings saved".to_string()));
            }
            SettingsEvent::Saved(Err(e)) => {
                log::warn!("[Settings] Save failed: {}", e);
                self.message = Some((Tone::Error, format!("Save failed: {}", markup::escape(&e))));
            }
            SettingsEvent::Tested(Ok(())) => {
                log::info!("[Settings] LLM connection test passed");
                self.testing = false;
                self.configured = true;
                self.test_result = Some((Tone::Success, "✅ LLM connection test passed".to_string()));
                self.ctx.sink.notify_configured();
            }
            SettingsEvent::Tested(Err(e)) => {
                log::warn!("[Settings] LLM connection test failed: {}", e);
                self.testing = false;
                self.test_result = Some((Tone::Error, format!("❌ Test failed: {}", markup::escape(&e))));
            }
            SettingsEvent::DirectoryPicked { field: DirField::Input, path } => self.form.default_input_dir = path,
            SettingsEvent::DirectoryPicked { field: DirField::Output, path } => self.form.default_output_dir = path,
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
