//! Main window and eframe::App implementation
//!
//! Owns the ShellController and draws its state each frame: sidebar
//! navigation, status banner, the mounted page, then the modal layers
//! (wizard and dialogs) on top.

use super::controller::{EnvState, ShellController};
use super::dialog::{DialogAction, DialogView};
use super::widgets;
use crate::models::{PageId, Tone};
use eframe::egui;
use egui::{Color32, RichText};
use std::time::Duration;

/// Fallback repaint cadence so background events are applied without input
const IDLE_REPAINT_INTERVAL: Duration = Duration::from_millis(250);

const WIZARD_STEPS: [(&str, &str); 4] = [
    ("Sample Analysis", "Paste a log sample and a parsing program is generated automatically"),
    ("Code Validation", "The generated code is validated to make sure it runs correctly"),
    ("Batch Processing", "Select an input directory and convert every log file in one run"),
    ("Project Management", "Earlier projects can be viewed, edited or re-run at any time"),
];

pub struct AppUI {
    pub controller: ShellController,
}

impl AppUI {
    pub fn new(controller: ShellController) -> Self {
        AppUI { controller }
    }

    fn render_sidebar(&mut self, ctx: &egui::Context) {
        egui::SidePanel::left("sidebar").exact_width(210.0).resizable(false).show(ctx, |ui| {
            ui.add_space(12.0);
            ui.heading("LogForge");
            ui.label(RichText::new("Smart Log Formatter").small().weak());
            ui.separator();

            for page in PageId::ALL {
                let enabled = self.controller.router().is_nav_enabled(page);
                let active = self.controller.router().is_active(page);
                let response = ui.add_enabled(enabled, egui::SelectableLabel::new(active, page.label()));
                if response.clicked() {
                    self.controller.nav_click(page);
                }
            }

            ui.with_layout(egui::Layout::bottom_up(egui::Align::LEFT), |ui| {
                ui.add_space(8.0);
                let env = self.controller.env();
                let color = match env.state {
                    EnvState::Ready => widgets::tone_color(Tone::Success),
                    EnvState::Error => widgets::tone_color(Tone::Error),
                    EnvState::Checking | EnvState::Pending => Color32::GRAY,
                };
                ui.horizontal(|ui| {
                    ui.label(RichText::new("●").color(color));
                    ui.label(RichText::new(&env.label).small());
                });
            });
        });
    }

    fn render_banner(&mut self, ctx: &egui::Context) {
        let Some(banner) = self.controller.banner().cloned() else {
            return;
        };
        egui::TopBottomPanel::top("status_banner").show(ctx, |ui| {
            ui.add_space(4.0);
            if widgets::banner(ui, banner.tone, &banner.text, banner.spinner, true) {
                self.controller.dismiss_banner();
            }
            ui.add_space(4.0);
        });
    }

    fn render_content(&mut self, ctx: &egui::Context) {
        egui::CentralPanel::default().show(ctx, |ui| {
            egui::ScrollArea::vertical().auto_shrink([false; 2]).show(ui, |ui| {
                self.controller.page_ui(ui);
            });
        });
    }

    /// Full-window dimming layer. Returns true when clicked.
    fn backdrop(ctx: &egui::Context, id: &str) -> bool {
        let screen = ctx.screen_rect();
        egui::Area::new(egui::Id::new(id))
            .order(egui::Order::Middle)
            .fixed_pos(screen.min)
            .show(ctx, |ui| {
                let response = ui.allocate_rect(screen, egui::Sense::click());
                ui.painter().rect_filled(screen, 0.0, Color32::from_black_alpha(140));
                response.clicked()
            })
            .inner
    }

    /// Centered panel drawn above the backdrop layer.
    fn modal<R>(ctx: &egui::Context, id: &str, width: f32, add_contents: impl FnOnce(&mut egui::Ui) -> R) -> R {
        egui::Area::new(egui::Id::new(id))
            .order(egui::Order::Foreground)
            .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
            .show(ctx, |ui| {
                egui::Frame::window(&ctx.style())
                    .show(ui, |ui| {
                        ui.set_width(width);
                        add_contents(ui)
                    })
                    .inner
            })
            .inner
    }

    fn render_wizard(&mut self, ctx: &egui::Context) {
        if !self.controller.wizard().visible {
            return;
        }
        let mut close = Self::backdrop(ctx, "wizard_backdrop");

        Self::modal(ctx, "wizard", 460.0, |ui| {
            ui.vertical_centered(|ui| {
                ui.label(RichText::new("🚀").size(32.0));
                ui.heading("Welcome to LogForge");
                ui.label(RichText::new("Smart Network Log Formatter").weak());
            });
            ui.add_space(10.0);
            for (n, (title, desc)) in WIZARD_STEPS.iter().enumerate() {
                ui.horizontal(|ui| {
                    ui.label(RichText::new(format!("{}", n + 1)).strong().size(18.0));
                    ui.vertical(|ui| {
                        ui.label(RichText::new(*title).strong());
                        ui.label(RichText::new(*desc).small());
                    });
                });
                ui.add_space(4.0);
            }
            ui.separator();
            ui.horizontal(|ui| {
                ui.checkbox(&mut self.controller.wizard_mut().dont_show_again, "Don't show this wizard again");
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    if ui.button("Get Started").clicked() {
                        close = true;
                    }
                });
            });
        });

        if close {
            self.controller.close_wizard();
        }
    }

    fn render_dialog(&mut self, ctx: &egui::Context) {
        let Some(view) = self.controller.dialogs().current() else {
            return;
        };
        let backdrop = Self::backdrop(ctx, "dialog_backdrop");
        let button = Self::modal(ctx, &format!("dialog_{}", view.id), 380.0, |ui| dialog_body(ui, &view));
        let (enter, escape) = ctx.input(|i| (i.key_pressed(egui::Key::Enter), i.key_pressed(egui::Key::Escape)));

        if let Some(action) = dialog_action(backdrop, button, enter, escape) {
            self.controller.dialogs().respond(action);
        }
    }
}

/// Action that closes the dialog this frame. Keys win over clicks and a
/// button click wins over the backdrop underneath it.
fn dialog_action(backdrop: bool, button: Option<DialogAction>, enter: bool, escape: bool) -> Option<DialogAction> {
    if enter {
        Some(DialogAction::Affirm)
    } else if escape {
        Some(DialogAction::Cancel)
    } else if button.is_some() {
        button
    } else if backdrop {
        Some(DialogAction::Backdrop)
    } else {
        None
    }
}

fn dialog_body(ui: &mut egui::Ui, view: &DialogView) -> Option<DialogAction> {
    let mut action = None;
    ui.horizontal(|ui| {
        ui.label(RichText::new(view.icon).size(24.0));
        ui.vertical(|ui| {
            widgets::markup_label(ui, &view.title, None);
            ui.add_space(4.0);
            widgets::markup_label(ui, &view.message, None);
        });
    });
    ui.add_space(10.0);
    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
        if ui.button(view.affirm_label).clicked() {
            action = Some(DialogAction::Affirm);
        }
        if let Some(cancel) = view.cancel_label {
            if ui.button(cancel).clicked() {
                action = Some(DialogAction::Cancel);
            }
        }
    });
    action
}

impl eframe::App for AppUI {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        if self.controller.process_events() > 0 {
            ctx.request_repaint();
        }

        self.render_sidebar(ctx);
        self.render_banner(ctx);
        self.render_content(ctx);
        self.render_wizard(ctx);
        self.render_dialog(ctx);

        ctx.request_repaint_after(IDLE_REPAINT_INTERVAL);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ui::dialog::DialogKind;

    #[test]
    fn test_dialog_action_precedence() {
        assert_eq!(dialog_action(false, None, false, false), None);
        assert_eq!(dialog_action(true, None, false, false), Some(DialogAction::Backdrop));
        assert_eq!(dialog_action(true, Some(DialogAction::Affirm), false, false), Some(DialogAction::Affirm));
        assert_eq!(dialog_action(false, Some(DialogAction::Cancel), false, false), Some(DialogAction::Cancel));
        assert_eq!(dialog_action(true, None, true, false), Some(DialogAction::Affirm));
        assert_eq!(dialog_action(false, Some(DialogAction::Affirm), false, true), Some(DialogAction::Cancel));
    }

    #[test]
    fn test_confirm_results_from_frame_input() {
        let resolve = |backdrop, button, enter, escape| {
            dialog_action(backdrop, button, enter, escape).map(|action| DialogKind::Confirm.resolve(action))
        };
        assert_eq!(resolve(true, None, false, false), Some(false));
        assert_eq!(resolve(true, Some(DialogAction::Affirm), false, false), Some(true));
        assert_eq!(resolve(false, Some(DialogAction::Cancel), false, false), Some(false));
        assert_eq!(resolve(false, None, false, true), Some(false));
        assert_eq!(resolve(false, None, true, false), Some(true));
    }

    #[test]
    fn test_acknowledgements_from_frame_input() {
        for kind in [DialogKind::Warning, DialogKind::Error, DialogKind::Info] {
            for (backdrop, button, enter, escape) in [
                (true, None, false, false),
                (false, Some(DialogAction::Affirm), false, false),
                (true, Some(DialogAction::Affirm), false, false),
                (false, None, false, true),
            ] {
                let action = dialog_action(backdrop, button, enter, escape).unwrap();
                assert!(kind.resolve(action));
            }
        }
    }
}
