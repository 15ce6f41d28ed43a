//! Shared egui widgets
//!
//! - markup_label: renders the shell's trusted markup (bold/code spans)
//! - banner: tone-colored alert box
//! - status_badge / progress_bar: batch progress display
//! - terminal_viewport: monospace log viewer

use super::markup::{self, SpanStyle};
use crate::models::{StatusBadge, Tone};
use eframe::egui;
use egui::{Color32, RichText};

pub fn tone_color(tone: Tone) -> Color32 {
    match tone {
        Tone::Info => Color32::from_rgb(100, 150, 255),
        Tone::Success => Color32::from_rgb(100, 200, 120),
        Tone::Warning => Color32::from_rgb(235, 180, 60),
        Tone::Error => Color32::from_rgb(255, 100, 100),
    }
}

/// Render trusted markup. Text that came from outside must already be escaped.
pub fn markup_label(ui: &mut egui::Ui, text: &str, color: Option<Color32>) {
    ui.horizontal_wrapped(|ui| {
        ui.spacing_mut().item_spacing.x = 0.0;
        for span in markup::parse(text) {
            let mut rich = RichText::new(span.text);
            match span.style {
                SpanStyle::Plain => {}
                SpanStyle::Strong => rich = rich.strong(),
                SpanStyle::Code => rich = rich.code(),
            }
            if let Some(color) = color {
                rich = rich.color(color);
            }
            ui.label(rich);
        }
    });
}

/// Alert box with a colored border. Returns true if the dismiss button was clicked.
pub fn banner(ui: &mut egui::Ui, tone: Tone, text: &str, spinner: bool, dismissable: bool) -> bool {
    let color = tone_color(tone);
    let mut dismissed = false;
    egui::Frame::none()
        .fill(color.linear_multiply(0.12))
        .stroke(egui::Stroke::new(1.0, color))
        .rounding(4.0)
        .inner_margin(egui::Margin::symmetric(10.0, 6.0))
        .show(ui, |ui| {
            ui.horizontal(|ui| {
                if spinner {
                    ui.spinner();
                }
                markup_label(ui, text, Some(color));
                if dismissable {
                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        dismissed = ui.small_button("✖").clicked();
                    });
                }
            });
        });
    dismissed
}

pub fn status_badge(ui: &mut egui::Ui, badge: StatusBadge) {
    let color = tone_color(badge.tone);
    egui::Frame::none()
        .fill(color.linear_multiply(0.2))
        .rounding(8.0)
        .inner_margin(egui::Margin::symmetric(8.0, 2.0))
        .show(ui, |ui| {
            ui.label(RichText::new(badge.label).small().color(color));
        });
}

/// Horizontal progress bar labelled with the whole percent.
pub fn progress_bar(ui: &mut egui::Ui, percent: u32) {
    let fraction = percent.min(100) as f32 / 100.0;
    ui.add(egui::ProgressBar::new(fraction).text(format!("{}%", percent)));
}

/// Terminal-style log viewer with monospace font
pub fn terminal_viewport(ui: &mut egui::Ui, log_content: &str) {
    egui::ScrollArea::vertical()
        .auto_shrink([false; 2])
        .max_height(220.0)
        .stick_to_bottom(true)
        .show(ui, |ui| {
            ui.monospace(if log_content.is_empty() {
                "Awaiting output..."
            } else {
                log_content
            });
        });
}

/// Labelled path field with a browse button. Returns true on browse click.
pub fn directory_field(ui: &mut egui::Ui, label: &str, value: &mut String, placeholder: &str) -> bool {
    ui.label(label);
    let mut browse = false;
    ui.horizontal(|ui| {
        ui.add(
            egui::TextEdit::singleline(value)
                .hint_text(placeholder)
                .desired_width(ui.available_width() - 90.0),
        );
        browse = ui.button("Browse...").clicked();
    });
    browse
}

/// Titled card section
pub fn card<R>(ui: &mut egui::Ui, title: &str, add_contents: impl FnOnce(&mut egui::Ui) -> R) -> R {
    egui::Frame::group(ui.style())
        .inner_margin(egui::Margin::same(12.0))
        .show(ui, |ui| {
            ui.set_width(ui.available_width());
            ui.label(RichText::new(title).strong().size(15.0));
            ui.add_space(6.0);
            add_contents(ui)
        })
        .inner
}
