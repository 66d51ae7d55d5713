//! Compact sidebar list

use egui::{Color32, RichText, Ui};

use super::platform::SurfacePlatform;
use super::{completion_color, render_empty_state};
use crate::render::RenderPlan;

/// Render the sidebar rows of `plan` (search-filtered)
pub fn render_sidebar<P: SurfacePlatform>(ui: &mut Ui, platform: &mut P, plan: &RenderPlan) {
    if let Some(state) = plan.sidebar_empty {
        render_empty_state(ui, state);
        return;
    }

    let mut clicked = None;
    egui::ScrollArea::vertical()
        .id_salt("sidebar_games")
        .auto_shrink([false, false])
        .show(ui, |ui| {
            for record in &plan.sidebar {
                let is_selected = platform.selected() == Some(&record.id);
                ui.horizontal(|ui| {
                    let response = ui.selectable_label(is_selected, &record.name);
                    if response.clicked() {
                        clicked = Some(record.id.clone());
                    }
                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        let text = if record.has_achievements() {
                            format!("{}%", record.completion_percent())
                        } else {
                            "—".to_string()
                        };
                        let color = if record.has_achievements() {
                            completion_color(record.completion_ratio(), record.is_completed())
                        } else {
                            Color32::GRAY
                        };
                        ui.label(RichText::new(text).small().color(color));
                    });
                });
            }
        });

    if let Some(id) = clicked {
        platform.select(id);
    }
}
