//! Right panel - details of the selected game

use egui::{Color32, RichText};
use egui_phosphor::regular;
use pretty_achievements_core::ui::completion_color;

use crate::app::PrettyAchievementsApp;

impl PrettyAchievementsApp {
    pub(crate) fn render_details_panel(&mut self, ctx: &egui::Context) {
        let Some(id) = self.selected.clone() else {
            return;
        };
        let Some(record) = self.renderer.plan().grid.iter().find(|r| r.id == id).cloned() else {
            return;
        };

        let mut close = false;
        egui::SidePanel::right("details_panel")
            .min_width(260.0)
            .show(ctx, |ui| {
                ui.horizontal(|ui| {
                    ui.heading(&record.name);
                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        if ui.small_button(regular::X).clicked() {
                            close = true;
                        }
                    });
                });
                ui.separator();

                if self.config.show_images {
                    if let Some(appid) = record.id.as_u64() {
                        ui.add(
                            egui::Image::new(self.config.image_url(appid))
                                .max_width(ui.available_width())
                                .corner_radius(4.0),
                        );
                        ui.add_space(8.0);
                    }
                }

                egui::Grid::new("details_grid").num_columns(2).spacing([12.0, 6.0]).show(ui, |ui| {
                    ui.label("App ID");
                    ui.label(record.id.to_string());
                    ui.end_row();

                    ui.label("Achievements");
                    ui.label(record.achievements_display());
                    ui.end_row();

                    ui.label("Completion");
                    if record.has_achievements() {
                        ui.label(
                            RichText::new(format!("{}%", record.completion_percent()))
                                .color(completion_color(record.completion_ratio(), record.is_completed())),
                        );
                    } else {
                        ui.label(RichText::new("Unknown").color(Color32::GRAY));
                    }
                    ui.end_row();
                });

                if record.is_completed() {
                    ui.add_space(8.0);
                    ui.label(
                        RichText::new(format!("{} All achievements unlocked", regular::TROPHY))
                            .strong()
                            .color(completion_color(1.0, true)),
                    );
                }
            });

        if close {
            self.selected = None;
        }
    }
}
