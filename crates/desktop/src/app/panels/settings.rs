//! Settings window

use eframe::egui;
use egui_phosphor::regular;

use crate::app::PrettyAchievementsApp;
use crate::config::ImageQuality;

impl PrettyAchievementsApp {
    pub(crate) fn render_settings_window(&mut self, ctx: &egui::Context) {
        let mut show_settings = self.show_settings;

        egui::Window::new(format!("{} Settings", regular::GEAR))
            .open(&mut show_settings)
            .resizable(false)
            .collapsible(false)
            .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
            .min_width(420.0)
            .show(ctx, |ui| {
                ui.heading("Detection");
                ui.add_space(8.0);

                ui.horizontal(|ui| {
                    ui.label("API URL:");
                    ui.add(egui::TextEdit::singleline(&mut self.pending_api_url).desired_width(260.0));
                });

                let url_changed = self.pending_api_url.trim() != self.config.api_base_url;
                ui.horizontal(|ui| {
                    let apply = egui::Button::new(format!("{} Apply and rescan", regular::FLOPPY_DISK));
                    if ui.add_enabled(url_changed && !self.pending_api_url.trim().is_empty(), apply).clicked() {
                        let url = self.pending_api_url.trim().to_string();
                        self.change_api_url(url);
                    }
                    if url_changed {
                        ui.label(egui::RichText::new("(unsaved)").color(egui::Color32::YELLOW).small());
                    }
                });

                ui.add_space(12.0);
                ui.heading("Appearance");
                ui.add_space(8.0);

                let mut changed = ui.checkbox(&mut self.config.show_images, "Show game artwork").changed();

                ui.add_enabled_ui(self.config.show_images, |ui| {
                    ui.horizontal(|ui| {
                        ui.label("Artwork quality:");
                        egui::ComboBox::from_id_salt("image_quality")
                            .selected_text(quality_label(self.config.image_quality))
                            .show_ui(ui, |ui| {
                                for quality in [ImageQuality::Low, ImageQuality::Medium, ImageQuality::High] {
                                    changed |= ui
                                        .selectable_value(&mut self.config.image_quality, quality, quality_label(quality))
                                        .changed();
                                }
                            });
                    });
                });

                if changed {
                    if let Err(e) = self.config.save() {
                        tracing::warn!("Could not save config: {}", e);
                    }
                }
            });

        self.show_settings = show_settings;
    }
}

fn quality_label(quality: ImageQuality) -> &'static str {
    match quality {
        ImageQuality::Low => "Low (capsule)",
        ImageQuality::Medium => "Medium (header)",
        ImageQuality::High => "High (hero)",
    }
}
