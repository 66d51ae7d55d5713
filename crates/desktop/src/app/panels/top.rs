//! Top toolbar panel - scan and sort buttons, progress and summary

use egui::{Color32, RichText};
use egui_phosphor::regular;
use std::time::Instant;

use crate::app::PrettyAchievementsApp;

impl PrettyAchievementsApp {
    pub(crate) fn render_top_panel(&mut self, ctx: &egui::Context, now: Instant) {
        let is_scanning = self.orchestrator.is_running();

        egui::TopBottomPanel::top("top_panel").show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.heading("Pretty Achievements");
                ui.separator();

                let scan_response = ui.button(format!("{} Scan", regular::ARROWS_CLOCKWISE));
                if is_scanning {
                    scan_response
                        .clone()
                        .on_hover_text("A scan is running; clicking queues one more");
                }
                if scan_response.clicked() {
                    self.request_scan();
                }

                let sort_label = format!("{} {}", regular::SORT_ASCENDING, self.sort_mode.label());
                if ui.button(sort_label).on_hover_text("Cycle sort mode").clicked() {
                    self.cycle_sort_mode();
                }

                if is_scanning {
                    ui.add(
                        egui::ProgressBar::new(self.orchestrator.progress(now))
                            .desired_width(150.0)
                            .animate(true),
                    );
                }
                ui.label(&self.status).on_hover_text(self.last_scan_text());

                if let Some(watcher) = &self.push_watcher {
                    ui.label(RichText::new(regular::EYE).color(Color32::GRAY))
                        .on_hover_text(format!("Watching {}", watcher.path().display()));
                }

                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    if ui.button(regular::GEAR).on_hover_text("Settings").clicked() {
                        self.pending_api_url = self.config.api_base_url.clone();
                        self.show_settings = true;
                    }

                    let summary = &self.renderer.plan().summary;
                    if summary.games > 0 {
                        ui.label(format!(
                            "{} {} / {} achievements ({:.1}%)",
                            regular::TROPHY,
                            summary.unlocked_achievements,
                            summary.total_achievements,
                            summary.overall_percent()
                        ))
                        .on_hover_text(format!(
                            "{} games, {} with achievements, {} completed\nAverage completion {:.1}%",
                            summary.games,
                            summary.games_with_achievements,
                            summary.completed_games,
                            summary.average_completion
                        ));
                    }
                });
            });
        });
    }
}
