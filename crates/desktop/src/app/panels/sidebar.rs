//! Left panel - search box and compact game list

use eframe::egui;
use egui_phosphor::regular;
use pretty_achievements_core::ui::{render_loading, render_sidebar};
use std::time::Instant;

use crate::app::{PrettyAchievementsApp, Surfaces};

impl PrettyAchievementsApp {
    pub(crate) fn render_sidebar_panel(&mut self, ctx: &egui::Context, now: Instant) {
        let loading = self.is_loading(now);

        egui::SidePanel::left("games_sidebar")
            .resizable(true)
            .default_width(260.0)
            .min_width(200.0)
            .show(ctx, |ui| {
                ui.add_space(4.0);
                ui.horizontal(|ui| {
                    ui.label(regular::MAGNIFYING_GLASS);
                    ui.add(
                        egui::TextEdit::singleline(&mut self.search)
                            .hint_text("Search games")
                            .desired_width(ui.available_width() - 28.0),
                    );
                    if !self.search.is_empty() && ui.small_button(regular::X).clicked() {
                        self.search.clear();
                    }
                });
                ui.separator();

                if loading {
                    render_loading(ui);
                    return;
                }

                let mut surfaces = Surfaces {
                    selected: &mut self.selected,
                    config: &self.config,
                };
                render_sidebar(ui, &mut surfaces, self.renderer.plan());
            });
    }
}
