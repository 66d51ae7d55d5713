//! Central panel - game card grid

use eframe::egui;
use pretty_achievements_core::ui::{render_grid, render_loading};
use std::time::Instant;

use crate::app::{PrettyAchievementsApp, Surfaces};

impl PrettyAchievementsApp {
    pub(crate) fn render_grid_panel(&mut self, ctx: &egui::Context, now: Instant) {
        let loading = self.is_loading(now);

        egui::CentralPanel::default().show(ctx, |ui| {
            if loading {
                render_loading(ui);
                return;
            }

            let mut surfaces = Surfaces {
                selected: &mut self.selected,
                config: &self.config,
            };
            render_grid(ui, &mut surfaces, self.renderer.plan());
        });
    }
}
