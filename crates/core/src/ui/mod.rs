//! Shared egui surfaces: the compact sidebar list and the card grid
//!
//! Both painters read the same `RenderPlan`. Selection and image loading are
//! left to the host through `SurfacePlatform`.

mod platform;
mod sidebar;
mod grid;

pub use platform::SurfacePlatform;
pub use sidebar::render_sidebar;
pub use grid::render_grid;

use egui::{Color32, RichText, Ui};
use egui_phosphor::regular;

use crate::render::EmptyState;

/// Accent colour for a completion ratio (grey, amber, green, gold)
pub fn completion_color(ratio: f64, completed: bool) -> Color32 {
    if completed {
        Color32::from_rgb(255, 215, 0)
    } else if ratio >= 0.5 {
        Color32::from_rgb(100, 200, 100)
    } else if ratio > 0.0 {
        Color32::from_rgb(230, 160, 60)
    } else {
        Color32::GRAY
    }
}

/// Centered placeholder shown instead of a surface's content
pub fn render_empty_state(ui: &mut Ui, state: EmptyState) {
    let icon = match state {
        EmptyState::NoGamesDetected => regular::GAME_CONTROLLER,
        EmptyState::NoSearchMatches => regular::MAGNIFYING_GLASS,
    };
    ui.vertical_centered(|ui| {
        ui.add_space(24.0);
        ui.label(RichText::new(icon).size(32.0).color(Color32::GRAY));
        ui.add_space(4.0);
        ui.label(RichText::new(state.message()).color(Color32::GRAY));
    });
}

pub fn render_loading(ui: &mut Ui) {
    ui.vertical_centered(|ui| {
        ui.add_space(24.0);
        ui.spinner();
        ui.label(RichText::new("Detecting games...").color(Color32::GRAY));
    });
}
