//! Card grid for the main area

use egui::{RichText, Ui};
use egui_phosphor::regular;

use super::platform::SurfacePlatform;
use super::{completion_color, render_empty_state};
use crate::models::GameRecord;
use crate::render::RenderPlan;

const CARD_WIDTH: f32 = 230.0;
const IMAGE_HEIGHT: f32 = 107.0;

/// Render every record of `plan` as a card; never filtered by search
pub fn render_grid<P: SurfacePlatform>(ui: &mut Ui, platform: &mut P, plan: &RenderPlan) {
    if let Some(state) = plan.grid_empty {
        render_empty_state(ui, state);
        return;
    }

    let mut clicked = None;
    egui::ScrollArea::vertical()
        .id_salt("games_grid")
        .auto_shrink([false, false])
        .show(ui, |ui| {
            ui.horizontal_wrapped(|ui| {
                ui.spacing_mut().item_spacing = egui::vec2(12.0, 12.0);
                for record in &plan.grid {
                    if render_card(ui, platform, record) {
                        clicked = Some(record.id.clone());
                    }
                }
            });
        });

    if let Some(id) = clicked {
        platform.select(id);
    }
}

/// One game card. Returns true when clicked.
fn render_card<P: SurfacePlatform>(ui: &mut Ui, platform: &P, record: &GameRecord) -> bool {
    let is_selected = platform.selected() == Some(&record.id);
    let mut frame = egui::Frame::group(ui.style());
    if is_selected {
        frame = frame.stroke(ui.visuals().selection.stroke);
    }

    let response = frame
        .show(ui, |ui| {
            ui.set_width(CARD_WIDTH);
            ui.vertical(|ui| {
                if let Some(source) = platform.image_source(&record.id) {
                    ui.add(
                        egui::Image::new(source)
                            .fit_to_exact_size(egui::vec2(CARD_WIDTH, IMAGE_HEIGHT))
                            .corner_radius(4.0),
                    );
                }

                ui.horizontal(|ui| {
                    if record.is_completed() {
                        ui.label(RichText::new(regular::TROPHY).color(completion_color(1.0, true)));
                    }
                    ui.label(RichText::new(&record.name).strong());
                });

                if record.has_achievements() {
                    ui.label(format!("{} achievements", record.achievements_display()));
                    let ratio = record.completion_ratio() as f32;
                    ui.add(
                        egui::ProgressBar::new(ratio)
                            .desired_width(CARD_WIDTH)
                            .fill(completion_color(record.completion_ratio(), record.is_completed()))
                            .text(format!("{}%", record.completion_percent())),
                    );
                } else {
                    ui.label(RichText::new("No achievement data").weak());
                }
            });
        })
        .response
        .interact(egui::Sense::click());

    response.on_hover_text(format!("App ID {}", record.id)).clicked()
}
