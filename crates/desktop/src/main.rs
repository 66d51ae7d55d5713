// Hide console window on Windows in release builds
#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

mod app;
mod config;
mod detection_api;
mod push;

use app::PrettyAchievementsApp;
use eframe::egui;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn main() -> eframe::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "pretty_achievements_core=info,pretty_achievements_desktop=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load config to get saved window state
    let config = config::Config::load();

    let mut viewport = egui::ViewportBuilder::default()
        .with_title("Pretty Achievements")
        .with_inner_size([
            config.window_width.unwrap_or(1100.0),
            config.window_height.unwrap_or(720.0),
        ]);

    if let (Some(x), Some(y)) = (config.window_x, config.window_y) {
        viewport = viewport.with_position([x, y]);
    }

    if config.window_maximized {
        viewport = viewport.with_maximized(true);
    }

    let options = eframe::NativeOptions {
        viewport,
        ..Default::default()
    };

    eframe::run_native(
        "Pretty Achievements",
        options,
        Box::new(move |cc| {
            egui_extras::install_image_loaders(&cc.egui_ctx);

            let mut fonts = egui::FontDefinitions::default();
            egui_phosphor::add_to_fonts(&mut fonts, egui_phosphor::Variant::Regular);
            cc.egui_ctx.set_fonts(fonts);

            Ok(Box::new(PrettyAchievementsApp::new(&cc.egui_ctx, config)))
        }),
    )
}
