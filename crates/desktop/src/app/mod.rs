//! Main application module

mod panels;
mod scan;

use crate::config::Config;
use crate::detection_api::HttpDetectionSource;
use crate::push::PushFileWatcher;
use pretty_achievements_core::ui::SurfacePlatform;
use pretty_achievements_core::{
    DetectionResultSet, DetectionSource, DualSurfaceRenderer, FetchError, GameId, ScanOrchestrator,
    ScanSettings, SortMode,
};

use eframe::egui;
use std::sync::Arc;
use std::time::Instant;

pub struct PrettyAchievementsApp {
    pub(crate) config: Config,
    pub(crate) orchestrator: ScanOrchestrator,
    pub(crate) renderer: DualSurfaceRenderer,
    pub(crate) sort_mode: SortMode,
    // Sidebar search, not persisted
    pub(crate) search: String,
    pub(crate) selected: Option<GameId>,
    pub(crate) status: String,
    pub(crate) started_at: Instant,
    // Fallback scan if no push arrives within `startup_scan_delay`
    pub(crate) startup_scan_pending: bool,
    pub(crate) push_watcher: Option<PushFileWatcher>,
    pub(crate) show_settings: bool,
    // Edited in settings, applied on demand
    pub(crate) pending_api_url: String,
}

impl PrettyAchievementsApp {
    pub fn new(ctx: &egui::Context, config: Config) -> Self {
        let source = detection_source(&config);
        let settings = ScanSettings {
            retry_backoff: config.retry_backoff(),
            ..ScanSettings::default()
        };
        let orchestrator = ScanOrchestrator::new(source, settings);

        let push_watcher = config.push_file.clone().and_then(|path| {
            let ctx = ctx.clone();
            match PushFileWatcher::start(path, orchestrator.pusher(), move || ctx.request_repaint()) {
                Ok(watcher) => Some(watcher),
                Err(e) => {
                    tracing::warn!("Push file disabled: {}", e);
                    None
                }
            }
        });

        Self {
            renderer: DualSurfaceRenderer::new(config.settle_delay()),
            sort_mode: config.sort_mode,
            config,
            orchestrator,
            search: String::new(),
            selected: None,
            status: "Waiting for game detection...".to_string(),
            started_at: Instant::now(),
            startup_scan_pending: true,
            push_watcher,
            show_settings: false,
            pending_api_url: String::new(),
        }
    }

    /// Point scans at a new companion URL and rescan right away
    pub(crate) fn change_api_url(&mut self, url: String) {
        tracing::info!("Detection API changed to {}", url);
        self.config.api_base_url = url;
        if let Err(e) = self.config.save() {
            tracing::warn!("Could not save config: {}", e);
        }
        self.orchestrator.set_source(detection_source(&self.config));
        self.startup_scan_pending = false;
        self.orchestrator.restart_scan();
    }

    pub(crate) fn cycle_sort_mode(&mut self) {
        self.sort_mode = self.sort_mode.next();
        self.config.sort_mode = self.sort_mode;
        if let Err(e) = self.config.save() {
            tracing::warn!("Could not save config: {}", e);
        }
    }

    pub(crate) fn is_loading(&self, now: Instant) -> bool {
        let scanning = self.orchestrator.is_running() || self.startup_scan_pending;
        self.renderer.is_loading(now, scanning)
    }
}

fn detection_source(config: &Config) -> Arc<dyn DetectionSource> {
    match HttpDetectionSource::new(&config.api_base_url, config.request_timeout()) {
        Ok(source) => {
            tracing::info!("Detection API at {}", source.url());
            Arc::new(source)
        }
        Err(e) => {
            tracing::warn!("{}", e);
            Arc::new(move || -> Result<DetectionResultSet, FetchError> {
                Err(FetchError::Unavailable(e.clone()))
            })
        }
    }
}

/// Host side of the shared surfaces: selection and card artwork
pub(crate) struct Surfaces<'a> {
    pub(crate) selected: &'a mut Option<GameId>,
    pub(crate) config: &'a Config,
}

impl SurfacePlatform for Surfaces<'_> {
    fn selected(&self) -> Option<&GameId> {
        self.selected.as_ref()
    }

    fn select(&mut self, id: GameId) {
        *self.selected = Some(id);
    }

    fn image_source(&self, id: &GameId) -> Option<egui::ImageSource<'static>> {
        if !self.config.show_images {
            return None;
        }
        id.as_u64().map(|appid| self.config.image_url(appid).into())
    }
}

impl eframe::App for PrettyAchievementsApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let now = Instant::now();
        self.check_scan(now);
        self.check_startup_scan(now);
        self.renderer
            .refresh(self.orchestrator.state(), self.sort_mode, &self.search, now);
        self.drop_stale_selection();

        // Request repaint while scanning or while something is due
        if self.orchestrator.is_running() {
            ctx.request_repaint();
        } else if self.startup_scan_pending {
            let due = self.started_at + self.config.startup_scan_delay();
            ctx.request_repaint_after(due.saturating_duration_since(now));
        }
        if let Some(remaining) = self.renderer.settle_gate().remaining(now) {
            ctx.request_repaint_after(remaining);
        }

        // Track window state for persistence (only when not maximized to preserve restore size)
        ctx.input(|i| {
            let maximized = i.viewport().maximized.unwrap_or(false);
            self.config.window_maximized = maximized;

            if !maximized {
                if let Some(rect) = i.viewport().inner_rect {
                    self.config.window_x = Some(rect.min.x);
                    self.config.window_y = Some((rect.min.y - 30.0).max(0.0));
                    self.config.window_width = Some(rect.width());
                    self.config.window_height = Some(rect.height());
                }
            }
        });

        self.render_top_panel(ctx, now);
        self.render_sidebar_panel(ctx, now);
        self.render_details_panel(ctx);
        self.render_grid_panel(ctx, now);
        self.render_settings_window(ctx);
    }

    fn on_exit(&mut self, _gl: Option<&eframe::glow::Context>) {
        if let Err(e) = self.config.save() {
            tracing::warn!("Could not save config on exit: {}", e);
        }
    }
}
