//! Scan lifecycle handling on the UI thread

use std::time::Instant;

use pretty_achievements_core::{ScanEvent, ScanSession};

use crate::app::PrettyAchievementsApp;

impl PrettyAchievementsApp {
    /// Drain orchestrator events and update the status line
    pub(crate) fn check_scan(&mut self, now: Instant) {
        for event in self.orchestrator.poll(now) {
            match event {
                ScanEvent::Started { sequence } => {
                    self.status = format!("Scanning for games (#{})...", sequence);
                }
                ScanEvent::Progress(_) => {}
                ScanEvent::Finished { result_is_empty, .. } => {
                    self.status = self.result_status(result_is_empty);
                }
                ScanEvent::PushApplied { result_is_empty } => {
                    if self.startup_scan_pending {
                        tracing::info!("Detection push received, skipping startup scan");
                        self.startup_scan_pending = false;
                    }
                    if !self.orchestrator.is_running() {
                        self.status = self.result_status(result_is_empty);
                    }
                }
            }
        }
    }

    /// Scan once if nothing was pushed during the startup window
    pub(crate) fn check_startup_scan(&mut self, now: Instant) {
        if !self.startup_scan_pending {
            return;
        }
        if now.saturating_duration_since(self.started_at) < self.config.startup_scan_delay() {
            return;
        }
        self.startup_scan_pending = false;
        tracing::info!("No detection push received, scanning");
        self.orchestrator.request_scan();
    }

    /// Manual scan from the toolbar
    pub(crate) fn request_scan(&mut self) {
        self.startup_scan_pending = false;
        self.orchestrator.request_scan();
        if self.orchestrator.rescan_pending() {
            self.status = "Scan queued".to_string();
        }
    }

    /// Hover text for the status line: when the last scan finished and what it found
    pub(crate) fn last_scan_text(&self) -> String {
        match self.orchestrator.last_completed() {
            Some(session) => describe_session(session),
            None => "No scan has completed yet".to_string(),
        }
    }

    fn result_status(&self, result_is_empty: bool) -> String {
        let state = self.orchestrator.state();
        if !result_is_empty {
            format!("Found {} games", state.effective().len())
        } else if state.has_ever_had_data() {
            "Nothing detected, showing last known games".to_string()
        } else {
            "No games detected".to_string()
        }
    }

    /// Clear the selection if its game is no longer shown
    pub(crate) fn drop_stale_selection(&mut self) {
        if let Some(id) = &self.selected {
            if !self.renderer.plan().grid.iter().any(|r| &r.id == id) {
                self.selected = None;
            }
        }
    }
}

fn describe_session(session: &ScanSession) -> String {
    let when = session
        .finished_at
        .map(|t| t.with_timezone(&chrono::Local).format("%H:%M:%S").to_string())
        .unwrap_or_else(|| "-".to_string());
    format!(
        "Last scan #{} at {} found {} games",
        session.sequence,
        when,
        session.games_found.unwrap_or(0)
    )
}
