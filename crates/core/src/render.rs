//! Render planning for the two game surfaces
//!
//! The sidebar list and the main grid are drawn from one `RenderPlan`, so
//! they always agree on sort mode and record set. Only the sidebar honours
//! the search text.

use std::time::{Duration, Instant};

use crate::detection::DetectionState;
use crate::models::GameRecord;
use crate::view::{sort_records, summarize, view, SortMode, Summary};

/// Default time the loading indicator stays up after the first results arrive
pub const DEFAULT_SETTLE_DELAY: Duration = Duration::from_millis(150);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmptyState {
    /// Nothing detected this session
    NoGamesDetected,
    /// Games exist but the search matches none of them
    NoSearchMatches,
}

impl EmptyState {
    pub fn message(&self) -> &'static str {
        match self {
            EmptyState::NoGamesDetected => "No games with achievements detected",
            EmptyState::NoSearchMatches => "No matching games",
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct RenderPlan {
    pub sort_mode: SortMode,
    pub sidebar: Vec<GameRecord>,
    pub grid: Vec<GameRecord>,
    pub sidebar_empty: Option<EmptyState>,
    pub grid_empty: Option<EmptyState>,
    pub summary: Summary,
    /// Store generation the plan was built from
    pub generation: u64,
}

/// Build both surfaces from the store's effective set
pub fn plan(state: &DetectionState, mode: SortMode, search: &str) -> RenderPlan {
    let records = state.as_records();

    let mut grid = records.clone();
    sort_records(&mut grid, mode);
    let sidebar = view(&records, mode, Some(search));

    let grid_empty = grid.is_empty().then_some(EmptyState::NoGamesDetected);
    let sidebar_empty = if grid.is_empty() {
        Some(EmptyState::NoGamesDetected)
    } else if sidebar.is_empty() {
        Some(EmptyState::NoSearchMatches)
    } else {
        None
    };

    RenderPlan {
        sort_mode: mode,
        summary: summarize(&records),
        sidebar,
        grid,
        sidebar_empty,
        grid_empty,
        generation: state.generation(),
    }
}

/// Holds the loading indicator for a short delay once content is ready
#[derive(Debug, Clone)]
pub struct SettleGate {
    delay: Duration,
    ready_at: Option<Instant>,
}

impl SettleGate {
    pub fn new(delay: Duration) -> Self {
        Self { delay, ready_at: None }
    }

    /// Start the delay; later calls do not move the deadline
    pub fn arm(&mut self, now: Instant) {
        if self.ready_at.is_none() {
            self.ready_at = Some(now + self.delay);
        }
    }

    pub fn is_armed(&self) -> bool {
        self.ready_at.is_some()
    }

    /// True when never armed or when the delay has elapsed
    pub fn is_settled(&self, now: Instant) -> bool {
        self.ready_at.map_or(true, |t| now >= t)
    }

    /// Time left until settled, for scheduling a repaint
    pub fn remaining(&self, now: Instant) -> Option<Duration> {
        self.ready_at
            .map(|t| t.saturating_duration_since(now))
            .filter(|d| !d.is_zero())
    }
}

impl Default for SettleGate {
    fn default() -> Self {
        Self::new(DEFAULT_SETTLE_DELAY)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct PlanKey {
    generation: u64,
    sort_mode: SortMode,
    search: String,
}

/// Cached plan shared by the sidebar and grid painters
#[derive(Debug, Default)]
pub struct DualSurfaceRenderer {
    plan: RenderPlan,
    key: Option<PlanKey>,
    settle: SettleGate,
}

impl DualSurfaceRenderer {
    pub fn new(settle_delay: Duration) -> Self {
        Self {
            plan: RenderPlan::default(),
            key: None,
            settle: SettleGate::new(settle_delay),
        }
    }

    /// Re-plan when the store, sort mode or search changed since the last
    /// call. Returns true if a new plan was built.
    pub fn refresh(&mut self, state: &DetectionState, mode: SortMode, search: &str, now: Instant) -> bool {
        let key = PlanKey {
            generation: state.generation(),
            sort_mode: mode,
            search: search.to_string(),
        };
        if self.key.as_ref() == Some(&key) {
            return false;
        }

        self.plan = plan(state, mode, search);
        self.key = Some(key);
        if !self.plan.grid.is_empty() {
            self.settle.arm(now);
        }
        tracing::debug!(
            "Re-planned surfaces: {} in grid, {} in sidebar ({:?})",
            self.plan.grid.len(),
            self.plan.sidebar.len(),
            mode
        );
        true
    }

    pub fn plan(&self) -> &RenderPlan {
        &self.plan
    }

    /// Whether surfaces should show the loading indicator instead of content
    pub fn is_loading(&self, now: Instant, scanning: bool) -> bool {
        if self.plan.grid.is_empty() {
            scanning
        } else {
            !self.settle.is_settled(now)
        }
    }

    pub fn settle_gate(&self) -> &SettleGate {
        &self.settle
    }
}
