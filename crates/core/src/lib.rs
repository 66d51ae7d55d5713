//! Detected-game state reconciliation and rendering pipeline
//!
//! Raw detection results (pushed or fetched) are normalized, reconciled into a
//! `DetectionState` that never regresses to empty, sorted and filtered, and
//! planned for the sidebar and grid surfaces.

pub mod detection;
pub mod error;
pub mod models;
pub mod normalizer;
pub mod render;
pub mod scan;
pub mod view;

#[cfg(feature = "ui")]
pub mod ui;

pub use detection::DetectionState;
pub use error::FetchError;
pub use models::{DetectionResultSet, GameId, GameRecord};
pub use normalizer::{denormalize, normalize, normalize_all, FieldAliases, FIELD_ALIASES};
pub use render::{plan, DualSurfaceRenderer, EmptyState, RenderPlan, SettleGate, DEFAULT_SETTLE_DELAY};
pub use scan::{
    estimate_progress, DetectionSource, PushSender, ScanEvent, ScanOrchestrator, ScanSession,
    ScanSettings, ScanStatus,
};
pub use view::{next_mode, sort_records, summarize, view, SortMode, Summary};
