//! Detection state store with no-regression-to-empty semantics

use crate::models::{DetectionResultSet, GameRecord};
use crate::normalizer::normalize_all;

/// Current and last non-empty detection results for the session
///
/// `apply` is the only writer. Readers get the effective set: the latest
/// result if it has entries, otherwise the last result that had any.
#[derive(Debug, Default)]
pub struct DetectionState {
    current: DetectionResultSet,
    last_non_empty: Option<DetectionResultSet>,
    generation: u64,
}

impl DetectionState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a freshly received result set
    pub fn apply(&mut self, incoming: DetectionResultSet) {
        if !incoming.is_empty() {
            self.last_non_empty = Some(incoming.clone());
        } else if self.last_non_empty.is_some() {
            tracing::debug!("Empty detection result, keeping last known games");
        }
        self.current = incoming;
        self.generation += 1;
    }

    /// The set renderers should show
    pub fn effective(&self) -> &DetectionResultSet {
        if !self.current.is_empty() {
            return &self.current;
        }
        match &self.last_non_empty {
            Some(set) => set,
            None => &self.current,
        }
    }

    /// Effective set as canonical records
    pub fn as_records(&self) -> Vec<GameRecord> {
        normalize_all(self.effective())
    }

    /// Latest result as received, possibly empty
    pub fn current(&self) -> &DetectionResultSet {
        &self.current
    }

    pub fn last_non_empty(&self) -> Option<&DetectionResultSet> {
        self.last_non_empty.as_ref()
    }

    /// Whether any non-empty result has been seen this session
    pub fn has_ever_had_data(&self) -> bool {
        self.last_non_empty.is_some()
    }

    /// Bumped on every `apply`; renderers re-plan when it changes
    pub fn generation(&self) -> u64 {
        self.generation
    }
}
