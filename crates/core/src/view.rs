//! Sorting, filtering and aggregate stats over game records
//!
//! Names compare by their lowercase form. Exact case only matters as the last
//! tie-break, which puts "Alpha" before "alpha".

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

use crate::models::GameRecord;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SortMode {
    #[default]
    CompletionDesc,
    CompletionAsc,
    AlphaAsc,
    AlphaDesc,
}

impl SortMode {
    pub const CYCLE: [SortMode; 4] = [
        SortMode::CompletionDesc,
        SortMode::CompletionAsc,
        SortMode::AlphaAsc,
        SortMode::AlphaDesc,
    ];

    /// Next mode in the fixed cycle, wrapping around
    pub fn next(&self) -> Self {
        let idx = Self::CYCLE.iter().position(|m| m == self).unwrap_or(0);
        Self::CYCLE[(idx + 1) % Self::CYCLE.len()]
    }

    pub fn label(&self) -> &'static str {
        match self {
            SortMode::CompletionDesc => "Completion ↓",
            SortMode::CompletionAsc => "Completion ↑",
            SortMode::AlphaAsc => "Name A-Z",
            SortMode::AlphaDesc => "Name Z-A",
        }
    }
}

/// Free-function form of `SortMode::next`
pub fn next_mode(current: SortMode) -> SortMode {
    current.next()
}

/// Filter by name (case-insensitive substring), then sort by `mode`
///
/// A missing or blank filter keeps every record.
pub fn view(records: &[GameRecord], mode: SortMode, filter_text: Option<&str>) -> Vec<GameRecord> {
    let needle = filter_text
        .map(|f| f.trim().to_lowercase())
        .filter(|f| !f.is_empty());

    let mut out: Vec<GameRecord> = records
        .iter()
        .filter(|r| match &needle {
            Some(needle) => r.name.to_lowercase().contains(needle.as_str()),
            None => true,
        })
        .cloned()
        .collect();

    sort_records(&mut out, mode);
    out
}

/// Sort in place; ties always fall back to name ascending
pub fn sort_records(records: &mut [GameRecord], mode: SortMode) {
    records.sort_by(|a, b| compare(a, b, mode));
}

fn compare(a: &GameRecord, b: &GameRecord, mode: SortMode) -> Ordering {
    let primary = match mode {
        SortMode::CompletionDesc => b.completion_ratio().total_cmp(&a.completion_ratio()),
        SortMode::CompletionAsc => a.completion_ratio().total_cmp(&b.completion_ratio()),
        SortMode::AlphaAsc => fold(&a.name).cmp(&fold(&b.name)),
        SortMode::AlphaDesc => fold(&b.name).cmp(&fold(&a.name)),
    };
    primary.then_with(|| name_ascending(a, b))
}

fn name_ascending(a: &GameRecord, b: &GameRecord) -> Ordering {
    fold(&a.name)
        .cmp(&fold(&b.name))
        .then_with(|| a.name.cmp(&b.name))
        .then_with(|| a.id.cmp(&b.id))
}

fn fold(name: &str) -> String {
    name.to_lowercase()
}

/// Aggregate numbers for the dashboard line
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Summary {
    pub games: usize,
    pub games_with_achievements: usize,
    pub completed_games: usize,
    pub total_achievements: u64,
    pub unlocked_achievements: u64,
    /// Mean completion (0-100) over games that have achievements
    pub average_completion: f64,
}

impl Summary {
    /// Overall unlocked / total, as a percent
    pub fn overall_percent(&self) -> f64 {
        if self.total_achievements > 0 {
            self.unlocked_achievements as f64 / self.total_achievements as f64 * 100.0
        } else {
            0.0
        }
    }
}

pub fn summarize(records: &[GameRecord]) -> Summary {
    let with_ach: Vec<&GameRecord> = records.iter().filter(|r| r.has_achievements()).collect();

    let average_completion = if with_ach.is_empty() {
        0.0
    } else {
        with_ach.iter().map(|r| r.completion_ratio() * 100.0).sum::<f64>() / with_ach.len() as f64
    };

    Summary {
        games: records.len(),
        games_with_achievements: with_ach.len(),
        completed_games: with_ach.iter().filter(|r| r.is_completed()).count(),
        total_achievements: with_ach.iter().map(|r| r.total_achievements as u64).sum(),
        unlocked_achievements: with_ach.iter().map(|r| r.unlocked_achievements as u64).sum(),
        average_completion,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::GameId;

    fn rec(id: u64, name: &str, total: u32, unlocked: u32) -> GameRecord {
        GameRecord {
            id: GameId::Numeric(id),
            name: name.to_string(),
            total_achievements: total,
            unlocked_achievements: unlocked,
        }
    }

    fn names(records: &[GameRecord]) -> Vec<&str> {
        records.iter().map(|r| r.name.as_str()).collect()
    }

    #[test]
    fn test_cycle_wraps() {
        assert_eq!(SortMode::CompletionDesc.next(), SortMode::CompletionAsc);
        assert_eq!(SortMode::CompletionAsc.next(), SortMode::AlphaAsc);
        assert_eq!(SortMode::AlphaAsc.next(), SortMode::AlphaDesc);
        assert_eq!(next_mode(SortMode::AlphaDesc), SortMode::CompletionDesc);
        assert_eq!(SortMode::default(), SortMode::CompletionDesc);
    }

    #[test]
    fn test_sort_mode_serde_names() {
        assert_eq!(serde_json::to_string(&SortMode::CompletionDesc).unwrap(), "\"completion-desc\"");
        let mode: SortMode = serde_json::from_str("\"alpha-desc\"").unwrap();
        assert_eq!(mode, SortMode::AlphaDesc);
    }

    #[test]
    fn test_completion_modes() {
        let records = vec![rec(1, "Half", 10, 5), rec(2, "Full", 4, 4), rec(3, "None", 0, 0)];
        assert_eq!(names(&view(&records, SortMode::CompletionDesc, None)), vec!["Full", "Half", "None"]);
        assert_eq!(names(&view(&records, SortMode::CompletionAsc, None)), vec!["None", "Half", "Full"]);
    }

    #[test]
    fn test_equal_ratio_ties_break_by_name_in_every_mode() {
        let records = vec![rec(1, "zeta", 10, 5), rec(2, "Alpha", 2, 1), rec(3, "mid", 4, 2)];
        for mode in [SortMode::CompletionDesc, SortMode::CompletionAsc] {
            assert_eq!(names(&view(&records, mode, None)), vec!["Alpha", "mid", "zeta"], "{:?}", mode);
        }
    }

    #[test]
    fn test_alpha_modes_fold_case() {
        let records = vec![rec(1, "Alpha", 0, 0), rec(2, "Beta", 0, 0), rec(3, "alpha", 0, 0)];
        assert_eq!(names(&view(&records, SortMode::AlphaAsc, None)), vec!["Alpha", "alpha", "Beta"]);
        // Reversal applies to the folded name only; case ties stay ascending
        assert_eq!(names(&view(&records, SortMode::AlphaDesc, None)), vec!["Beta", "Alpha", "alpha"]);
    }

    #[test]
    fn test_identical_names_order_by_id() {
        let records = vec![rec(9, "Same", 1, 1), rec(3, "Same", 1, 1)];
        let sorted = view(&records, SortMode::CompletionDesc, None);
        assert_eq!(sorted[0].id, GameId::Numeric(3));
        assert_eq!(sorted[1].id, GameId::Numeric(9));
    }

    #[test]
    fn test_filter_is_case_insensitive_substring() {
        let records = vec![rec(1, "The Witcher 3", 78, 62), rec(2, "Cyberpunk 2077", 44, 31), rec(3, "Witchfire", 0, 0)];
        assert_eq!(names(&view(&records, SortMode::AlphaAsc, Some("WITCH"))), vec!["The Witcher 3", "Witchfire"]);
        assert_eq!(view(&records, SortMode::AlphaAsc, Some("")).len(), 3);
        assert_eq!(view(&records, SortMode::AlphaAsc, Some("   ")).len(), 3);
        assert!(view(&records, SortMode::AlphaAsc, Some("zelda")).is_empty());
    }

    #[test]
    fn test_view_is_deterministic_for_shuffled_input() {
        let a = vec![rec(1, "b", 2, 1), rec(2, "B", 2, 1), rec(3, "a", 0, 0)];
        let b = vec![a[2].clone(), a[0].clone(), a[1].clone()];
        for mode in SortMode::CYCLE {
            assert_eq!(view(&a, mode, None), view(&b, mode, None));
        }
    }

    #[test]
    fn test_summarize() {
        let records = vec![rec(1, "A", 10, 10), rec(2, "B", 10, 0), rec(3, "C", 0, 0)];
        let summary = summarize(&records);
        assert_eq!(summary.games, 3);
        assert_eq!(summary.games_with_achievements, 2);
        assert_eq!(summary.completed_games, 1);
        assert_eq!(summary.total_achievements, 20);
        assert_eq!(summary.unlocked_achievements, 10);
        assert!((summary.average_completion - 50.0).abs() < 1e-9);
        assert!((summary.overall_percent() - 50.0).abs() < 1e-9);

        assert_eq!(summarize(&[]), Summary::default());
    }
}
