//! Raw detection entry -> canonical `GameRecord`
//!
//! Upstream producers disagree on field names, so every logical field has an
//! ordered list of accepted aliases. The first alias present with a usable
//! value wins.

use serde_json::{Map, Value};

use crate::models::{DetectionResultSet, GameId, GameRecord};

/// Accepted field names per logical field, in priority order
pub struct FieldAliases {
    pub name: &'static [&'static str],
    pub total: &'static [&'static str],
    pub unlocked: &'static [&'static str],
}

pub const FIELD_ALIASES: FieldAliases = FieldAliases {
    name: &["name", "title"],
    total: &["achievements", "totalAchievements", "total_obtenable_achievements"],
    unlocked: &[
        "unlocked",
        "unlockedAchievements",
        "achievementsUnlocked",
        "local_achievements_count",
    ],
};

/// Normalize one raw entry of a detection result set
///
/// Never fails: unexpected types fall back to the placeholder name and zero
/// counts.
pub fn normalize(raw: &Value, key: &str) -> GameRecord {
    let id = GameId::from_key(key);

    let (name, total, unlocked) = match raw {
        Value::String(s) => (non_blank(s), 0, 0),
        Value::Object(obj) => (
            first_name(obj, FIELD_ALIASES.name),
            first_count(obj, FIELD_ALIASES.total),
            first_count(obj, FIELD_ALIASES.unlocked),
        ),
        _ => (None, 0, 0),
    };

    let unlocked = if total > 0 && unlocked > total {
        tracing::debug!(
            "Clamping unlocked count for {}: {} > total {}",
            id,
            unlocked,
            total
        );
        total
    } else {
        unlocked
    };

    GameRecord {
        name: name.unwrap_or_else(|| GameRecord::placeholder_name(&id)),
        id,
        total_achievements: total,
        unlocked_achievements: unlocked,
    }
}

/// Normalize every entry of a result set, in key order
pub fn normalize_all(set: &DetectionResultSet) -> Vec<GameRecord> {
    set.iter().map(|(key, raw)| normalize(raw, key)).collect()
}

/// Inverse of `normalize` for a canonical record: the full object form
/// using the first alias of each field
pub fn denormalize(record: &GameRecord) -> Value {
    let mut obj = Map::new();
    obj.insert(FIELD_ALIASES.name[0].to_string(), Value::from(record.name.clone()));
    obj.insert(FIELD_ALIASES.total[0].to_string(), Value::from(record.total_achievements));
    obj.insert(FIELD_ALIASES.unlocked[0].to_string(), Value::from(record.unlocked_achievements));
    Value::Object(obj)
}

fn non_blank(s: &str) -> Option<String> {
    if s.trim().is_empty() {
        None
    } else {
        Some(s.to_string())
    }
}

fn first_name(obj: &Map<String, Value>, aliases: &[&str]) -> Option<String> {
    aliases
        .iter()
        .filter_map(|alias| obj.get(*alias))
        .find_map(|v| v.as_str().and_then(non_blank))
}

fn first_count(obj: &Map<String, Value>, aliases: &[&str]) -> u32 {
    aliases
        .iter()
        .find_map(|alias| obj.get(*alias).filter(|v| !v.is_null()))
        .map(coerce_count)
        .unwrap_or(0)
}

/// Best-effort non-negative integer; anything unusable is 0
fn coerce_count(value: &Value) -> u32 {
    match value {
        Value::Number(n) => match n.as_u64() {
            Some(u) => u.min(u32::MAX as u64) as u32,
            None => n.as_f64().map(truncate_count).unwrap_or(0),
        },
        Value::String(s) => s.trim().parse::<f64>().map(truncate_count).unwrap_or(0),
        _ => 0,
    }
}

fn truncate_count(f: f64) -> u32 {
    if f.is_finite() && f > 0.0 {
        f.min(u32::MAX as f64) as u32
    } else {
        0
    }
}
