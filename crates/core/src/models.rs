//! Shared data types: canonical game records and raw detection result sets

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;

/// Stable identifier of a detected game (platform application id)
///
/// Numeric keys are kept as numbers so they sort numerically; anything else
/// is carried through verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum GameId {
    Numeric(u64),
    Opaque(String),
}

impl GameId {
    /// Parse a detection key into its numeric form when possible
    ///
    /// Surrounding whitespace is never significant, so `" 42"`, `"042"` and
    /// `"42"` all name the same game.
    pub fn from_key(key: &str) -> Self {
        let trimmed = key.trim();
        match trimmed.parse::<u64>() {
            Ok(n) => GameId::Numeric(n),
            Err(_) => GameId::Opaque(trimmed.to_string()),
        }
    }

    pub fn as_u64(&self) -> Option<u64> {
        match self {
            GameId::Numeric(n) => Some(*n),
            GameId::Opaque(_) => None,
        }
    }

    /// Key form used in a `DetectionResultSet`
    pub fn to_key(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for GameId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GameId::Numeric(n) => write!(f, "{}", n),
            GameId::Opaque(s) => write!(f, "{}", s),
        }
    }
}

/// Canonical game record shown by both surfaces
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameRecord {
    pub id: GameId,
    pub name: String,
    pub total_achievements: u32,
    pub unlocked_achievements: u32,
}

impl GameRecord {
    /// Placeholder display name for a game whose name is unknown
    pub fn placeholder_name(id: &GameId) -> String {
        format!("App {}", id)
    }

    /// Unlocked / total, or 0.0 when the total is unknown
    pub fn completion_ratio(&self) -> f64 {
        if self.total_achievements > 0 {
            self.unlocked_achievements as f64 / self.total_achievements as f64
        } else {
            0.0
        }
    }

    /// Completion rounded to a whole percent
    pub fn completion_percent(&self) -> u32 {
        (self.completion_ratio() * 100.0).round() as u32
    }

    pub fn has_achievements(&self) -> bool {
        self.total_achievements > 0
    }

    pub fn is_completed(&self) -> bool {
        self.total_achievements > 0 && self.unlocked_achievements >= self.total_achievements
    }

    /// "12 / 50" style display, or a dash when the total is unknown
    pub fn achievements_display(&self) -> String {
        if self.total_achievements > 0 {
            format!("{} / {}", self.unlocked_achievements, self.total_achievements)
        } else {
            "—".to_string()
        }
    }
}

/// Game detection output of one scan or push: key -> raw game info
///
/// Values keep whatever shape the producer sent (a bare name string or an
/// object with any of the accepted field aliases); the normalizer turns them
/// into `GameRecord`s on demand.
///
/// Keys are stored in canonical `GameId` form, so one game has at most one
/// entry however its key was spelled.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "BTreeMap<String, Value>", into = "BTreeMap<String, Value>")]
pub struct DetectionResultSet {
    entries: BTreeMap<String, Value>,
}

impl DetectionResultSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert under the canonical form of `key`
    ///
    /// An entry spelled exactly in canonical form replaces what is there; a
    /// variant spelling (`" 42"`, `"042"`) only fills an empty slot.
    pub fn insert(&mut self, key: impl Into<String>, raw: Value) {
        let key = key.into();
        let canonical = GameId::from_key(&key).to_key();
        if canonical != key && self.entries.contains_key(&canonical) {
            tracing::debug!("Ignoring duplicate detection key {:?} for {}", key, canonical);
            return;
        }
        self.entries.insert(canonical, raw);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries.get(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.entries.iter()
    }

    /// Build a result set from a plain JSON object (`{"100": "Foo", ...}`)
    ///
    /// Returns `None` when the value is not an object.
    pub fn from_map_value(value: &Value) -> Option<Self> {
        let map = value.as_object()?;
        Some(map.iter().map(|(k, v)| (k.clone(), v.clone())).collect())
    }

    /// Build a result set from the companion API response
    /// (`{ "success": true, "games": [ { "app_id": .., .. }, .. ] }`)
    ///
    /// Returns `None` for a non-success flag or any other shape. Game entries
    /// without a usable `app_id` are skipped.
    pub fn from_api_response(body: &Value) -> Option<Self> {
        if body.get("success").and_then(Value::as_bool) != Some(true) {
            return None;
        }
        let games = body.get("games")?.as_array()?;

        let mut set = Self::new();
        for game in games {
            let key = match game.get("app_id") {
                Some(Value::String(s)) if !s.trim().is_empty() => s.trim().to_string(),
                Some(Value::Number(n)) => number_key(n),
                _ => continue,
            };
            set.insert(key, game.clone());
        }
        Some(set)
    }
}

/// Key for a numeric `app_id`; whole floats such as `42.0` count as integers
fn number_key(n: &serde_json::Number) -> String {
    if let Some(u) = n.as_u64() {
        return u.to_string();
    }
    match n.as_f64() {
        Some(f) if f >= 0.0 && f.fract() == 0.0 && f <= u64::MAX as f64 => (f as u64).to_string(),
        _ => n.to_string(),
    }
}

impl FromIterator<(String, Value)> for DetectionResultSet {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        let mut set = Self::new();
        for (key, raw) in iter {
            set.insert(key, raw);
        }
        set
    }
}

impl From<BTreeMap<String, Value>> for DetectionResultSet {
    fn from(entries: BTreeMap<String, Value>) -> Self {
        entries.into_iter().collect()
    }
}

impl From<DetectionResultSet> for BTreeMap<String, Value> {
    fn from(set: DetectionResultSet) -> Self {
        set.entries
    }
}
