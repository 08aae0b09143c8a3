use serde::{Deserialize, Serialize};

/// Result of one finished match, from the local player's point of view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    Victory,
    Defeat,
}

impl Outcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Outcome::Victory => "victory",
            Outcome::Defeat => "defeat",
        }
    }

    pub fn from_store(value: &str) -> Self {
        // Stored values only ever come from `as_str`; anything else is a
        // hand-edited row and reads as a loss to stay conservative.
        match value {
            "victory" => Outcome::Victory,
            _ => Outcome::Defeat,
        }
    }
}

/// One stored match. Uniquely identified by `replay_path`; immutable after
/// creation except for the free-text note.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchRecord {
    pub opponent_tag: String,
    pub opponent_toon: Option<String>,
    /// Unix seconds.
    pub game_date: i64,
    pub map: String,
    pub your_race: String,
    pub opponent_race: String,
    pub outcome: Outcome,
    pub replay_path: String,
    pub note: Option<String>,
}

/// One early-game action from a replay. The set of steps for a replay path
/// is replaced wholesale on re-sync, never appended to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildOrderStep {
    pub opponent_tag: String,
    pub time_seconds: i64,
    pub kind: String,
    pub name: String,
    pub replay_path: String,
}

/// Aggregate cache counters, recomputed from current contents on demand.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheStats {
    pub total_matches: i64,
    pub total_build_order_steps: i64,
    /// Unix seconds of the last completed folder sync, if any.
    pub last_synced_at: Option<i64>,
}
