use serde::{Deserialize, Serialize};

use super::record::MatchRecord;

/// Win/loss tally against one opponent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct WinRate {
    pub wins: u32,
    pub losses: u32,
}

impl WinRate {
    pub fn total(&self) -> u32 {
        self.wins + self.losses
    }

    /// Percentage of games won, undefined with no games on record. Callers
    /// must render `None` as "not available", never as 0%.
    pub fn percentage(&self) -> Option<f64> {
        if self.total() == 0 {
            None
        } else {
            Some(f64::from(self.wins) * 100.0 / f64::from(self.total()))
        }
    }
}

/// How often one map came up against an opponent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MapCount {
    pub map: String,
    pub games: u32,
}

/// A recognized opening, named by its early-step signature.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildOrderPattern {
    /// Human-readable signature, e.g. "Gateway > Core > Gateway".
    pub name: String,
    /// How many stored replays of this opponent opened this way.
    pub occurrences: u32,
}

/// Live ladder numbers supplied by an external lookup. Never fetched by
/// the analytics engine; the caller injects it, nullable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LadderStats {
    pub mmr: Option<i64>,
    pub league: Option<String>,
    pub ladder_wins: Option<u32>,
    pub ladder_losses: Option<u32>,
}

/// The aggregated view handed to the presentation layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OpponentProfile {
    pub opponent_tag: String,
    pub win_rate: WinRate,
    pub favorite_maps: Vec<MapCount>,
    pub typical_opening: Option<BuildOrderPattern>,
    pub recent_matches: Vec<MatchRecord>,
    pub ladder: Option<LadderStats>,
}
