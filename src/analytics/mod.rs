//! Read-only analytics over the replay cache.
//!
//! Every method recomputes from current cache contents; nothing is cached
//! here and nothing is mutated, apart from the explicit annotate
//! passthrough which exists so callers have a single cache-facing surface.

use rustc_hash::FxHashMap;

use crate::error::CacheError;
use crate::model::{
    BuildOrderPattern, BuildOrderStep, LadderStats, MapCount, OpponentProfile, Outcome, WinRate,
};
use crate::repository::Database;

/// Steps later than this are mid-game noise, not part of the opening.
const EARLY_WINDOW_SECONDS: i64 = 240;
/// Opening signature length used for profile assembly.
const DEFAULT_SIGNATURE_LEN: usize = 4;
const SIGNATURE_SEP: &str = " > ";
const TOP_MAPS: usize = 3;
const RECENT_MATCH_LIMIT: usize = 10;

pub struct AnalyticsEngine<'a> {
    db: &'a Database,
}

impl<'a> AnalyticsEngine<'a> {
    pub fn new(db: &'a Database) -> Self {
        Self { db }
    }

    /// Win/loss tally against one opponent. Zero games leaves the
    /// percentage undefined; see [`WinRate::percentage`].
    pub async fn win_rate(&self, tag: &str) -> Result<WinRate, CacheError> {
        let matches = self.db.matches_for_opponent(tag).await?;
        let mut rate = WinRate::default();
        for m in &matches {
            match m.outcome {
                Outcome::Victory => rate.wins += 1,
                Outcome::Defeat => rate.losses += 1,
            }
        }
        Ok(rate)
    }

    /// Maps played against this opponent, ranked by frequency, top N.
    /// Ties break alphabetically so the ranking is stable.
    pub async fn favorite_maps(&self, tag: &str, top_n: usize) -> Result<Vec<MapCount>, CacheError> {
        let matches = self.db.matches_for_opponent(tag).await?;

        let mut tally: FxHashMap<&str, u32> = FxHashMap::default();
        for m in &matches {
            *tally.entry(m.map.as_str()).or_default() += 1;
        }

        let mut ranked: Vec<MapCount> = tally
            .into_iter()
            .map(|(map, games)| MapCount { map: map.to_string(), games })
            .collect();
        ranked.sort_by(|a, b| b.games.cmp(&a.games).then_with(|| a.map.cmp(&b.map)));
        ranked.truncate(top_n);
        Ok(ranked)
    }

    /// Classify the opponent's latest opening against their stored history.
    ///
    /// Each stored replay yields an early-game signature (the first
    /// `signature_len` step names inside the early window). The latest
    /// replay's signature is matched against every previously seen one;
    /// among signatures sharing its first move, the most frequent wins,
    /// with an exact match preferred on equal counts.
    pub async fn classify_opening(
        &self,
        tag: &str,
        signature_len: usize,
    ) -> Result<Option<BuildOrderPattern>, CacheError> {
        let matches = self.db.matches_for_opponent(tag).await?;
        let Some(latest) = matches.first() else {
            return Ok(None);
        };

        let all_steps = self.db.steps_for_opponent(tag).await?;
        let mut by_replay: FxHashMap<&str, Vec<&BuildOrderStep>> = FxHashMap::default();
        for step in &all_steps {
            by_replay.entry(step.replay_path.as_str()).or_default().push(step);
        }

        let mut counts: FxHashMap<String, u32> = FxHashMap::default();
        for steps in by_replay.values() {
            if let Some(sig) = opening_signature(steps, signature_len) {
                *counts.entry(sig).or_default() += 1;
            }
        }

        let current = match by_replay.get(latest.replay_path.as_str()) {
            Some(steps) => match opening_signature(steps, signature_len) {
                Some(sig) => sig,
                None => return Ok(None),
            },
            None => return Ok(None),
        };
        let first_move = current.split(SIGNATURE_SEP).next().unwrap_or(&current).to_string();

        // First moves compare as whole segments: "Gate" is not "Gateway".
        let mut candidates: Vec<(String, u32)> = counts
            .into_iter()
            .filter(|(sig, _)| sig.split(SIGNATURE_SEP).next() == Some(first_move.as_str()))
            .collect();
        candidates.sort_by(|a, b| {
            b.1.cmp(&a.1)
                .then_with(|| (b.0 == current).cmp(&(a.0 == current)))
                .then_with(|| a.0.cmp(&b.0))
        });

        Ok(candidates
            .into_iter()
            .next()
            .map(|(name, occurrences)| BuildOrderPattern { name, occurrences }))
    }

    /// Assemble the full opponent profile. Ladder stats are injected by the
    /// caller when available; this engine never performs the lookup.
    pub async fn profile(
        &self,
        tag: &str,
        ladder: Option<LadderStats>,
    ) -> Result<OpponentProfile, CacheError> {
        let recent_matches = self.db.recent_matches_by_tag(tag, RECENT_MATCH_LIMIT).await?;
        // Prefer the stored display tag over whatever casing the caller used.
        let opponent_tag = recent_matches
            .first()
            .map(|m| m.opponent_tag.clone())
            .unwrap_or_else(|| tag.to_string());

        Ok(OpponentProfile {
            opponent_tag,
            win_rate: self.win_rate(tag).await?,
            favorite_maps: self.favorite_maps(tag, TOP_MAPS).await?,
            typical_opening: self.classify_opening(tag, DEFAULT_SIGNATURE_LEN).await?,
            recent_matches,
            ladder,
        })
    }

    /// Explicit annotate passthrough, the engine's only mutating surface.
    pub async fn annotate(&self, tag: &str, game_date: i64, note: &str) -> Result<bool, CacheError> {
        self.db.annotate(tag, game_date, note).await
    }
}

/// Early-game signature of one replay's step list (steps must already be
/// in ascending time order).
fn opening_signature(steps: &[&BuildOrderStep], signature_len: usize) -> Option<String> {
    let names: Vec<&str> = steps
        .iter()
        .filter(|s| s.time_seconds <= EARLY_WINDOW_SECONDS)
        .take(signature_len)
        .map(|s| s.name.as_str())
        .collect();
    if names.is_empty() { None } else { Some(names.join(SIGNATURE_SEP)) }
}
