//! Replay file parsing seam.
//!
//! Decoding the proprietary replay binary is out of scope; the cache only
//! needs one record plus its step list per file, behind a trait so a real
//! decoder can be slotted in by the embedding process. The shipped
//! implementation reads the JSON summary sidecars (`*.replay.json`) that
//! the game-state watcher exports next to each replay.

use serde::Deserialize;
use std::fs;
use std::path::Path;

use crate::error::ParseError;
use crate::model::{BuildOrderStep, MatchRecord, Outcome, normalize_tag};

/// A fully parsed replay file: the match record plus its build order.
#[derive(Debug, Clone)]
pub struct ParsedReplay {
    pub record: MatchRecord,
    pub steps: Vec<BuildOrderStep>,
}

/// Turns one on-disk replay artifact into cache rows.
pub trait ReplayParser {
    /// Whether a directory entry is worth handing to `parse`.
    fn is_candidate(&self, path: &Path) -> bool;

    fn parse(&self, path: &Path) -> Result<ParsedReplay, ParseError>;
}

#[derive(Debug, Deserialize)]
pub struct StepSummary {
    pub time_seconds: i64,
    pub kind: String,
    pub name: String,
}

#[derive(Debug, Deserialize)]
struct ReplaySummary {
    opponent_tag: String,
    #[serde(default)]
    opponent_toon: Option<String>,
    /// Unix seconds.
    game_date: i64,
    map: String,
    your_race: String,
    opponent_race: String,
    outcome: Outcome,
    #[serde(default)]
    build_order: Vec<StepSummary>,
}

const SUMMARY_SUFFIX: &str = ".replay.json";

/// Parser for the watcher's JSON summary sidecars.
#[derive(Debug, Clone, Copy, Default)]
pub struct SummaryFileParser;

impl ReplayParser for SummaryFileParser {
    fn is_candidate(&self, path: &Path) -> bool {
        path.file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|n| n.ends_with(SUMMARY_SUFFIX))
    }

    fn parse(&self, path: &Path) -> Result<ParsedReplay, ParseError> {
        let raw = fs::read_to_string(path)
            .map_err(|source| ParseError::Io { path: path.to_path_buf(), source })?;
        let summary: ReplaySummary = serde_json::from_str(&raw)
            .map_err(|source| ParseError::Json { path: path.to_path_buf(), source })?;

        // A summary without a real opponent identity never reaches the
        // cache; there is no "unknown opponent" placeholder row.
        let key = normalize_tag(&summary.opponent_tag);
        if key.is_empty() || !key.contains('#') {
            return Err(ParseError::MissingIdentity { path: path.to_path_buf() });
        }

        let replay_path = path.to_string_lossy().into_owned();

        let steps = summary
            .build_order
            .into_iter()
            .map(|s| BuildOrderStep {
                opponent_tag: summary.opponent_tag.clone(),
                time_seconds: s.time_seconds,
                kind: s.kind,
                name: s.name,
                replay_path: replay_path.clone(),
            })
            .collect();

        Ok(ParsedReplay {
            record: MatchRecord {
                opponent_tag: summary.opponent_tag,
                opponent_toon: summary.opponent_toon,
                game_date: summary.game_date,
                map: summary.map,
                your_race: summary.your_race,
                opponent_race: summary.opponent_race,
                outcome: summary.outcome,
                replay_path,
                note: None,
            },
            steps,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_candidate_suffix() {
        let parser = SummaryFileParser;
        assert!(parser.is_candidate(Path::new("/replays/ladder1.replay.json")));
        assert!(!parser.is_candidate(Path::new("/replays/ladder1.SC2Replay")));
        assert!(!parser.is_candidate(Path::new("/replays/notes.json")));
    }

    #[test]
    fn test_missing_identity_is_typed() {
        let dir = std::env::temp_dir();
        let path = dir.join("rivaltrack_missing_identity.replay.json");
        std::fs::write(
            &path,
            r#"{"opponent_tag":"","game_date":1,"map":"m","your_race":"t","opponent_race":"z","outcome":"victory"}"#,
        )
        .unwrap();
        match SummaryFileParser.parse(&path) {
            Err(ParseError::MissingIdentity { .. }) => {}
            other => panic!("expected MissingIdentity, got {other:?}"),
        }
        let _ = std::fs::remove_file(&path);
    }
}
