// Shared test fixtures for integration tests
// Functions here are used across different test files
#![allow(dead_code)]

use rivaltrack::model::{BuildOrderStep, MatchRecord, Outcome};
use rivaltrack::repository::Database;
use std::path::{Path, PathBuf};

/// Create an in-memory test database
pub async fn create_test_db() -> Database {
    Database::new(":memory:").await.unwrap()
}

/// Create an in-memory test database with initialized schema
pub async fn setup_db() -> Database {
    let db = create_test_db().await;
    db.init_schema().await.unwrap();
    db
}

/// Build a match record with sensible defaults for fields a test does not
/// care about
pub fn record(
    tag: &str,
    replay_path: &str,
    game_date: i64,
    map: &str,
    outcome: Outcome,
) -> MatchRecord {
    MatchRecord {
        opponent_tag: tag.to_string(),
        opponent_toon: None,
        game_date,
        map: map.to_string(),
        your_race: "Terran".to_string(),
        opponent_race: "Zerg".to_string(),
        outcome,
        replay_path: replay_path.to_string(),
        note: None,
    }
}

/// Build one build-order step tied to a replay path
pub fn step(tag: &str, replay_path: &str, time_seconds: i64, name: &str) -> BuildOrderStep {
    BuildOrderStep {
        opponent_tag: tag.to_string(),
        time_seconds,
        kind: "structure".to_string(),
        name: name.to_string(),
        replay_path: replay_path.to_string(),
    }
}

/// Write a replay summary sidecar into a test folder and return its path
pub fn write_summary(
    dir: &Path,
    file: &str,
    opponent_tag: &str,
    game_date: i64,
    map: &str,
    outcome: &str,
    steps: &[(i64, &str, &str)],
) -> PathBuf {
    let build_order: Vec<serde_json::Value> = steps
        .iter()
        .map(|(time_seconds, kind, name)| {
            serde_json::json!({
                "time_seconds": time_seconds,
                "kind": kind,
                "name": name,
            })
        })
        .collect();

    let doc = serde_json::json!({
        "opponent_tag": opponent_tag,
        "game_date": game_date,
        "map": map,
        "your_race": "Terran",
        "opponent_race": "Protoss",
        "outcome": outcome,
        "build_order": build_order,
    });

    let path = dir.join(file);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    std::fs::write(&path, serde_json::to_vec_pretty(&doc).unwrap()).unwrap();
    path
}
