use rustc_hash::FxHashMap;
use sqlx::sqlite::SqliteRow;
use sqlx::{
    Pool, QueryBuilder, Row, Sqlite,
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
};
use std::str::FromStr;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::OwnedMutexGuard;
use tracing::info;

use crate::error::CacheError;
use crate::model::{BuildOrderStep, CacheStats, MatchRecord, Outcome, normalize_tag};

use super::SCHEMA_VERSION;

const LAST_SYNCED_KEY: &str = "last_synced_at";
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// SQLite-backed store for match history and build-order history. The sole
/// owner of persisted records; callers only ever receive copies.
pub struct Database {
    pool: Pool<Sqlite>,
    // Keyed write locks: concurrent writes to the same opponent are
    // serialized, different opponents proceed independently.
    opponent_locks: Mutex<FxHashMap<String, Arc<tokio::sync::Mutex<()>>>>,
}

impl Database {
    /// Open (or create) the cache database at the given path.
    pub async fn new(db_path: &str) -> Result<Self, CacheError> {
        // PRAGMAs applied to every connection; busy_timeout bounds how long
        // any store access can block.
        let options = SqliteConnectOptions::from_str(&format!("sqlite:{}?mode=rwc", db_path))?
            .journal_mode(sqlx::sqlite::SqliteJournalMode::Wal)
            .synchronous(sqlx::sqlite::SqliteSynchronous::Normal)
            .busy_timeout(BUSY_TIMEOUT)
            .pragma("temp_store", "MEMORY");

        // One connection: every write is a short per-record transaction, so
        // a reader behind the pool waits at most one record's upsert.
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await?;

        Ok(Self { pool, opponent_locks: Mutex::new(FxHashMap::default()) })
    }

    /// Initialize the schema, returns true if it was (re)built. Safe and
    /// idempotent on every startup.
    pub async fn init_schema(&self) -> Result<bool, CacheError> {
        sqlx::query(
            "CREATE TABLE IF NOT EXISTS metadata (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL
            )",
        )
        .execute(&self.pool)
        .await?;

        let stored_version: Option<String> =
            sqlx::query("SELECT value FROM metadata WHERE key = 'schema_version'")
                .fetch_optional(&self.pool)
                .await?
                .map(|row| row.get("value"));

        let needs_rebuild = stored_version.as_deref() != Some(SCHEMA_VERSION);

        if needs_rebuild {
            if let Some(old) = &stored_version {
                info!(old = %old, new = SCHEMA_VERSION, "schema version changed, rebuilding cache");
            }
            sqlx::query("DROP TABLE IF EXISTS build_order_steps").execute(&self.pool).await?;
            sqlx::query("DROP TABLE IF EXISTS matches").execute(&self.pool).await?;
            sqlx::query("DELETE FROM metadata").execute(&self.pool).await?;
        }

        sqlx::query(
            "CREATE TABLE IF NOT EXISTS matches (
                replay_path TEXT PRIMARY KEY,
                opponent_tag TEXT NOT NULL,
                opponent_key TEXT NOT NULL,
                opponent_toon TEXT,
                game_date INTEGER NOT NULL,
                map TEXT NOT NULL,
                your_race TEXT NOT NULL,
                opponent_race TEXT NOT NULL,
                outcome TEXT NOT NULL,
                note TEXT
            )",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_matches_key ON matches(opponent_key)")
            .execute(&self.pool)
            .await?;
        sqlx::query("CREATE INDEX IF NOT EXISTS idx_matches_toon ON matches(opponent_toon)")
            .execute(&self.pool)
            .await?;

        sqlx::query(
            "CREATE TABLE IF NOT EXISTS build_order_steps (
                replay_path TEXT NOT NULL,
                opponent_tag TEXT NOT NULL,
                opponent_key TEXT NOT NULL,
                time_seconds INTEGER NOT NULL,
                kind TEXT NOT NULL,
                name TEXT NOT NULL
            )",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_steps_key ON build_order_steps(opponent_key)")
            .execute(&self.pool)
            .await?;
        sqlx::query("CREATE INDEX IF NOT EXISTS idx_steps_path ON build_order_steps(replay_path)")
            .execute(&self.pool)
            .await?;

        if needs_rebuild {
            sqlx::query("INSERT OR REPLACE INTO metadata (key, value) VALUES ('schema_version', ?)")
                .bind(SCHEMA_VERSION)
                .execute(&self.pool)
                .await?;
        }

        Ok(needs_rebuild)
    }

    /// Get metadata value by key.
    pub async fn get_metadata(&self, key: &str) -> Result<Option<String>, CacheError> {
        Ok(sqlx::query("SELECT value FROM metadata WHERE key = ?")
            .bind(key)
            .fetch_optional(&self.pool)
            .await?
            .map(|row| row.get("value")))
    }

    /// Set metadata value.
    pub async fn set_metadata(&self, key: &str, value: &str) -> Result<(), CacheError> {
        sqlx::query("INSERT OR REPLACE INTO metadata (key, value) VALUES (?, ?)")
            .bind(key)
            .bind(value)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    pub(crate) async fn record_sync_completed(&self, unix_seconds: i64) -> Result<(), CacheError> {
        self.set_metadata(LAST_SYNCED_KEY, &unix_seconds.to_string()).await
    }

    /// Upsert one match and its build-order steps in a single transaction.
    ///
    /// Keyed by `replay_path`: saving the same file twice yields one row.
    /// The step set for the path is replaced wholesale, and an existing
    /// note survives re-upserts.
    pub async fn upsert_match(
        &self,
        record: &MatchRecord,
        steps: &[BuildOrderStep],
    ) -> Result<(), CacheError> {
        let key = normalize_tag(&record.opponent_tag);
        let _guard = self.lock_opponent(&key).await;

        let mut tx = self.pool.begin().await?;

        sqlx::query(
            "INSERT INTO matches (
                replay_path, opponent_tag, opponent_key, opponent_toon,
                game_date, map, your_race, opponent_race, outcome, note
             ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
             ON CONFLICT(replay_path) DO UPDATE SET
                opponent_tag = excluded.opponent_tag,
                opponent_key = excluded.opponent_key,
                opponent_toon = excluded.opponent_toon,
                game_date = excluded.game_date,
                map = excluded.map,
                your_race = excluded.your_race,
                opponent_race = excluded.opponent_race,
                outcome = excluded.outcome",
        )
        .bind(record.replay_path.as_str())
        .bind(record.opponent_tag.as_str())
        .bind(key.as_str())
        .bind(record.opponent_toon.as_deref())
        .bind(record.game_date)
        .bind(record.map.as_str())
        .bind(record.your_race.as_str())
        .bind(record.opponent_race.as_str())
        .bind(record.outcome.as_str())
        .bind(record.note.as_deref())
        .execute(&mut *tx)
        .await?;

        // Replace-set semantics for the file's steps.
        sqlx::query("DELETE FROM build_order_steps WHERE replay_path = ?")
            .bind(&record.replay_path)
            .execute(&mut *tx)
            .await?;

        if !steps.is_empty() {
            let mut qb: QueryBuilder<Sqlite> = QueryBuilder::new(
                "INSERT INTO build_order_steps \
                 (replay_path, opponent_tag, opponent_key, time_seconds, kind, name) ",
            );
            qb.push_values(steps, |mut row, step| {
                row.push_bind(record.replay_path.as_str())
                    .push_bind(step.opponent_tag.as_str())
                    .push_bind(key.as_str())
                    .push_bind(step.time_seconds)
                    .push_bind(step.kind.as_str())
                    .push_bind(step.name.as_str());
            });
            qb.build().execute(&mut *tx).await?;
        }

        tx.commit().await?;
        Ok(())
    }

    /// Most recent matches against an opponent, by tag (case-insensitive).
    pub async fn recent_matches_by_tag(
        &self,
        tag: &str,
        limit: usize,
    ) -> Result<Vec<MatchRecord>, CacheError> {
        let rows = sqlx::query(
            "SELECT * FROM matches WHERE opponent_key = ?
             ORDER BY game_date DESC LIMIT ?",
        )
        .bind(normalize_tag(tag))
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(match_from_row).collect())
    }

    /// Most recent matches by toon alias, the secondary identity index.
    pub async fn recent_matches_by_toon(
        &self,
        toon: &str,
        limit: usize,
    ) -> Result<Vec<MatchRecord>, CacheError> {
        let rows = sqlx::query(
            "SELECT * FROM matches WHERE opponent_toon = ?
             ORDER BY game_date DESC LIMIT ?",
        )
        .bind(toon)
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(match_from_row).collect())
    }

    /// Full match history for an opponent, most recent first.
    pub async fn matches_for_opponent(&self, tag: &str) -> Result<Vec<MatchRecord>, CacheError> {
        let rows = sqlx::query(
            "SELECT * FROM matches WHERE opponent_key = ? ORDER BY game_date DESC",
        )
        .bind(normalize_tag(tag))
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(match_from_row).collect())
    }

    /// Most recent build-order steps for an opponent, by descending
    /// time-in-match, bounded by `limit`.
    pub async fn recent_build_steps(
        &self,
        tag: &str,
        limit: usize,
    ) -> Result<Vec<BuildOrderStep>, CacheError> {
        let rows = sqlx::query(
            "SELECT * FROM build_order_steps WHERE opponent_key = ?
             ORDER BY time_seconds DESC LIMIT ?",
        )
        .bind(normalize_tag(tag))
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(step_from_row).collect())
    }

    /// All stored steps for an opponent, grouped by replay in ascending
    /// time-in-match order. Feeds opening classification.
    pub async fn steps_for_opponent(&self, tag: &str) -> Result<Vec<BuildOrderStep>, CacheError> {
        let rows = sqlx::query(
            "SELECT * FROM build_order_steps WHERE opponent_key = ?
             ORDER BY replay_path, time_seconds ASC",
        )
        .bind(normalize_tag(tag))
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(step_from_row).collect())
    }

    /// Steps stored for one replay file, ascending time-in-match.
    pub async fn steps_for_replay(&self, replay_path: &str) -> Result<Vec<BuildOrderStep>, CacheError> {
        let rows = sqlx::query(
            "SELECT * FROM build_order_steps WHERE replay_path = ?
             ORDER BY time_seconds ASC",
        )
        .bind(replay_path)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(step_from_row).collect())
    }

    /// Aggregate counters, recomputed from current contents.
    pub async fn stats(&self) -> Result<CacheStats, CacheError> {
        let total_matches: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM matches")
            .fetch_one(&self.pool)
            .await?;
        let total_build_order_steps: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM build_order_steps")
                .fetch_one(&self.pool)
                .await?;
        let last_synced_at = self
            .get_metadata(LAST_SYNCED_KEY)
            .await?
            .and_then(|v| v.parse::<i64>().ok());

        Ok(CacheStats { total_matches, total_build_order_steps, last_synced_at })
    }

    /// Append a free-text note to the match identified by opponent tag and
    /// game date. Returns false (a no-op, not an error) when no such match
    /// exists.
    pub async fn annotate(
        &self,
        tag: &str,
        game_date: i64,
        note: &str,
    ) -> Result<bool, CacheError> {
        let key = normalize_tag(tag);
        let _guard = self.lock_opponent(&key).await;

        let result = sqlx::query(
            "UPDATE matches SET note = CASE
                WHEN note IS NULL OR note = '' THEN ?
                ELSE note || char(10) || ?
             END
             WHERE opponent_key = ? AND game_date = ?",
        )
        .bind(note)
        .bind(note)
        .bind(key.as_str())
        .bind(game_date)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn lock_opponent(&self, key: &str) -> OwnedMutexGuard<()> {
        let lock = {
            let mut locks = self
                .opponent_locks
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner());
            // Idle locks (strong count 1: held only by this map) are
            // evicted here so the map stays bounded by the number of
            // opponents with writes in flight, not ever seen.
            locks.retain(|_, lock| Arc::strong_count(lock) > 1);
            locks.entry(key.to_string()).or_default().clone()
        };
        lock.lock_owned().await
    }
}


fn match_from_row(row: &SqliteRow) -> MatchRecord {
    MatchRecord {
        opponent_tag: row.get("opponent_tag"),
        opponent_toon: row.get("opponent_toon"),
        game_date: row.get("game_date"),
        map: row.get("map"),
        your_race: row.get("your_race"),
        opponent_race: row.get("opponent_race"),
        outcome: Outcome::from_store(row.get::<&str, _>("outcome")),
        replay_path: row.get("replay_path"),
        note: row.get("note"),
    }
}

fn step_from_row(row: &SqliteRow) -> BuildOrderStep {
    BuildOrderStep {
        opponent_tag: row.get("opponent_tag"),
        time_seconds: row.get("time_seconds"),
        kind: row.get("kind"),
        name: row.get("name"),
        replay_path: row.get("replay_path"),
    }
}
