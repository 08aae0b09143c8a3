//! Folder sync and the single-match fast path.

use indicatif::{ProgressBar, ProgressStyle};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use time::OffsetDateTime;
use tracing::warn;

use crate::error::{CacheError, SaveError};

use super::Database;
use super::parser::ReplayParser;

/// Cooperative cancellation for a long-running sync. Checked between
/// files, so a cancelled sync halts promptly and never leaves a single
/// file's upsert half-written.
#[derive(Clone, Debug, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// What one folder sync did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SyncReport {
    /// Candidate files found in the folder.
    pub scanned: usize,
    /// Files upserted into the cache.
    pub synced: usize,
    /// Files skipped because they failed to parse. Aggregate count only;
    /// per-file failures never abort the batch.
    pub skipped: usize,
    /// True when the sync stopped early on the cancellation flag.
    pub cancelled: bool,
}

/// Replay folder synchronizer. Enumerates candidate files and upserts each
/// one through the parser, one transaction per file.
pub struct ReplaySync<P> {
    folder: PathBuf,
    recursive: bool,
    parser: P,
    verbose: bool,
}

impl<P: ReplayParser> ReplaySync<P> {
    pub fn new(folder: impl Into<PathBuf>, recursive: bool, parser: P) -> Self {
        Self { folder: folder.into(), recursive, parser, verbose: true }
    }

    /// Create a quiet synchronizer (no progress output, used by tests)
    pub fn quiet(folder: impl Into<PathBuf>, recursive: bool, parser: P) -> Self {
        Self { folder: folder.into(), recursive, parser, verbose: false }
    }

    /// Sync the folder into the cache. Idempotent: re-running over an
    /// unchanged folder does not grow the match count (upserts are keyed
    /// by replay path). Only a store-level failure aborts the batch, and
    /// it leaves prior cache contents untouched.
    pub async fn sync(&self, db: &Database, cancel: &CancelFlag) -> Result<SyncReport, CacheError> {
        let candidates = self.collect_candidates();

        let pb = ProgressBar::new(candidates.len() as u64);
        if self.verbose {
            pb.set_style(
                ProgressStyle::default_bar()
                    .template("{spinner:.green} Syncing replays: [{bar:50.cyan/blue}] {pos}/{len}")
                    .unwrap()
                    .progress_chars("=>-"),
            );
        } else {
            pb.set_draw_target(indicatif::ProgressDrawTarget::hidden());
        }

        let mut report = SyncReport { scanned: candidates.len(), ..SyncReport::default() };

        for path in &candidates {
            if cancel.is_cancelled() {
                report.cancelled = true;
                break;
            }
            pb.inc(1);

            let parsed = match self.parser.parse(path) {
                Ok(parsed) => parsed,
                Err(err) => {
                    warn!(file = %path.display(), %err, "skipping unreadable replay");
                    report.skipped += 1;
                    continue;
                }
            };

            db.upsert_match(&parsed.record, &parsed.steps).await?;
            report.synced += 1;
        }

        pb.finish_and_clear();

        if !report.cancelled {
            db.record_sync_completed(OffsetDateTime::now_utc().unix_timestamp())
                .await?;
        }

        Ok(report)
    }

    /// Fast path for "a match just finished": parse and upsert exactly one
    /// file. Idempotent on the path; a parse failure here is the caller's
    /// to see, unlike the aggregate counting in `sync`.
    pub async fn save_single(&self, db: &Database, path: &Path) -> Result<(), SaveError> {
        let parsed = self.parser.parse(path)?;
        db.upsert_match(&parsed.record, &parsed.steps)
            .await
            .map_err(SaveError::Store)
    }

    fn collect_candidates(&self) -> Vec<PathBuf> {
        let mut found = Vec::new();
        collect_into(&self.folder, self.recursive, &self.parser, &mut found);
        // Deterministic sync order regardless of directory iteration order.
        found.sort();
        found
    }
}

fn collect_into<P: ReplayParser>(dir: &Path, recursive: bool, parser: &P, found: &mut Vec<PathBuf>) {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(err) => {
            warn!(dir = %dir.display(), %err, "cannot enumerate replay folder");
            return;
        }
    };

    for entry in entries.flatten() {
        let path = entry.path();
        if path.is_dir() {
            if recursive {
                collect_into(&path, recursive, parser, found);
            }
        } else if parser.is_candidate(&path) {
            found.push(path);
        }
    }
}
