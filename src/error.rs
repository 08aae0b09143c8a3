//! Error types crossing the library boundary.
//!
//! Every failure mode a caller can observe is typed here; `anyhow` is
//! reserved for the binary. Cache queries report "no data" as an empty
//! `Ok` result, never as an error.

use std::path::PathBuf;
use thiserror::Error;

/// Failures while turning a raw lobby buffer into a resolved matchup.
#[derive(Error, Debug)]
pub enum SnapshotError {
    /// The buffer does not hold the supported 1v1 token layout. The caller
    /// should treat this as "not a lobby I can read yet" and retry on the
    /// next poll tick.
    #[error("unsupported lobby layout: found {token_count} identity tokens")]
    Format { token_count: usize },

    /// The configured local identity matched neither resolved team. Hard
    /// failure: every cache write downstream is keyed by a definite opponent
    /// and a guessed side would poison the history.
    #[error("configured identity '{identity}' not found in either team")]
    IdentityNotFound { identity: String },
}

/// Persistent-store failure. Aborts the current cache operation; prior
/// cache contents are left untouched.
#[derive(Error, Debug)]
pub enum CacheError {
    #[error("replay store error: {0}")]
    Store(#[from] sqlx::Error),
}

/// Failure reading or decoding one replay summary file. During a folder
/// sync these are counted and skipped, never escalated individually.
#[derive(Error, Debug)]
pub enum ParseError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed summary {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// The summary carries no plausible opponent tag. Surfaced as a typed
    /// error so a placeholder identity can never be cached as a real one.
    #[error("no opponent identity in {path}")]
    MissingIdentity { path: PathBuf },
}

/// Failure of the single-match save fast path, where a parse problem is
/// the caller's to see rather than an aggregate count.
#[derive(Error, Debug)]
pub enum SaveError {
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error(transparent)]
    Store(#[from] CacheError),
}
