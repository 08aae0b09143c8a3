// Folder sync and single-save integration tests

mod common;

use common::{setup_db, write_summary};
use rivaltrack::error::SaveError;
use rivaltrack::repository::{CancelFlag, ReplaySync, SummaryFileParser};
use tempfile::TempDir;

fn sync_for(dir: &TempDir, recursive: bool) -> ReplaySync<SummaryFileParser> {
    ReplaySync::quiet(dir.path(), recursive, SummaryFileParser)
}

#[tokio::test]
async fn test_folder_sync_and_idempotent_resync() {
    let dir = TempDir::new().unwrap();
    write_summary(dir.path(), "a.replay.json", "Alpha#123", 100, "Babylon", "victory", &[]);
    write_summary(dir.path(), "b.replay.json", "Alpha#123", 200, "Babylon", "defeat", &[]);
    write_summary(dir.path(), "c.replay.json", "Bravo#456", 300, "Equilibrium", "victory", &[]);

    let db = setup_db().await;
    let sync = sync_for(&dir, false);

    let report = sync.sync(&db, &CancelFlag::new()).await.unwrap();
    assert_eq!(report.scanned, 3);
    assert_eq!(report.synced, 3);
    assert_eq!(report.skipped, 0);
    assert!(!report.cancelled);
    assert_eq!(db.stats().await.unwrap().total_matches, 3);

    // Re-running over the unchanged folder must not grow the match count.
    let report = sync.sync(&db, &CancelFlag::new()).await.unwrap();
    assert_eq!(report.synced, 3);
    assert_eq!(db.stats().await.unwrap().total_matches, 3);
}

#[tokio::test]
async fn test_unparseable_file_is_counted_and_skipped() {
    let dir = TempDir::new().unwrap();
    write_summary(dir.path(), "good1.replay.json", "Alpha#123", 100, "Babylon", "victory", &[]);
    write_summary(dir.path(), "good2.replay.json", "Alpha#123", 200, "Babylon", "defeat", &[]);
    std::fs::write(dir.path().join("broken.replay.json"), b"{ not json").unwrap();
    // Not a candidate at all; must not even be scanned.
    std::fs::write(dir.path().join("notes.txt"), b"irrelevant").unwrap();

    let db = setup_db().await;
    let report = sync_for(&dir, false).sync(&db, &CancelFlag::new()).await.unwrap();

    assert_eq!(report.scanned, 3);
    assert_eq!(report.synced, 2);
    assert_eq!(report.skipped, 1);
    assert_eq!(db.stats().await.unwrap().total_matches, 2);
}

#[tokio::test]
async fn test_summary_without_identity_is_skipped() {
    let dir = TempDir::new().unwrap();
    write_summary(dir.path(), "anon.replay.json", "", 100, "Babylon", "victory", &[]);

    let db = setup_db().await;
    let report = sync_for(&dir, false).sync(&db, &CancelFlag::new()).await.unwrap();

    // No placeholder opponent may ever be cached.
    assert_eq!(report.skipped, 1);
    assert_eq!(db.stats().await.unwrap().total_matches, 0);
}

#[tokio::test]
async fn test_recursive_flag() {
    let dir = TempDir::new().unwrap();
    write_summary(dir.path(), "top.replay.json", "Alpha#123", 100, "Babylon", "victory", &[]);
    write_summary(dir.path(), "season1/nested.replay.json", "Alpha#123", 200, "Babylon", "defeat", &[]);

    let db = setup_db().await;
    let report = sync_for(&dir, false).sync(&db, &CancelFlag::new()).await.unwrap();
    assert_eq!(report.synced, 1);

    let report = sync_for(&dir, true).sync(&db, &CancelFlag::new()).await.unwrap();
    assert_eq!(report.synced, 2);
    assert_eq!(db.stats().await.unwrap().total_matches, 2);
}

#[tokio::test]
async fn test_cancelled_sync_stops_before_any_file() {
    let dir = TempDir::new().unwrap();
    write_summary(dir.path(), "a.replay.json", "Alpha#123", 100, "Babylon", "victory", &[]);
    write_summary(dir.path(), "b.replay.json", "Alpha#123", 200, "Babylon", "defeat", &[]);

    let db = setup_db().await;
    let cancel = CancelFlag::new();
    cancel.cancel();

    let report = sync_for(&dir, false).sync(&db, &cancel).await.unwrap();
    assert!(report.cancelled);
    assert_eq!(report.synced, 0);

    let stats = db.stats().await.unwrap();
    assert_eq!(stats.total_matches, 0);
    // A cancelled sync does not claim to have completed.
    assert!(stats.last_synced_at.is_none());
}

#[tokio::test]
async fn test_completed_sync_records_timestamp() {
    let dir = TempDir::new().unwrap();
    write_summary(dir.path(), "a.replay.json", "Alpha#123", 100, "Babylon", "victory", &[]);

    let db = setup_db().await;
    sync_for(&dir, false).sync(&db, &CancelFlag::new()).await.unwrap();

    let stats = db.stats().await.unwrap();
    assert!(stats.last_synced_at.is_some());
}

#[tokio::test]
async fn test_save_single_is_idempotent() {
    let dir = TempDir::new().unwrap();
    let path = write_summary(
        dir.path(),
        "just_finished.replay.json",
        "Alpha#123",
        100,
        "Babylon",
        "victory",
        &[(20, "structure", "Gateway")],
    );

    let db = setup_db().await;
    let sync = sync_for(&dir, false);

    sync.save_single(&db, &path).await.unwrap();
    sync.save_single(&db, &path).await.unwrap();

    let stats = db.stats().await.unwrap();
    assert_eq!(stats.total_matches, 1);
    assert_eq!(stats.total_build_order_steps, 1);
}

#[tokio::test]
async fn test_save_single_surfaces_parse_error() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("broken.replay.json");
    std::fs::write(&path, b"not a summary").unwrap();

    let db = setup_db().await;
    match sync_for(&dir, false).save_single(&db, &path).await {
        Err(SaveError::Parse(_)) => {}
        other => panic!("expected parse error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_missing_folder_syncs_nothing() {
    let dir = TempDir::new().unwrap();
    let missing = dir.path().join("does_not_exist");

    let db = setup_db().await;
    let sync = ReplaySync::quiet(missing, true, SummaryFileParser);
    let report = sync.sync(&db, &CancelFlag::new()).await.unwrap();
    assert_eq!(report.scanned, 0);
    assert_eq!(report.synced, 0);
}
