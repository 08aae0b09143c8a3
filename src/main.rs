use anyhow::{Context, Result};
use std::collections::hash_map::DefaultHasher;
use std::fs;
use std::hash::{Hash, Hasher};
use tracing_subscriber::EnvFilter;

use rivaltrack::analytics::AnalyticsEngine;
use rivaltrack::model::display_name;
use rivaltrack::repository::{CancelFlag, Database, ReplaySync, SummaryFileParser};
use rivaltrack::snapshot::manual_matchup;
use rivaltrack::util::{format_game_clock, format_timestamp, format_win_rate};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let mut args = std::env::args().skip(1);
    let replay_folder = args.next().unwrap_or_else(|| ".".to_string());
    let local_tag = args
        .next()
        .context("usage: rivaltrack <replay_folder> <local_tag> [opponent_tag]")?;
    let opponent_tag = args.next();

    // Get cache directory and create rivaltrack subdirectory
    let cache_dir = dirs::cache_dir()
        .context("Could not determine cache directory")?
        .join("rivaltrack");
    fs::create_dir_all(&cache_dir)?;

    // Generate unique cache filename based on the folder's absolute path
    let abs_folder = fs::canonicalize(&replay_folder)
        .with_context(|| format!("Could not resolve path: {}", replay_folder))?;
    let folder_name = abs_folder
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("replays");
    let mut hasher = DefaultHasher::new();
    abs_folder.hash(&mut hasher);
    let hash = hasher.finish();
    let db_path = cache_dir.join(format!("{}_{:016x}.db", folder_name, hash));

    eprintln!("Using cache: {}", db_path.display());

    let db_path_str = db_path.to_str().context("Invalid path encoding")?;
    let db = Database::new(db_path_str).await?;
    db.init_schema().await?;

    let sync = ReplaySync::new(&abs_folder, true, SummaryFileParser);
    let report = sync.sync(&db, &CancelFlag::new()).await?;
    eprintln!(
        "Synced {} of {} replay summaries ({} skipped)",
        report.synced, report.scanned, report.skipped
    );

    let stats = db.stats().await?;
    println!(
        "Cache: {} matches, {} build-order steps, last sync {}",
        stats.total_matches,
        stats.total_build_order_steps,
        stats.last_synced_at.map_or_else(|| "never".to_string(), format_timestamp),
    );

    if let Some(tag) = opponent_tag {
        // No live lobby in the CLI path; the matchup is supplied by hand
        // and keyed exactly like a resolved one.
        let matchup = manual_matchup(&local_tag, display_name(&tag), &tag);
        let opponent_key = matchup.opponent_key();

        let engine = AnalyticsEngine::new(&db);
        let profile = engine.profile(&opponent_key, None).await?;

        println!("\nOpponent: {}", profile.opponent_tag);
        println!(
            "  Record: {}W/{}L ({})",
            profile.win_rate.wins,
            profile.win_rate.losses,
            format_win_rate(profile.win_rate.percentage()),
        );
        for map in &profile.favorite_maps {
            println!("  Map: {} ({} games)", map.map, map.games);
        }
        match &profile.typical_opening {
            Some(pattern) => {
                println!("  Opening: {} (seen {} times)", pattern.name, pattern.occurrences)
            }
            None => println!("  Opening: no build orders on record"),
        }
        for m in &profile.recent_matches {
            println!(
                "  {} on {}: {:?}",
                format_timestamp(m.game_date),
                m.map,
                m.outcome,
            );
        }

        let steps = db.recent_build_steps(&opponent_key, 8).await?;
        for s in &steps {
            println!("  [{}] {} ({})", format_game_clock(s.time_seconds), s.name, s.kind);
        }
    }

    Ok(())
}
