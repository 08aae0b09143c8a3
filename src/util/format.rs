/// Format a Unix timestamp as YYYY-MM-DD string
pub fn format_timestamp(timestamp: i64) -> String {
    use time::OffsetDateTime;
    use time::macros::format_description;

    if timestamp == 0 {
        return "unknown".to_string();
    }

    OffsetDateTime::from_unix_timestamp(timestamp)
        .ok()
        .and_then(|dt| {
            let format = format_description!("[year]-[month]-[day]");
            dt.format(&format).ok()
        })
        .unwrap_or_else(|| "unknown".to_string())
}

/// Render a win percentage. An undefined rate (no games on record) reads
/// "not available", never 0%.
pub fn format_win_rate(percentage: Option<f64>) -> String {
    match percentage {
        Some(pct) => format!("{:.1}%", pct),
        None => "not available".to_string(),
    }
}

/// Format seconds of in-match time as an m:ss game clock.
pub fn format_game_clock(seconds: i64) -> String {
    format!("{}:{:02}", seconds / 60, seconds % 60)
}
