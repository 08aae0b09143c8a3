mod format;

pub use format::{format_game_clock, format_timestamp, format_win_rate};
