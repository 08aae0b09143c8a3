mod database;
mod parser;
mod sync;

pub use database::Database;
pub use parser::{ParsedReplay, ReplayParser, StepSummary, SummaryFileParser};
pub use sync::{CancelFlag, ReplaySync, SyncReport};

// Re-export the schema version for callers who need it
pub const SCHEMA_VERSION: &str = "1";
