mod assembler;
mod resolver;
mod scanner;

pub use assembler::assemble_teams;
pub use resolver::{manual_matchup, resolve_from_buffer, resolve_teams};
pub use scanner::scan_identity_tokens;
