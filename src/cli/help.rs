//! CLI help and command-name contract for logging and routing.

use crate::cli::parse::Commands;

/// Command name string recorded in logs (e.g. "generate", "hash").
pub fn command_name(command: &Commands) -> &'static str {
    match command {
        Commands::Generate { .. } => "generate",
        Commands::Diff { .. } => "diff",
        Commands::Hash { .. } => "hash",
    }
}
