//! CLI domain: parse, route, help, output, and presentation only.
//! No domain orchestration; single route table dispatches to domain services.

mod help;
mod output;
mod parse;
mod presentation;
mod route;

pub use help::command_name;
pub use output::map_error;
pub use parse::{Cli, Commands, DiffInputs};
pub use presentation::{
    format_generate_summary, format_hash_result, format_patch, format_patch_json,
    format_patch_text,
};
pub use route::RunContext;
