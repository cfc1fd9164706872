//! patch-gen CLI Binary
//!
//! Command-line interface for generating distribution patches.

use clap::Parser;
use patch_gen::cli::{Cli, Commands, RunContext};
use patch_gen::config::ConfigLoader;
use patch_gen::logging::{init_logging, LoggingConfig};
use std::process;
use tracing::{error, info};

fn main() {
    let cli = Cli::parse();

    // Build logging config from CLI args, env vars, and config file
    let logging_config = build_logging_config(&cli);

    // Initialize logging early
    if let Err(e) = init_logging(Some(&logging_config)) {
        eprintln!("Failed to initialize logging: {}", e);
        process::exit(1);
    }

    info!("patch-gen starting");

    let context = RunContext::new();
    match context.execute(&cli.command) {
        Ok(output) => {
            info!("Command completed successfully");
            println!("{}", output);
        }
        Err(e) => {
            error!("Command failed: {}", e);
            eprintln!("{}", patch_gen::cli::map_error(&e));
            process::exit(1);
        }
    }
}

/// Build logging configuration from CLI args, environment, and config file
fn build_logging_config(cli: &Cli) -> LoggingConfig {
    // If --verbose is not set, disable logging
    if !cli.verbose {
        return LoggingConfig::default();
    }

    let patch_config = match &cli.command {
        Commands::Generate { inputs, .. } | Commands::Diff { inputs, .. } => {
            Some(inputs.patch_config.clone())
        }
        Commands::Hash { .. } => None,
    };
    let mut config = patch_config
        .and_then(|path| ConfigLoader::load(&path).ok())
        .map(|c| c.logging)
        .unwrap_or_default();
    config.enabled = true;

    // Override with CLI arguments (highest priority)
    if let Some(ref level) = cli.log_level {
        config.level = level.clone();
    }
    if let Some(ref format) = cli.log_format {
        config.format = format.clone();
    }
    if let Some(ref output) = cli.log_output {
        config.output = output.clone();
    }
    if let Some(ref file) = cli.log_file {
        config.file = file.clone();
    }

    config
}
