//! CLI parse: clap types for patch-gen. No behavior; definitions only.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// patch-gen CLI - Incremental patches from two server distributions
#[derive(Parser)]
#[command(name = "patch-gen")]
#[command(about = "Generate incremental patches by diffing two application server distributions")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose logging (default: off)
    #[arg(long, global = true, default_value = "false")]
    pub verbose: bool,

    /// Log level (trace, debug, info, warn, error, off)
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Log format (json, text)
    #[arg(long, global = true)]
    pub log_format: Option<String>,

    /// Log output (stdout, stderr, file)
    #[arg(long, global = true)]
    pub log_output: Option<String>,

    /// Log file path (if output is "file")
    #[arg(long, global = true)]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Diff two distributions and write a patch archive
    Generate {
        #[command(flatten)]
        inputs: DiffInputs,

        /// Patch archive to write (default: <updated-dist>/patch-<millis>.zip)
        #[arg(long, value_parser = parse_output_file)]
        output_file: Option<PathBuf>,
    },
    /// Diff two distributions and print the operations
    Diff {
        #[command(flatten)]
        inputs: DiffInputs,

        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
    },
    /// Print the metadata and comparison hash of a file or directory
    Hash {
        /// File or directory to hash
        #[arg(value_parser = parse_existing_path)]
        path: PathBuf,

        /// Logical module name, for module directories
        #[arg(long)]
        module_name: Option<String>,

        /// Compare by metadata hash only
        #[arg(long)]
        raw_hashes: bool,
    },
}

/// Inputs shared by generate and diff
#[derive(Args, Debug, Clone)]
pub struct DiffInputs {
    /// Patch configuration file (TOML)
    #[arg(long, value_parser = parse_config_file)]
    pub patch_config: PathBuf,

    /// Installation the patch applies to
    #[arg(long, value_parser = parse_distribution_dir)]
    pub applies_to_dist: PathBuf,

    /// Installation holding the updated content
    #[arg(long, value_parser = parse_distribution_dir)]
    pub updated_dist: PathBuf,

    /// Also patch the product and version modules
    #[arg(long)]
    pub include_version: bool,

    /// Compare by metadata hash only
    #[arg(long)]
    pub raw_hashes: bool,
}

fn parse_distribution_dir(value: &str) -> Result<PathBuf, String> {
    let path = PathBuf::from(value);
    if path.is_dir() {
        Ok(path)
    } else {
        Err(format!("{} is not an existing directory", value))
    }
}

fn parse_config_file(value: &str) -> Result<PathBuf, String> {
    let path = PathBuf::from(value);
    if path.is_file() {
        Ok(path)
    } else {
        Err(format!("{} is not an existing file", value))
    }
}

fn parse_output_file(value: &str) -> Result<PathBuf, String> {
    let path = PathBuf::from(value);
    if path.is_dir() {
        Err(format!("{} is a directory", value))
    } else {
        Ok(path)
    }
}

fn parse_existing_path(value: &str) -> Result<PathBuf, String> {
    let path = PathBuf::from(value);
    if path.exists() {
        Ok(path)
    } else {
        Err(format!("{} does not exist", value))
    }
}
