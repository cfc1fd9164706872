//! CLI route: single route table and run context. Dispatches to domain services and presentation.

use crate::config::{ConfigLoader, PatchGenConfig};
use crate::error::ApiError;
use crate::generate::{diff_only, generate, GenerateRequest};
use crate::inspect::ComparisonHasher;
use crate::tree::hasher;
use std::time::Instant;
use tracing::{debug, info};

use crate::cli::command_name;
use crate::cli::parse::{Commands, DiffInputs};
use crate::cli::presentation::{format_generate_summary, format_hash_result, format_patch};

/// Runtime context for CLI execution.
#[derive(Debug, Default)]
pub struct RunContext;

impl RunContext {
    pub fn new() -> Self {
        Self
    }

    /// Run a command, returning what to print on stdout.
    pub fn execute(&self, command: &Commands) -> Result<String, ApiError> {
        let started = Instant::now();
        let result = self.execute_inner(command);
        info!(
            command = command_name(command),
            ok = result.is_ok(),
            duration_ms = started.elapsed().as_millis(),
            "Command finished"
        );
        result
    }

    fn execute_inner(&self, command: &Commands) -> Result<String, ApiError> {
        match command {
            Commands::Generate {
                inputs,
                output_file,
            } => {
                let mut request = self.build_request(inputs)?;
                request.output_file = output_file.clone();
                let outcome = generate(&request)?;
                Ok(format_generate_summary(&outcome.patch, &outcome.output))
            }
            Commands::Diff { inputs, format } => {
                let request = self.build_request(inputs)?;
                let patch = diff_only(&request)?;
                format_patch(&patch, format)
            }
            Commands::Hash {
                path,
                module_name,
                raw_hashes,
            } => {
                hasher::set_raw_hashes(*raw_hashes);
                let comparison = ComparisonHasher::from_global()
                    .with_raw(*raw_hashes || hasher::raw_hashes())
                    .path_hash(path, module_name.as_deref())?;
                let metadata = hasher::hash_path(path)?;
                Ok(format_hash_result(path, &metadata, &comparison))
            }
        }
    }

    fn build_request(&self, inputs: &DiffInputs) -> Result<GenerateRequest, ApiError> {
        let config = load_patch_config(inputs)?;
        let raw = inputs.raw_hashes || config.hashing.raw;
        if !hasher::set_raw_hashes(raw) {
            debug!("Raw hashing mode already set");
        }

        let mut request = GenerateRequest::new(
            config,
            inputs.applies_to_dist.clone(),
            inputs.updated_dist.clone(),
        );
        request.include_version = inputs.include_version;
        request.raw_hashes = raw;
        Ok(request)
    }
}

/// Load and validate the patch configuration named on the command line.
pub fn load_patch_config(inputs: &DiffInputs) -> Result<PatchGenConfig, ApiError> {
    let config = ConfigLoader::load(&inputs.patch_config)?;
    config.ensure_valid()?;
    Ok(config)
}
