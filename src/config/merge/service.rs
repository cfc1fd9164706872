//! MergeService: orchestrates sources, applies merge policy, deserializes to PatchGenConfig.

use crate::config::sources::{environment, global_file, patch_file};
use crate::config::PatchGenConfig;
use config::ConfigError;
use std::path::Path;
use tracing::debug;

use super::merge_policy;

/// Merge service for config composition.
pub struct MergeService;

impl MergeService {
    /// Load config from the patch file and standard sources.
    /// Precedence: defaults -> global file -> patch file -> environment (highest).
    pub fn load(patch_config: &Path) -> Result<PatchGenConfig, ConfigError> {
        let builder = merge_policy::builder_with_defaults()?;
        let builder = global_file::add_to_builder(builder)?;
        let builder = patch_file::add_to_builder(builder, patch_config)?;
        let builder = environment::add_to_builder(builder)?;

        let config = builder.build()?;
        debug!(path = %patch_config.display(), "Loaded patch configuration");
        config.try_deserialize()
    }

    /// Load config from a specific file with environment overlay.
    pub fn load_from_file(path: &Path) -> Result<PatchGenConfig, ConfigError> {
        let builder = merge_policy::builder_with_defaults()?;
        let builder = patch_file::add_to_builder(builder, path)?;
        let builder = environment::add_to_builder(builder)?;

        let config = builder.build()?;
        config.try_deserialize()
    }
}
