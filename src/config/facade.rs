//! ConfigLoader facade delegating to merge service.

use super::merge::service::MergeService;
use super::PatchGenConfig;
use config::ConfigError;
use std::path::Path;

/// Configuration loader facade.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load a patch configuration with the global file and environment.
    pub fn load(patch_config: &Path) -> Result<PatchGenConfig, ConfigError> {
        MergeService::load(patch_config)
    }

    /// Load a patch configuration with the environment only.
    pub fn load_from_file(path: &Path) -> Result<PatchGenConfig, ConfigError> {
        MergeService::load_from_file(path)
    }

    /// Create default configuration.
    pub fn default() -> PatchGenConfig {
        PatchGenConfig::default()
    }
}
