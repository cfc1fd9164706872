//! Merge rules: defaults, override order, conflict handling.

use crate::diff::DEFAULT_VERSION_MODULE;
use crate::inspect::DEFAULT_INTERNAL_MODULE_PREFIX;
use config::Config;
use config::ConfigBuilder;
use config::ConfigError;

/// Create a Config builder with merge policy defaults applied.
pub fn builder_with_defaults() -> Result<ConfigBuilder<config::builder::DefaultState>, ConfigError>
{
    Config::builder()
        .set_default("patch.type", "one-off")?
        .set_default("patch.include_version", false)?
        .set_default("hashing.raw", false)?
        .set_default("hashing.internal_module_prefix", DEFAULT_INTERNAL_MODULE_PREFIX)?
        .set_default("hashing.version_module", DEFAULT_VERSION_MODULE)
}
