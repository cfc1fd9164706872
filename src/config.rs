//! Configuration System
//!
//! Patch configuration loaded with the `config` crate. Sources merge in this
//! order, later ones winning: built-in defaults, the user's global file, the
//! patch configuration file, then `PATCHGEN__*` environment variables.

use crate::error::ApiError;
use crate::inspect::{ComparisonHasher, DEFAULT_INTERNAL_MODULE_PREFIX};
use crate::logging::LoggingConfig;
use crate::optional::{OptionalPathRule, OptionalPaths};
use crate::diff::{Target, DEFAULT_VERSION_MODULE};
use crate::patch::ElementDeclaration;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

mod facade;
mod merge;
mod sources;

pub use facade::ConfigLoader;
pub use sources::global_file::global_config_path;

/// Root configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PatchGenConfig {
    /// Patch identity and options
    #[serde(default)]
    pub patch: PatchSection,

    /// Layers and add-ons the patch may change
    #[serde(default)]
    pub elements: Vec<ElementConfig>,

    /// Misc paths that may be absent from the target install
    #[serde(default)]
    pub optional_paths: Vec<OptionalPathRule>,

    /// Comparison hashing settings
    #[serde(default)]
    pub hashing: HashingConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Kind of patch to produce
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PatchType {
    #[default]
    OneOff,
    Cumulative,
}

impl fmt::Display for PatchType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PatchType::OneOff => write!(f, "one-off"),
            PatchType::Cumulative => write!(f, "cumulative"),
        }
    }
}

/// `[patch]` section
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PatchSection {
    #[serde(default)]
    pub id: String,

    #[serde(default)]
    pub description: Option<String>,

    #[serde(rename = "type", default)]
    pub patch_type: PatchType,

    /// Product name the original distribution must report
    #[serde(default)]
    pub applies_to_product: Option<String>,

    /// Version the original distribution must report
    #[serde(default)]
    pub applies_to_version: Option<String>,

    /// Also patch the product and version modules
    #[serde(default)]
    pub include_version: bool,
}

/// A layer or add-on declared in `[[elements]]`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElementConfig {
    pub name: String,

    #[serde(default)]
    pub add_on: bool,

    #[serde(default)]
    pub id: Option<String>,

    #[serde(default)]
    pub description: Option<String>,
}

impl ElementConfig {
    pub fn target(&self) -> Target {
        if self.add_on {
            Target::AddOn(self.name.clone())
        } else {
            Target::Layer(self.name.clone())
        }
    }
}

/// `[hashing]` section
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HashingConfig {
    /// Compare by metadata hash only
    #[serde(default)]
    pub raw: bool,

    #[serde(default = "default_internal_module_prefix")]
    pub internal_module_prefix: String,

    #[serde(default = "default_version_module")]
    pub version_module: String,
}

fn default_internal_module_prefix() -> String {
    DEFAULT_INTERNAL_MODULE_PREFIX.to_string()
}

fn default_version_module() -> String {
    DEFAULT_VERSION_MODULE.to_string()
}

impl Default for HashingConfig {
    fn default() -> Self {
        Self {
            raw: false,
            internal_module_prefix: default_internal_module_prefix(),
            version_module: default_version_module(),
        }
    }
}

/// Configuration validation errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    Patch(String),
    Element(String, String),
    OptionalPath(String, String),
    Hashing(String),
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::Patch(msg) => write!(f, "Patch: {}", msg),
            ValidationError::Element(name, msg) => write!(f, "Element '{}': {}", name, msg),
            ValidationError::OptionalPath(path, msg) => {
                write!(f, "Optional path '{}': {}", path, msg)
            }
            ValidationError::Hashing(msg) => write!(f, "Hashing: {}", msg),
        }
    }
}

impl std::error::Error for ValidationError {}

impl PatchGenConfig {
    /// Validate the entire configuration, reporting every problem
    pub fn validate(&self) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();

        if self.patch.id.trim().is_empty() {
            errors.push(ValidationError::Patch("id cannot be empty".to_string()));
        }

        let mut seen = HashSet::new();
        for element in &self.elements {
            if element.name.trim().is_empty() {
                errors.push(ValidationError::Element(
                    element.name.clone(),
                    "name cannot be empty".to_string(),
                ));
            } else if !seen.insert(element.target()) {
                errors.push(ValidationError::Element(
                    element.name.clone(),
                    format!("declared twice as {}", element.target()),
                ));
            }
        }

        for rule in &self.optional_paths {
            if rule.path.trim_matches(|c| c == '/' || c == ' ').is_empty() {
                errors.push(ValidationError::OptionalPath(
                    rule.path.clone(),
                    "path cannot be empty".to_string(),
                ));
            }
            if let Some(requires) = &rule.requires {
                if requires.trim_matches(|c| c == '/' || c == ' ').is_empty() {
                    errors.push(ValidationError::OptionalPath(
                        rule.path.clone(),
                        "requires cannot be empty".to_string(),
                    ));
                }
            }
        }

        if self.hashing.internal_module_prefix.trim().is_empty() {
            errors.push(ValidationError::Hashing(
                "internal_module_prefix cannot be empty".to_string(),
            ));
        }
        if self.hashing.version_module.trim().is_empty() {
            errors.push(ValidationError::Hashing(
                "version_module cannot be empty".to_string(),
            ));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// Validate, folding every error into one [`ApiError`]
    pub fn ensure_valid(&self) -> Result<(), ApiError> {
        self.validate().map_err(|errors| {
            let error_msgs: Vec<String> = errors.iter().map(|e| e.to_string()).collect();
            ApiError::ConfigError(format!(
                "Configuration validation failed:\n{}",
                error_msgs.join("\n")
            ))
        })
    }

    /// Cumulative patches always carry the version modules
    pub fn include_version(&self) -> bool {
        self.patch.include_version || self.patch.patch_type == PatchType::Cumulative
    }

    pub fn element_declarations(&self) -> Vec<ElementDeclaration> {
        self.elements
            .iter()
            .map(|element| ElementDeclaration {
                target: element.target(),
                id: element.id.clone(),
                description: element.description.clone(),
            })
            .collect()
    }

    pub fn optional_paths(&self) -> OptionalPaths {
        OptionalPaths::new(&self.optional_paths)
    }

    /// Comparison hasher; raw mode is on if either the config or `raw` asks
    pub fn comparison_hasher(&self, raw: bool) -> ComparisonHasher {
        ComparisonHasher::new()
            .with_raw(raw || self.hashing.raw)
            .with_internal_prefix(self.hashing.internal_module_prefix.clone())
    }
}
