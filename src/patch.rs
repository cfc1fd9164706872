//! Patches: what changed between two distributions, grouped per element

pub mod builder;
pub mod writer;

pub use builder::{ElementDeclaration, PatchBuilder};
pub use writer::{write_patch, PATCH_DESCRIPTOR};

use crate::diff::{ElementChange, PatchOperation, Target};
use serde::{Deserialize, Serialize};
use std::fmt;

/// What installation a patch applies to, and what it turns it into
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum PatchIdentity {
    /// Fixes applied on top of a version, which stays the same
    OneOff { name: String, version: String },
    /// Cumulative patch moving the installation to a new version
    Upgrade {
        name: String,
        version: String,
        to_version: String,
    },
}

impl PatchIdentity {
    pub fn name(&self) -> &str {
        match self {
            PatchIdentity::OneOff { name, .. } | PatchIdentity::Upgrade { name, .. } => name,
        }
    }

    /// Version the patch applies to
    pub fn version(&self) -> &str {
        match self {
            PatchIdentity::OneOff { version, .. } | PatchIdentity::Upgrade { version, .. } => version,
        }
    }
}

impl fmt::Display for PatchIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PatchIdentity::OneOff { name, version } => write!(f, "one-off for {} {}", name, version),
            PatchIdentity::Upgrade {
                name,
                version,
                to_version,
            } => write!(f, "upgrade of {} {} to {}", name, version, to_version),
        }
    }
}

/// Changes to one layer or add-on
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatchElement {
    pub id: String,
    pub target: Target,
    pub change: ElementChange,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub operations: Vec<PatchOperation>,
}

/// A generated patch
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Patch {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub identity: PatchIdentity,
    pub misc: Vec<PatchOperation>,
    pub elements: Vec<PatchElement>,
}

impl Patch {
    /// Misc operations first, then each element's operations
    pub fn operations(&self) -> impl Iterator<Item = &PatchOperation> {
        self.misc
            .iter()
            .chain(self.elements.iter().flat_map(|e| e.operations.iter()))
    }

    pub fn operation_count(&self) -> usize {
        self.misc.len() + self.elements.iter().map(|e| e.operations.len()).sum::<usize>()
    }

    pub fn is_empty(&self) -> bool {
        self.operation_count() == 0
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}
