//! Patch operations and the builder interfaces that receive them

use crate::types::{hex_hash, Hash};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A named subdivision of a distribution holding modules and bundles
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(tag = "kind", content = "name", rename_all = "kebab-case")]
pub enum Target {
    Layer(String),
    AddOn(String),
}

impl Target {
    pub fn name(&self) -> &str {
        match self {
            Target::Layer(name) | Target::AddOn(name) => name,
        }
    }

    pub fn is_add_on(&self) -> bool {
        matches!(self, Target::AddOn(_))
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Target::Layer(name) => write!(f, "layer {}", name),
            Target::AddOn(name) => write!(f, "add-on {}", name),
        }
    }
}

/// How a layer or add-on changed between the two distributions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ElementChange {
    Add,
    Modify,
    Remove,
}

/// Module or bundle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ItemKind {
    Module,
    Bundle,
}

/// Misc file or directory reference: name plus parent path segments
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MiscItem {
    pub name: String,
    pub path: Vec<String>,
    pub directory: bool,
}

impl MiscItem {
    pub fn file(name: impl Into<String>, path: Vec<String>) -> Self {
        Self {
            name: name.into(),
            path,
            directory: false,
        }
    }

    pub fn directory(name: impl Into<String>, path: Vec<String>) -> Self {
        Self {
            name: name.into(),
            path,
            directory: true,
        }
    }

    /// Slash-separated path including the item name
    pub fn relative_path(&self) -> String {
        let mut segments = self.path.clone();
        segments.push(self.name.clone());
        segments.join("/")
    }
}

impl fmt::Display for MiscItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.relative_path())?;
        if self.directory {
            write!(f, "/")?;
        }
        Ok(())
    }
}

/// Condition under which a misc-file operation applies
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "item", rename_all = "kebab-case")]
pub enum ModificationCondition {
    /// Apply only if the item exists in the install being patched
    Exists(MiscItem),
}

impl fmt::Display for ModificationCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModificationCondition::Exists(item) => write!(f, "exists: {}", item.relative_path()),
        }
    }
}

/// One change recorded in a patch
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "kebab-case")]
pub enum PatchOperation {
    AddModule {
        target: Target,
        name: String,
        slot: String,
        #[serde(with = "hex_hash")]
        hash: Hash,
    },
    ModifyModule {
        target: Target,
        name: String,
        slot: String,
        #[serde(with = "hex_hash")]
        original_hash: Hash,
        #[serde(with = "hex_hash")]
        updated_hash: Hash,
    },
    RemoveModule {
        target: Target,
        name: String,
        slot: String,
        #[serde(with = "hex_hash")]
        original_hash: Hash,
    },
    AddBundle {
        target: Target,
        name: String,
        slot: String,
        #[serde(with = "hex_hash")]
        hash: Hash,
    },
    ModifyBundle {
        target: Target,
        name: String,
        slot: String,
        #[serde(with = "hex_hash")]
        original_hash: Hash,
        #[serde(with = "hex_hash")]
        updated_hash: Hash,
    },
    RemoveBundle {
        target: Target,
        name: String,
        slot: String,
        #[serde(with = "hex_hash")]
        original_hash: Hash,
    },
    AddFile {
        item: MiscItem,
        #[serde(with = "hex_hash")]
        hash: Hash,
        condition: Option<ModificationCondition>,
    },
    ModifyFile {
        item: MiscItem,
        #[serde(with = "hex_hash")]
        original_hash: Hash,
        #[serde(with = "hex_hash")]
        updated_hash: Hash,
        condition: Option<ModificationCondition>,
    },
    RemoveFile {
        item: MiscItem,
        #[serde(with = "hex_hash")]
        original_hash: Hash,
        condition: Option<ModificationCondition>,
    },
}

impl PatchOperation {
    /// Build an add operation for a module or bundle
    pub fn add(target: &Target, kind: ItemKind, name: &str, slot: &str, hash: Hash) -> Self {
        let (target, name, slot) = (target.clone(), name.to_string(), slot.to_string());
        match kind {
            ItemKind::Module => PatchOperation::AddModule { target, name, slot, hash },
            ItemKind::Bundle => PatchOperation::AddBundle { target, name, slot, hash },
        }
    }

    /// Build a modify operation for a module or bundle
    pub fn modify(
        target: &Target,
        kind: ItemKind,
        name: &str,
        slot: &str,
        original_hash: Hash,
        updated_hash: Hash,
    ) -> Self {
        let (target, name, slot) = (target.clone(), name.to_string(), slot.to_string());
        match kind {
            ItemKind::Module => PatchOperation::ModifyModule {
                target,
                name,
                slot,
                original_hash,
                updated_hash,
            },
            ItemKind::Bundle => PatchOperation::ModifyBundle {
                target,
                name,
                slot,
                original_hash,
                updated_hash,
            },
        }
    }

    /// Build a remove operation for a module or bundle
    pub fn remove(target: &Target, kind: ItemKind, name: &str, slot: &str, original_hash: Hash) -> Self {
        let (target, name, slot) = (target.clone(), name.to_string(), slot.to_string());
        match kind {
            ItemKind::Module => PatchOperation::RemoveModule {
                target,
                name,
                slot,
                original_hash,
            },
            ItemKind::Bundle => PatchOperation::RemoveBundle {
                target,
                name,
                slot,
                original_hash,
            },
        }
    }

    /// Layer or add-on the operation belongs to; None for misc files
    pub fn target(&self) -> Option<&Target> {
        match self {
            PatchOperation::AddModule { target, .. }
            | PatchOperation::ModifyModule { target, .. }
            | PatchOperation::RemoveModule { target, .. }
            | PatchOperation::AddBundle { target, .. }
            | PatchOperation::ModifyBundle { target, .. }
            | PatchOperation::RemoveBundle { target, .. } => Some(target),
            _ => None,
        }
    }
}

impl fmt::Display for PatchOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PatchOperation::AddModule { target, name, slot, .. } => {
                write!(f, "add module {}:{} ({})", name, slot, target)
            }
            PatchOperation::ModifyModule { target, name, slot, .. } => {
                write!(f, "modify module {}:{} ({})", name, slot, target)
            }
            PatchOperation::RemoveModule { target, name, slot, .. } => {
                write!(f, "remove module {}:{} ({})", name, slot, target)
            }
            PatchOperation::AddBundle { target, name, slot, .. } => {
                write!(f, "add bundle {}:{} ({})", name, slot, target)
            }
            PatchOperation::ModifyBundle { target, name, slot, .. } => {
                write!(f, "modify bundle {}:{} ({})", name, slot, target)
            }
            PatchOperation::RemoveBundle { target, name, slot, .. } => {
                write!(f, "remove bundle {}:{} ({})", name, slot, target)
            }
            PatchOperation::AddFile { item, condition, .. } => {
                write!(f, "add file {}", item)?;
                write_condition(f, condition)
            }
            PatchOperation::ModifyFile { item, condition, .. } => {
                write!(f, "modify file {}", item)?;
                write_condition(f, condition)
            }
            PatchOperation::RemoveFile { item, condition, .. } => {
                write!(f, "remove file {}", item)?;
                write_condition(f, condition)
            }
        }
    }
}

fn write_condition(
    f: &mut fmt::Formatter<'_>,
    condition: &Option<ModificationCondition>,
) -> fmt::Result {
    match condition {
        Some(condition) => write!(f, " [{}]", condition),
        None => Ok(()),
    }
}

/// Receives module and bundle operations for one layer or add-on
pub trait ElementBuilder {
    fn add(&mut self, kind: ItemKind, name: &str, slot: &str, hash: Hash);
    fn modify(&mut self, kind: ItemKind, name: &str, slot: &str, original: Hash, updated: Hash);
    fn remove(&mut self, kind: ItemKind, name: &str, slot: &str, original: Hash);
}

/// Receives misc-file operations
pub trait MiscBuilder {
    fn add_file(&mut self, item: MiscItem, hash: Hash, condition: Option<ModificationCondition>);
    fn modify_file(
        &mut self,
        item: MiscItem,
        original: Hash,
        updated: Hash,
        condition: Option<ModificationCondition>,
    );
    fn remove_file(&mut self, item: MiscItem, original: Hash, condition: Option<ModificationCondition>);
}

/// Patch under construction
pub trait PatchSink: MiscBuilder {
    /// Element builder for a layer or add-on
    ///
    /// Returns `None` when the patch configuration does not declare the target;
    /// any change inside it is then a configuration error.
    fn element(&mut self, target: &Target, change: ElementChange) -> Option<&mut dyn ElementBuilder>;
}
