//! Patch builder collecting diff operations

use crate::diff::{
    ElementBuilder, ElementChange, ItemKind, MiscBuilder, MiscItem, ModificationCondition,
    PatchOperation, PatchSink, Target,
};
use crate::patch::{Patch, PatchElement, PatchIdentity};
use crate::types::Hash;
use tracing::{debug, warn};

/// A layer or add-on the patch configuration allows to change
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementDeclaration {
    pub target: Target,
    pub id: Option<String>,
    pub description: Option<String>,
}

impl ElementDeclaration {
    pub fn new(target: Target) -> Self {
        Self {
            target,
            id: None,
            description: None,
        }
    }
}

/// Collects operations into a [`Patch`]
///
/// Element builders are only handed out for declared layers and add-ons.
#[derive(Debug)]
pub struct PatchBuilder {
    id: String,
    description: Option<String>,
    identity: PatchIdentity,
    declarations: Vec<ElementDeclaration>,
    elements: Vec<PatchElement>,
    misc: Vec<PatchOperation>,
}

impl PatchBuilder {
    pub fn new(id: impl Into<String>, identity: PatchIdentity) -> Self {
        Self {
            id: id.into(),
            description: None,
            identity,
            declarations: Vec::new(),
            elements: Vec::new(),
            misc: Vec::new(),
        }
    }

    pub fn with_description(mut self, description: Option<String>) -> Self {
        self.description = description;
        self
    }

    pub fn declare(mut self, declaration: ElementDeclaration) -> Self {
        self.declarations.push(declaration);
        self
    }

    pub fn declare_all(mut self, declarations: impl IntoIterator<Item = ElementDeclaration>) -> Self {
        self.declarations.extend(declarations);
        self
    }

    /// Finish the patch; elements without operations are dropped
    pub fn build(self) -> Patch {
        let elements: Vec<PatchElement> = self
            .elements
            .into_iter()
            .filter(|element| !element.operations.is_empty())
            .collect();
        debug!(
            misc = self.misc.len(),
            elements = elements.len(),
            "Built patch"
        );
        Patch {
            id: self.id,
            description: self.description,
            identity: self.identity,
            misc: self.misc,
            elements,
        }
    }

    fn element_id(&self, declaration: &ElementDeclaration) -> String {
        declaration.id.clone().unwrap_or_else(|| {
            let kind = match declaration.target {
                Target::Layer(_) => "layer",
                Target::AddOn(_) => "add-on",
            };
            format!("{}-{}-{}", kind, declaration.target.name(), self.id)
        })
    }
}

impl PatchSink for PatchBuilder {
    fn element(&mut self, target: &Target, change: ElementChange) -> Option<&mut dyn ElementBuilder> {
        let Some(declaration) = self.declarations.iter().find(|d| &d.target == target) else {
            debug!(%target, "No element declared");
            return None;
        };
        let declaration = declaration.clone();

        let index = match self.elements.iter().position(|e| &e.target == target) {
            Some(index) => {
                warn!(%target, "Element requested twice, reusing it");
                index
            }
            None => {
                let id = self.element_id(&declaration);
                self.elements.push(PatchElement {
                    id,
                    target: target.clone(),
                    change,
                    description: declaration.description,
                    operations: Vec::new(),
                });
                self.elements.len() - 1
            }
        };
        Some(&mut self.elements[index])
    }
}

impl MiscBuilder for PatchBuilder {
    fn add_file(&mut self, item: MiscItem, hash: Hash, condition: Option<ModificationCondition>) {
        self.misc.push(PatchOperation::AddFile {
            item,
            hash,
            condition,
        });
    }

    fn modify_file(
        &mut self,
        item: MiscItem,
        original: Hash,
        updated: Hash,
        condition: Option<ModificationCondition>,
    ) {
        self.misc.push(PatchOperation::ModifyFile {
            item,
            original_hash: original,
            updated_hash: updated,
            condition,
        });
    }

    fn remove_file(&mut self, item: MiscItem, original: Hash, condition: Option<ModificationCondition>) {
        self.misc.push(PatchOperation::RemoveFile {
            item,
            original_hash: original,
            condition,
        });
    }
}

impl ElementBuilder for PatchElement {
    fn add(&mut self, kind: ItemKind, name: &str, slot: &str, hash: Hash) {
        let operation = PatchOperation::add(&self.target, kind, name, slot, hash);
        self.operations.push(operation);
    }

    fn modify(&mut self, kind: ItemKind, name: &str, slot: &str, original: Hash, updated: Hash) {
        let operation = PatchOperation::modify(&self.target, kind, name, slot, original, updated);
        self.operations.push(operation);
    }

    fn remove(&mut self, kind: ItemKind, name: &str, slot: &str, original: Hash) {
        let operation = PatchOperation::remove(&self.target, kind, name, slot, original);
        self.operations.push(operation);
    }
}
