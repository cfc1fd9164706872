//! Misc-file tree diff

use crate::diff::ops::{MiscBuilder, MiscItem, ModificationCondition};
use crate::error::DiffError;
use crate::inspect::ComparisonHasher;
use crate::optional::OptionalPaths;
use crate::tree::ContentNode;
use std::collections::BTreeMap;
use tracing::trace;

/// Inputs shared by the whole misc diff
pub struct MiscDiff<'a> {
    pub hasher: &'a ComparisonHasher,
    pub optional_paths: &'a OptionalPaths,
}

impl MiscDiff<'_> {
    /// Diff two optional nodes and everything below them
    ///
    /// Added directories are flattened into their leaves, removed ones are
    /// reported as a single directory removal.
    pub fn compare<B: MiscBuilder + ?Sized>(
        &self,
        builder: &mut B,
        original: Option<ContentNode<'_>>,
        updated: Option<ContentNode<'_>>,
    ) -> Result<(), DiffError> {
        match (original, updated) {
            (None, None) => Ok(()),
            (None, Some(updated)) => {
                if updated.is_leaf() {
                    trace!(path = %updated.relative_path(), "Added file");
                    let hash = updated.metadata_hash()?;
                    builder.add_file(misc_item(&updated, false), hash, self.condition(&updated));
                    Ok(())
                } else {
                    for child in updated.children() {
                        self.compare(builder, None, Some(child))?;
                    }
                    Ok(())
                }
            }
            (Some(original), None) => {
                trace!(path = %original.relative_path(), "Removed");
                let hash = original.metadata_hash()?;
                let item = misc_item(&original, !original.is_leaf());
                builder.remove_file(item, hash, self.condition(&original));
                Ok(())
            }
            (Some(original), Some(updated)) => self.compare_present(builder, original, updated),
        }
    }

    fn compare_present<B: MiscBuilder + ?Sized>(
        &self,
        builder: &mut B,
        original: ContentNode<'_>,
        updated: ContentNode<'_>,
    ) -> Result<(), DiffError> {
        if original != updated {
            return Err(DiffError::NodeMismatch {
                original: original.relative_path(),
                updated: updated.relative_path(),
            });
        }
        if original.is_leaf() != updated.is_leaf() {
            return Err(DiffError::KindMismatch {
                path: original.relative_path(),
                original: kind_name(&original),
                updated: kind_name(&updated),
            });
        }

        if original.is_leaf() {
            let original_hash = self.hasher.comparison_hash(&original)?;
            let updated_hash = self.hasher.comparison_hash(&updated)?;
            if original_hash != updated_hash {
                trace!(path = %original.relative_path(), "Modified file");
                builder.modify_file(
                    misc_item(&original, false),
                    original.metadata_hash()?,
                    updated.metadata_hash()?,
                    self.condition(&original),
                );
            }
            return Ok(());
        }

        let mut remaining: BTreeMap<&str, ContentNode<'_>> =
            updated.children().map(|child| (child.name(), child)).collect();
        for child in original.children() {
            let counterpart = remaining.remove(child.name());
            self.compare(builder, Some(child), counterpart)?;
        }
        for child in remaining.into_values() {
            self.compare(builder, None, Some(child))?;
        }
        Ok(())
    }

    fn condition(&self, node: &ContentNode<'_>) -> Option<ModificationCondition> {
        self.optional_paths.condition_for(&node.path_segments())
    }
}

fn misc_item(node: &ContentNode<'_>, directory: bool) -> MiscItem {
    let path = node.parent_segments().into_iter().map(String::from).collect();
    if directory {
        MiscItem::directory(node.name(), path)
    } else {
        MiscItem::file(node.name(), path)
    }
}

fn kind_name(node: &ContentNode<'_>) -> &'static str {
    if node.is_leaf() {
        "a file"
    } else {
        "a directory"
    }
}
