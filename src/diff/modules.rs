//! Module and bundle set diff for one layer or add-on

use crate::diff::ops::{ElementBuilder, ItemKind, Target};
use crate::distribution::{ModuleEntry, ModuleSet, ProcessedLayer};
use crate::error::DiffError;
use crate::inspect::ComparisonHasher;
use std::collections::BTreeMap;
use tracing::{debug, trace};

/// Settings shared by every module set diff of a run
#[derive(Debug, Clone, Copy)]
pub struct ModuleDiffSettings<'a> {
    pub hasher: &'a ComparisonHasher,
    /// Force a modify of the version module when its bytes changed
    pub include_version: bool,
    pub version_module: &'a str,
}

/// Diff the modules and then the bundles of one layer or add-on
///
/// An absent side counts as empty. Any change requires `element`.
pub fn compare_layer(
    target: &Target,
    mut element: Option<&mut dyn ElementBuilder>,
    original: Option<&ProcessedLayer>,
    updated: Option<&ProcessedLayer>,
    settings: &ModuleDiffSettings<'_>,
) -> Result<(), DiffError> {
    let empty = ModuleSet::empty();
    compare_items(
        target,
        &mut element,
        ItemKind::Module,
        original.map(|l| &l.modules).unwrap_or(&empty),
        updated.map(|l| &l.modules).unwrap_or(&empty),
        settings,
    )?;
    compare_items(
        target,
        &mut element,
        ItemKind::Bundle,
        original.map(|l| &l.bundles).unwrap_or(&empty),
        updated.map(|l| &l.bundles).unwrap_or(&empty),
        settings,
    )
}

/// Diff two item sets, pairing items by `name:slot`
///
/// Removes and modifies follow the original side's order, adds come last
/// sorted by full name.
pub fn compare_items(
    target: &Target,
    element: &mut Option<&mut dyn ElementBuilder>,
    kind: ItemKind,
    original: &ModuleSet,
    updated: &ModuleSet,
    settings: &ModuleDiffSettings<'_>,
) -> Result<(), DiffError> {
    let mut remaining: BTreeMap<String, ModuleEntry<'_>> = updated
        .entries()
        .map(|entry| (entry.full_name(), entry))
        .collect();

    for original_entry in original.entries() {
        let name = original_entry.name();
        let slot = original_entry.slot();

        let Some(updated_entry) = remaining.remove(&original_entry.full_name()) else {
            debug!(%target, ?kind, item = %original_entry.full_name(), "Removed");
            let hash = original_entry.metadata_hash()?;
            require(target, element)?.remove(kind, name, slot, hash);
            continue;
        };

        let original_hash = original_entry.comparison_hash(settings.hasher)?;
        let updated_hash = updated_entry.comparison_hash(settings.hasher)?;
        if original_hash != updated_hash {
            debug!(%target, ?kind, item = %original_entry.full_name(), "Modified");
            let (before, after) = (original_entry.metadata_hash()?, updated_entry.metadata_hash()?);
            require(target, element)?.modify(kind, name, slot, before, after);
        } else if settings.include_version
            && kind == ItemKind::Module
            && name == settings.version_module
        {
            let (before, after) = (original_entry.metadata_hash()?, updated_entry.metadata_hash()?);
            if before != after {
                debug!(%target, item = %original_entry.full_name(), "Version module changed");
                require(target, element)?.modify(kind, name, slot, before, after);
            }
        } else {
            trace!(item = %original_entry.full_name(), "Unchanged");
        }
    }

    for (full_name, updated_entry) in remaining {
        debug!(%target, ?kind, item = %full_name, "Added");
        let hash = updated_entry.metadata_hash()?;
        require(target, element)?.add(kind, updated_entry.name(), updated_entry.slot(), hash);
    }

    Ok(())
}

fn require<'e, 'b>(
    target: &Target,
    element: &'e mut Option<&'b mut dyn ElementBuilder>,
) -> Result<&'e mut (dyn ElementBuilder + 'b), DiffError> {
    match element {
        Some(builder) => Ok(&mut **builder),
        None => Err(DiffError::MissingPatchConfig(target.clone())),
    }
}
