//! Tree diff engine
//!
//! Compares two scanned distributions and reports every difference to a
//! [`PatchSink`]: misc files first, then layers, then add-ons. Layers and
//! add-ons are paired by name; inside each, modules and bundles are paired by
//! `name:slot`.

pub mod misc;
pub mod modules;
pub mod ops;

pub use misc::MiscDiff;
pub use modules::{compare_items, compare_layer, ModuleDiffSettings};
pub use ops::{
    ElementBuilder, ElementChange, ItemKind, MiscBuilder, MiscItem, ModificationCondition,
    PatchOperation, PatchSink, Target,
};

use crate::distribution::{Distribution, ProcessedLayer};
use crate::error::DiffError;
use crate::inspect::ComparisonHasher;
use crate::optional::OptionalPaths;
use std::time::Instant;
use tracing::{debug, info, instrument};

/// Reserved module carrying the product version
pub const DEFAULT_VERSION_MODULE: &str = "org.jboss.as.version";

/// Everything a distribution comparison needs besides the two sides
#[derive(Debug, Clone)]
pub struct DiffOptions {
    pub hasher: ComparisonHasher,
    pub optional_paths: OptionalPaths,
    pub include_version: bool,
    pub version_module: String,
}

impl Default for DiffOptions {
    fn default() -> Self {
        Self {
            hasher: ComparisonHasher::default(),
            optional_paths: OptionalPaths::default(),
            include_version: false,
            version_module: DEFAULT_VERSION_MODULE.to_string(),
        }
    }
}

impl DiffOptions {
    fn module_settings(&self) -> ModuleDiffSettings<'_> {
        ModuleDiffSettings {
            hasher: &self.hasher,
            include_version: self.include_version,
            version_module: &self.version_module,
        }
    }
}

/// Classify named sets
///
/// Names on both sides are modified, names only in `original` removed, both in
/// `original` order. Names only in `updated` are added, in `updated` order.
pub fn classify_names(original: &[String], updated: &[String]) -> Vec<(String, ElementChange)> {
    let mut remaining: Vec<&String> = updated.iter().collect();
    let mut changes = Vec::with_capacity(original.len() + updated.len());

    for name in original {
        if changes.iter().any(|(seen, _): &(String, ElementChange)| seen == name) {
            continue;
        }
        match remaining.iter().position(|candidate| *candidate == name) {
            Some(index) => {
                remaining.remove(index);
                changes.push((name.clone(), ElementChange::Modify));
            }
            None => changes.push((name.clone(), ElementChange::Remove)),
        }
    }
    for name in remaining {
        if !changes.iter().any(|(seen, _)| seen == name) {
            changes.push((name.clone(), ElementChange::Add));
        }
    }
    changes
}

/// Compare two distributions, reporting every change to `sink`
#[instrument(skip_all, fields(original = %original.root().display(), updated = %updated.root().display()))]
pub fn compare_distributions(
    sink: &mut dyn PatchSink,
    original: &Distribution,
    updated: &Distribution,
    options: &DiffOptions,
) -> Result<(), DiffError> {
    let start = Instant::now();

    let misc = MiscDiff {
        hasher: &options.hasher,
        optional_paths: &options.optional_paths,
    };
    misc.compare(
        sink,
        Some(original.misc_tree().root()),
        Some(updated.misc_tree().root()),
    )?;
    debug!("Compared misc files");

    compare_targets(
        sink,
        Target::Layer,
        &classify_names(&original.layer_names(), &updated.layer_names()),
        |name| original.layer(name),
        |name| updated.layer(name),
        options,
    )?;
    debug!("Compared layers");

    compare_targets(
        sink,
        Target::AddOn,
        &classify_names(&original.add_on_names(), &updated.add_on_names()),
        |name| original.add_on(name),
        |name| updated.add_on(name),
        options,
    )?;

    info!(duration_ms = start.elapsed().as_millis(), "Compared distributions");
    Ok(())
}

fn compare_targets<'d>(
    sink: &mut dyn PatchSink,
    make_target: fn(String) -> Target,
    changes: &[(String, ElementChange)],
    original: impl Fn(&str) -> Option<&'d ProcessedLayer>,
    updated: impl Fn(&str) -> Option<&'d ProcessedLayer>,
    options: &DiffOptions,
) -> Result<(), DiffError> {
    let settings = options.module_settings();
    for (name, change) in changes {
        let target = make_target(name.clone());
        let original_layer = match change {
            ElementChange::Add => None,
            _ => original(name),
        };
        let updated_layer = match change {
            ElementChange::Remove => None,
            _ => updated(name),
        };
        debug!(%target, ?change, "Comparing element");
        let element = sink.element(&target, *change);
        compare_layer(&target, element, original_layer, updated_layer, &settings)?;
    }
    Ok(())
}
