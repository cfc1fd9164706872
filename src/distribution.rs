//! Scanned application server installations
//!
//! A [`Distribution`] splits an installation into the three parts the diff
//! engine compares separately: layers, add-ons and everything else (the misc
//! tree).

pub mod identity;
pub mod layers;

pub use identity::{parse_version_text, ProductIdentity};
pub use layers::{ItemLayout, ModuleEntry, ModuleItem, ModuleSet, ProcessedLayer};

use crate::error::ApiError;
use crate::tree::walker::WalkerConfig;
use crate::tree::{ContentTree, TreeBuilder};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{info, instrument};

/// Module paths left out of module sets unless the version is patched
pub const VERSION_MODULE_PATHS: [&str; 2] = ["org/jboss/as/product", "org/jboss/as/version"];

/// Paths excluded from the misc tree, relative to the installation root
pub const MISC_EXCLUDED_PATHS: [&str; 3] = ["modules/system", "bundles/system", ".installation"];

/// Options controlling what a scan picks up
#[derive(Debug, Clone, Default)]
pub struct ScanOptions {
    /// Slash-separated module paths, relative to a layer, left out of module sets
    pub ignored_module_paths: Vec<String>,
}

impl ScanOptions {
    /// Options for a run that does or does not patch the version modules
    pub fn for_version(include_version: bool) -> Self {
        let ignored_module_paths = if include_version {
            Vec::new()
        } else {
            VERSION_MODULE_PATHS.iter().map(|p| p.to_string()).collect()
        };
        Self {
            ignored_module_paths,
        }
    }
}

/// A scanned installation
#[derive(Debug)]
pub struct Distribution {
    root: PathBuf,
    identity: ProductIdentity,
    layers: Vec<ProcessedLayer>,
    add_ons: Vec<ProcessedLayer>,
    misc: ContentTree,
}

impl Distribution {
    /// Scan the installation at `root`
    #[instrument(skip(root, options), fields(root = %root.display()))]
    pub fn scan(root: &Path, options: &ScanOptions) -> Result<Self, ApiError> {
        let start = Instant::now();
        if !root.is_dir() {
            return Err(ApiError::InvalidDistribution {
                path: root.to_path_buf(),
                message: "not a directory".to_string(),
            });
        }

        let identity = identity::read_identity(root)?;
        let ignored = &options.ignored_module_paths;

        let mut layer_list = Vec::new();
        for name in layers::read_layer_names(root)? {
            layer_list.push(ProcessedLayer::scan(
                &name,
                &root.join(layers::MODULE_LAYERS_DIR).join(&name),
                &root.join(layers::BUNDLE_LAYERS_DIR).join(&name),
                ignored,
            )?);
        }

        let mut add_on_names = layers::list_add_ons(&root.join(layers::MODULE_ADD_ONS_DIR))?;
        for name in layers::list_add_ons(&root.join(layers::BUNDLE_ADD_ONS_DIR))? {
            if !add_on_names.contains(&name) {
                add_on_names.push(name);
            }
        }
        add_on_names.sort();

        let mut add_ons = Vec::new();
        for name in add_on_names {
            add_ons.push(ProcessedLayer::scan(
                &name,
                &root.join(layers::MODULE_ADD_ONS_DIR).join(&name),
                &root.join(layers::BUNDLE_ADD_ONS_DIR).join(&name),
                ignored,
            )?);
        }

        let misc = TreeBuilder::new(root.to_path_buf())
            .with_walker_config(WalkerConfig::excluding(MISC_EXCLUDED_PATHS))
            .build()?;

        info!(
            name = %identity.name,
            version = %identity.version,
            layers = layer_list.len(),
            add_ons = add_ons.len(),
            misc_nodes = misc.len(),
            duration_ms = start.elapsed().as_millis(),
            "Scanned distribution"
        );

        Ok(Self {
            root: misc.root_path().to_path_buf(),
            identity,
            layers: layer_list,
            add_ons,
            misc,
        })
    }

    /// Canonical installation root
    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn identity(&self) -> &ProductIdentity {
        &self.identity
    }

    pub fn name(&self) -> &str {
        &self.identity.name
    }

    pub fn version(&self) -> &str {
        &self.identity.version
    }

    /// Layer names in discovery order
    pub fn layer_names(&self) -> Vec<String> {
        self.layers.iter().map(|l| l.name.clone()).collect()
    }

    pub fn layer(&self, name: &str) -> Option<&ProcessedLayer> {
        self.layers.iter().find(|l| l.name == name)
    }

    /// Add-on names, sorted
    pub fn add_on_names(&self) -> Vec<String> {
        self.add_ons.iter().map(|a| a.name.clone()).collect()
    }

    pub fn add_on(&self, name: &str) -> Option<&ProcessedLayer> {
        self.add_ons.iter().find(|a| a.name == name)
    }

    /// Everything outside the module and bundle repositories
    pub fn misc_tree(&self) -> &ContentTree {
        &self.misc
    }
}
