//! Layer, add-on and module discovery

use crate::error::{ApiError, HashError};
use crate::inspect::module::MODULE_DESCRIPTOR;
use crate::inspect::ComparisonHasher;
use crate::tree::walker::WalkerConfig;
use crate::tree::{ContentNode, ContentTree, NodeId, TreeBuilder};
use crate::types::Hash;
use std::collections::HashSet;
use std::fs;
use std::path::Path;
use tracing::{debug, instrument};

/// Layer every installation has, always ordered last
pub const BASE_LAYER: &str = "base";

/// Layer configuration file, relative to the installation root
pub const LAYERS_CONF: &str = "modules/layers.conf";

/// Root of layered modules
pub const MODULE_LAYERS_DIR: &str = "modules/system/layers";
/// Root of module add-ons
pub const MODULE_ADD_ONS_DIR: &str = "modules/system/add-ons";
/// Root of layered bundles
pub const BUNDLE_LAYERS_DIR: &str = "bundles/system/layers";
/// Root of bundle add-ons
pub const BUNDLE_ADD_ONS_DIR: &str = "bundles/system/add-ons";

/// Layer names in override order, `base` last
pub fn read_layer_names(root: &Path) -> Result<Vec<String>, ApiError> {
    let path = root.join(LAYERS_CONF);
    let mut names = if path.is_file() {
        parse_layers_conf(&fs::read_to_string(&path)?)
    } else {
        Vec::new()
    };
    if !names.iter().any(|name| name == BASE_LAYER) {
        names.push(BASE_LAYER.to_string());
    }
    Ok(names)
}

/// Parse the `layers=` property of a layers.conf file
pub fn parse_layers_conf(text: &str) -> Vec<String> {
    let mut names: Vec<String> = Vec::new();
    for line in text.lines().map(str::trim) {
        if line.starts_with('#') {
            continue;
        }
        let Some((key, value)) = line.split_once('=') else {
            continue;
        };
        if key.trim() != "layers" {
            continue;
        }
        for name in value.split(',').map(str::trim).filter(|n| !n.is_empty()) {
            if !names.iter().any(|existing| existing == name) {
                names.push(name.to_string());
            }
        }
    }
    names
}

/// Sorted directory names directly below `dir`; empty if it does not exist
pub fn list_add_ons(dir: &Path) -> Result<Vec<String>, ApiError> {
    if !dir.is_dir() {
        return Ok(Vec::new());
    }
    let mut names = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        if entry.file_type()?.is_dir() {
            names.push(entry.file_name().to_string_lossy().into_owned());
        }
    }
    names.sort();
    Ok(names)
}

/// A module or bundle found in a layer or add-on
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleItem {
    pub name: String,
    pub slot: String,
    node: NodeId,
}

impl ModuleItem {
    /// `name:slot`, the identity used to pair items across distributions
    pub fn full_name(&self) -> String {
        format!("{}:{}", self.name, self.slot)
    }
}

/// A module item together with its content node
#[derive(Debug, Clone, Copy)]
pub struct ModuleEntry<'a> {
    item: &'a ModuleItem,
    node: ContentNode<'a>,
}

impl<'a> ModuleEntry<'a> {
    pub fn name(&self) -> &'a str {
        &self.item.name
    }

    pub fn slot(&self) -> &'a str {
        &self.item.slot
    }

    pub fn full_name(&self) -> String {
        self.item.full_name()
    }

    pub fn node(&self) -> ContentNode<'a> {
        self.node
    }

    pub fn metadata_hash(&self) -> Result<Hash, HashError> {
        self.node.metadata_hash()
    }

    pub fn comparison_hash(&self, hasher: &ComparisonHasher) -> Result<Hash, HashError> {
        hasher.comparison_hash(&self.node)
    }
}

/// How a directory qualifies as an item
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemLayout {
    /// Directory holding a module descriptor
    Module,
    /// Non-empty directory holding only files
    Bundle,
}

impl ItemLayout {
    fn matches(self, node: &ContentNode<'_>) -> bool {
        if node.is_leaf() || node.is_root() {
            return false;
        }
        match self {
            ItemLayout::Module => node
                .child(MODULE_DESCRIPTOR)
                .map(|descriptor| descriptor.is_leaf())
                .unwrap_or(false),
            ItemLayout::Bundle => {
                let mut children = node.children().peekable();
                children.peek().is_some() && children.all(|child| child.is_leaf())
            }
        }
    }
}

/// Modules or bundles of one layer or add-on, with the tree they live in
#[derive(Debug, Default)]
pub struct ModuleSet {
    tree: Option<ContentTree>,
    items: Vec<ModuleItem>,
}

impl ModuleSet {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Scan `dir` for items; a missing directory yields an empty set
    ///
    /// Item names come from the parent directory chain joined with dots, the
    /// slot from the item directory itself. Items are not searched for inside
    /// other items.
    #[instrument(skip(dir, ignored), fields(dir = %dir.display()))]
    pub fn scan(dir: &Path, layout: ItemLayout, ignored: &[String]) -> Result<Self, HashError> {
        if !dir.is_dir() {
            return Ok(Self::empty());
        }

        let tree = TreeBuilder::new(dir.to_path_buf())
            .with_walker_config(WalkerConfig::excluding(ignored.iter().cloned()))
            .build()?;

        let mut claimed: HashSet<NodeId> = HashSet::new();
        let mut items = Vec::new();
        for node in tree.nodes() {
            if !layout.matches(&node) || has_claimed_ancestor(&node, &claimed) {
                continue;
            }
            claimed.insert(node.id());
            items.push(ModuleItem {
                name: node.parent_segments().join("."),
                slot: node.name().to_string(),
                node: node.id(),
            });
        }
        debug!(count = items.len(), ?layout, "Scanned items");

        Ok(Self {
            tree: Some(tree),
            items,
        })
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn items(&self) -> &[ModuleItem] {
        &self.items
    }

    /// Items paired with their nodes, in discovery order
    pub fn entries(&self) -> impl Iterator<Item = ModuleEntry<'_>> {
        let tree = self.tree.as_ref();
        self.items.iter().filter_map(move |item| {
            tree.map(|tree| ModuleEntry {
                item,
                node: tree.node(item.node),
            })
        })
    }

    /// Look up an item by `name:slot`
    pub fn get(&self, full_name: &str) -> Option<ModuleEntry<'_>> {
        self.entries().find(|entry| entry.full_name() == full_name)
    }
}

fn has_claimed_ancestor(node: &ContentNode<'_>, claimed: &HashSet<NodeId>) -> bool {
    let mut current = node.parent();
    while let Some(parent) = current {
        if claimed.contains(&parent.id()) {
            return true;
        }
        current = parent.parent();
    }
    false
}

/// Modules and bundles of one layer or add-on
#[derive(Debug)]
pub struct ProcessedLayer {
    pub name: String,
    pub modules: ModuleSet,
    pub bundles: ModuleSet,
}

impl ProcessedLayer {
    pub fn scan(
        name: &str,
        modules_dir: &Path,
        bundles_dir: &Path,
        ignored: &[String],
    ) -> Result<Self, HashError> {
        Ok(Self {
            name: name.to_string(),
            modules: ModuleSet::scan(modules_dir, ItemLayout::Module, ignored)?,
            bundles: ModuleSet::scan(bundles_dir, ItemLayout::Bundle, &[])?,
        })
    }
}
