//! Tree builder for constructing content trees from a distribution root

use crate::error::HashError;
use crate::tree::node::{ContentTree, NodeId};
use crate::tree::path;
use crate::tree::walker::{Entry, Walker, WalkerConfig};
use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Instant;
use tracing::{debug, error, info, instrument};

/// Tree builder for constructing content trees
pub struct TreeBuilder {
    root: PathBuf,
    walker_config: Option<WalkerConfig>,
}

impl TreeBuilder {
    /// Create a new tree builder for the given root path
    pub fn new(root: PathBuf) -> Self {
        Self {
            root,
            walker_config: None,
        }
    }

    /// Set walker config (excluded paths, etc.). When set, the walker uses this
    /// config instead of the default.
    pub fn with_walker_config(mut self, config: WalkerConfig) -> Self {
        self.walker_config = Some(config);
        self
    }

    /// Scan the filesystem into a content tree
    ///
    /// No hashing happens here; nodes hash lazily when a diff asks for them.
    #[instrument(skip(self), fields(root = %self.root.display()))]
    pub fn build(&self) -> Result<ContentTree, HashError> {
        let start = Instant::now();

        let root = path::canonicalize_path(&self.root)?;
        if !root.is_dir() {
            error!("Content root is not a directory");
            return Err(HashError::io(
                &root,
                std::io::Error::new(std::io::ErrorKind::InvalidInput, "not a directory"),
            ));
        }

        let walker = match &self.walker_config {
            Some(config) => Walker::with_config(root.clone(), config.clone()),
            None => Walker::new(root.clone()),
        };
        let entries = walker.walk()?;
        debug!(entry_count = entries.len(), "Walked filesystem");

        let mut tree = ContentTree::with_root(root.clone());
        let mut node_map: HashMap<PathBuf, NodeId> = HashMap::new();
        node_map.insert(root.clone(), tree.root().id());

        // Entries come sorted by path, so every parent is inserted before its children.
        for entry in entries {
            let entry_path = entry.path().to_path_buf();
            let Some(parent_path) = entry_path.parent() else {
                continue;
            };
            let Some(&parent) = node_map.get(parent_path) else {
                debug!(path = %entry_path.display(), "Skipping entry with pruned parent");
                continue;
            };
            let name = entry_path
                .file_name()
                .map(|n| path::normalize_segment(&n.to_string_lossy()))
                .unwrap_or_default();
            let leaf = matches!(entry, Entry::File { .. });
            let id = tree.insert(parent, name, entry_path.clone(), leaf);
            if !leaf {
                node_map.insert(entry_path, id);
            }
        }

        tree.sort_children();

        info!(
            node_count = tree.len(),
            duration_ms = start.elapsed().as_millis(),
            "Content tree built"
        );

        Ok(tree)
    }
}
