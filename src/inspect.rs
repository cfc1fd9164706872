//! Comparison hashing
//!
//! The comparison hash answers "did this meaningfully change". It dispatches on
//! what a node is: a module directory goes through the module-aware hasher, an
//! archive through the archive-aware hasher, anything else falls back to the
//! raw metadata hash. Comparison hashes are never cached, because a module's
//! result depends on the logical name it is reached under.

pub mod archive;
pub mod manifest;
pub mod module;

use crate::error::HashError;
use crate::tree::{hasher, ContentNode};
use crate::types::Hash;
use std::path::Path;
use tracing::trace;

/// Module name prefix that gets semantic descriptor analysis
pub const DEFAULT_INTERNAL_MODULE_PREFIX: &str = "org.jboss.as";

/// Computes comparison hashes for content nodes
#[derive(Debug, Clone)]
pub struct ComparisonHasher {
    raw: bool,
    internal_prefix: String,
}

impl Default for ComparisonHasher {
    fn default() -> Self {
        Self {
            raw: false,
            internal_prefix: DEFAULT_INTERNAL_MODULE_PREFIX.to_string(),
        }
    }
}

impl ComparisonHasher {
    /// Semantic hashing with the default internal module prefix
    pub fn new() -> Self {
        Self::default()
    }

    /// Hasher honoring the process-wide raw mode flag
    pub fn from_global() -> Self {
        Self::default().with_raw(hasher::raw_hashes())
    }

    /// Always use metadata hashes, skipping all normalization
    pub fn with_raw(mut self, raw: bool) -> Self {
        self.raw = raw;
        self
    }

    pub fn with_internal_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.internal_prefix = prefix.into();
        self
    }

    pub fn is_raw(&self) -> bool {
        self.raw
    }

    /// Comparison hash of a node
    ///
    /// A module directory's logical name is the dotted path of its parent chain
    /// within the node's tree.
    pub fn comparison_hash(&self, node: &ContentNode<'_>) -> Result<Hash, HashError> {
        if self.raw {
            return node.metadata_hash();
        }

        if !node.is_leaf() && node.fs_path().join(module::MODULE_DESCRIPTOR).is_file() {
            let module_name = node.parent_segments().join(".");
            trace!(module = %module_name, "Hashing module directory");
            return module::module_hash(
                node.fs_path(),
                &module_name,
                &self.internal_prefix,
                node.metadata_hash()?,
            );
        }

        if node.is_leaf() && archive::is_archive_name(node.name()) {
            trace!(archive = %node.relative_path(), "Hashing archive");
            return archive::archive_hash(node.fs_path());
        }

        node.metadata_hash()
    }

    /// Comparison hash of a path outside any scanned tree
    ///
    /// A module directory is hashed under `module_name`; without one it has no
    /// logical name and falls back to its metadata hash.
    pub fn path_hash(&self, path: &Path, module_name: Option<&str>) -> Result<Hash, HashError> {
        let metadata_hash = hasher::hash_path(path)?;
        if self.raw {
            return Ok(metadata_hash);
        }

        if path.is_dir() && path.join(module::MODULE_DESCRIPTOR).is_file() {
            return match module_name {
                Some(name) => module::module_hash(path, name, &self.internal_prefix, metadata_hash),
                None => Ok(metadata_hash),
            };
        }

        let is_archive = path
            .file_name()
            .map(|name| archive::is_archive_name(&name.to_string_lossy()))
            .unwrap_or(false);
        if path.is_file() && is_archive {
            return archive::archive_hash(path);
        }

        Ok(metadata_hash)
    }
}
