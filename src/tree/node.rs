//! Content tree nodes
//!
//! Nodes live in an arena owned by [`ContentTree`]. A node owns its children
//! through the arena and refers back to its parent by index only; the back
//! reference is used to rebuild paths, never to mutate.

use crate::error::HashError;
use crate::tree::hasher;
use crate::types::Hash;
use std::cell::OnceCell;
use std::fmt;
use std::path::{Path, PathBuf};

/// Index of a node inside its [`ContentTree`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

#[derive(Debug)]
struct NodeEntry {
    name: String,
    parent: Option<NodeId>,
    children: Vec<NodeId>, // sorted by name once the tree is built
    leaf: bool,
    fs_path: PathBuf,
    metadata_hash: OnceCell<Hash>,
}

/// File hierarchy of one scanned root
#[derive(Debug)]
pub struct ContentTree {
    nodes: Vec<NodeEntry>,
}

impl ContentTree {
    /// Create a tree holding only its root directory
    pub(crate) fn with_root(root_path: PathBuf) -> Self {
        Self {
            nodes: vec![NodeEntry {
                name: String::new(),
                parent: None,
                children: Vec::new(),
                leaf: false,
                fs_path: root_path,
                metadata_hash: OnceCell::new(),
            }],
        }
    }

    pub(crate) fn insert(
        &mut self,
        parent: NodeId,
        name: String,
        fs_path: PathBuf,
        leaf: bool,
    ) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(NodeEntry {
            name,
            parent: Some(parent),
            children: Vec::new(),
            leaf,
            fs_path,
            metadata_hash: OnceCell::new(),
        });
        self.nodes[parent.0].children.push(id);
        id
    }

    /// Order every child list by name
    pub(crate) fn sort_children(&mut self) {
        let names: Vec<String> = self.nodes.iter().map(|n| n.name.clone()).collect();
        for node in &mut self.nodes {
            node.children.sort_by(|a, b| names[a.0].cmp(&names[b.0]));
        }
    }

    /// The root directory node
    pub fn root(&self) -> ContentNode<'_> {
        ContentNode {
            tree: self,
            id: NodeId(0),
        }
    }

    /// Filesystem location of the root
    pub fn root_path(&self) -> &Path {
        &self.nodes[0].fs_path
    }

    pub fn node(&self, id: NodeId) -> ContentNode<'_> {
        ContentNode { tree: self, id }
    }

    /// Number of nodes, root included
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.len() == 1
    }

    /// Look up a node by its path segments below the root
    pub fn find<S: AsRef<str>>(&self, segments: &[S]) -> Option<ContentNode<'_>> {
        let mut current = self.root();
        for segment in segments {
            current = current.child(segment.as_ref())?;
        }
        Some(current)
    }

    /// Iterate over every node in insertion order (parents before children)
    pub fn nodes(&self) -> impl Iterator<Item = ContentNode<'_>> {
        (0..self.nodes.len()).map(move |i| ContentNode {
            tree: self,
            id: NodeId(i),
        })
    }

    fn entry(&self, id: NodeId) -> &NodeEntry {
        &self.nodes[id.0]
    }
}

/// Handle to a node of a [`ContentTree`]
///
/// Two handles are equal when they sit at the same position: same name and
/// same parent path, independent of content or of which tree they belong to.
#[derive(Clone, Copy)]
pub struct ContentNode<'t> {
    tree: &'t ContentTree,
    id: NodeId,
}

impl<'t> ContentNode<'t> {
    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn tree(&self) -> &'t ContentTree {
        self.tree
    }

    /// Path segment of this node; empty for the root
    pub fn name(&self) -> &'t str {
        &self.tree.entry(self.id).name
    }

    /// File (true) or directory (false)
    pub fn is_leaf(&self) -> bool {
        self.tree.entry(self.id).leaf
    }

    pub fn is_root(&self) -> bool {
        self.tree.entry(self.id).parent.is_none()
    }

    pub fn parent(&self) -> Option<ContentNode<'t>> {
        self.tree.entry(self.id).parent.map(|id| ContentNode {
            tree: self.tree,
            id,
        })
    }

    /// Children ordered by name; empty for leaves
    pub fn children(&self) -> impl Iterator<Item = ContentNode<'t>> + 't {
        let tree = self.tree;
        tree.entry(self.id)
            .children
            .iter()
            .map(move |&id| ContentNode { tree, id })
    }

    pub fn child(&self, name: &str) -> Option<ContentNode<'t>> {
        self.children().find(|c| c.name() == name)
    }

    /// Segments from the root (excluded) down to this node (included)
    pub fn path_segments(&self) -> Vec<&'t str> {
        let mut segments = Vec::new();
        let mut current = Some(*self);
        while let Some(node) = current {
            if node.is_root() {
                break;
            }
            segments.push(node.name());
            current = node.parent();
        }
        segments.reverse();
        segments
    }

    /// Segments of the parent chain, excluding this node
    pub fn parent_segments(&self) -> Vec<&'t str> {
        let mut segments = self.path_segments();
        segments.pop();
        segments
    }

    /// Slash-separated path relative to the root
    pub fn relative_path(&self) -> String {
        self.path_segments().join("/")
    }

    /// Dot-separated path relative to the root
    pub fn dotted_path(&self) -> String {
        self.path_segments().join(".")
    }

    /// Location of this node on disk
    pub fn fs_path(&self) -> &'t Path {
        &self.tree.entry(self.id).fs_path
    }

    /// Raw metadata hash, computed once and memoized
    pub fn metadata_hash(&self) -> Result<Hash, HashError> {
        let cell = &self.tree.entry(self.id).metadata_hash;
        if let Some(hash) = cell.get() {
            return Ok(*hash);
        }
        let hash = hasher::hash_path(self.fs_path())?;
        Ok(*cell.get_or_init(|| hash))
    }

    /// Whether the metadata hash has been computed already
    pub fn has_cached_metadata_hash(&self) -> bool {
        self.tree.entry(self.id).metadata_hash.get().is_some()
    }
}

impl PartialEq for ContentNode<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.path_segments() == other.path_segments()
    }
}

impl Eq for ContentNode<'_> {}

impl fmt::Debug for ContentNode<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ContentNode")
            .field("path", &self.relative_path())
            .field("leaf", &self.is_leaf())
            .finish()
    }
}
