//! Content Tree
//!
//! In-memory view of a distribution's file hierarchy. Nodes are built once per
//! scan, never mutated afterwards, and hash lazily: the metadata hash of a node
//! is computed on first use and memoized.

pub mod builder;
pub mod hasher;
pub mod node;
pub mod path;
pub mod walker;

pub use builder::TreeBuilder;
pub use node::{ContentNode, ContentTree, NodeId};
