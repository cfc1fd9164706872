//! Optional paths
//!
//! Some parts of an installation may be missing from the install a patch is
//! applied to (an uninstalled app client, removed docs). Misc-file operations
//! under such a path carry an existence condition so they are only applied
//! when the optional content is present.
//!
//! Declared paths compile into a trie. A segment ending in `*` matches by
//! prefix. Queries walk the trie without touching it, so one matcher serves
//! every diff call.

use crate::diff::{MiscItem, ModificationCondition};
use crate::tree::path::split_segments;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A declared optional path, with an alternate path whose presence decides
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OptionalPathRule {
    pub path: String,
    #[serde(default)]
    pub requires: Option<String>,
}

impl OptionalPathRule {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            requires: None,
        }
    }

    pub fn requiring(path: impl Into<String>, requires: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            requires: Some(requires.into()),
        }
    }
}

impl fmt::Display for OptionalPathRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.requires {
            Some(requires) => write!(f, "[{} requires {}]", self.path, requires),
            None => write!(f, "[{}]", self.path),
        }
    }
}

#[derive(Debug, Clone)]
struct PathTrieNode {
    /// Declared segment, `*` included
    segment: String,
    /// Segment without the trailing `*`
    name: String,
    wildcard: bool,
    children: Vec<PathTrieNode>,
    requires: Option<Vec<String>>,
}

impl PathTrieNode {
    fn new(segment: &str) -> Self {
        let (name, wildcard) = match segment.strip_suffix('*') {
            Some(prefix) => (prefix.to_string(), true),
            None => (segment.to_string(), false),
        };
        Self {
            segment: segment.to_string(),
            name,
            wildcard,
            children: Vec::new(),
            requires: None,
        }
    }

    fn matches(&self, segment: &str) -> bool {
        if self.wildcard {
            segment.starts_with(&self.name)
        } else {
            self.name == segment
        }
    }

    fn matching_child(&self, segment: &str) -> Option<&PathTrieNode> {
        self.children.iter().find(|child| child.matches(segment))
    }

    fn child_mut(&mut self, segment: &str) -> &mut PathTrieNode {
        let index = match self.children.iter().position(|c| c.segment == segment) {
            Some(index) => index,
            None => {
                self.children.push(PathTrieNode::new(segment));
                self.children.len() - 1
            }
        };
        &mut self.children[index]
    }
}

/// Compiled optional-path trie
#[derive(Debug, Clone)]
pub struct OptionalPaths {
    root: PathTrieNode,
}

impl Default for OptionalPaths {
    fn default() -> Self {
        Self {
            root: PathTrieNode::new("root"),
        }
    }
}

impl OptionalPaths {
    /// Compile declared rules into a trie
    pub fn new(rules: &[OptionalPathRule]) -> Self {
        let mut paths = Self::default();
        for rule in rules {
            paths.add(rule);
        }
        paths
    }

    pub fn add(&mut self, rule: &OptionalPathRule) {
        let segments = split_segments(&rule.path);
        if segments.is_empty() {
            return;
        }
        let mut node = &mut self.root;
        for segment in &segments {
            node = node.child_mut(segment);
        }
        if let Some(requires) = &rule.requires {
            let requires = split_segments(requires);
            if !requires.is_empty() {
                node.requires = Some(requires);
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.root.children.is_empty()
    }

    /// Existence condition for a misc item, given its path segments from the root
    ///
    /// The item's segments are matched top-down. Once the matched trie node has
    /// no further children, every deeper item inherits its condition. An item
    /// whose ancestor chain leaves the trie gets no condition.
    pub fn condition_for<S: AsRef<str>>(&self, segments: &[S]) -> Option<ModificationCondition> {
        if self.root.children.is_empty() || segments.is_empty() {
            return None;
        }

        let mut current = &self.root;
        let mut matched_path: Vec<String> = Vec::new();

        for (depth, segment) in segments.iter().enumerate() {
            if depth > 0 && current.children.is_empty() {
                break;
            }
            let child = current.matching_child(segment.as_ref())?;
            if depth > 0 {
                matched_path.push(current.name.clone());
            }
            current = child;
        }

        let item = match &current.requires {
            Some(requires) => {
                let (name, path) = requires
                    .split_last()
                    .map(|(name, path)| (name.clone(), path.to_vec()))
                    .unwrap_or_default();
                MiscItem::file(name, path)
            }
            None => MiscItem::directory(current.name.clone(), matched_path),
        };
        Some(ModificationCondition::Exists(item))
    }
}
