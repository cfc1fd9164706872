//! Filesystem walker for traversing distribution roots

use crate::error::HashError;
use std::path::{Path, PathBuf};
use walkdir::{DirEntry, WalkDir};

/// Filesystem entry types
#[derive(Debug, Clone)]
pub enum Entry {
    /// A file entry with its path and size
    File { path: PathBuf, size: u64 },
    /// A directory entry with its path
    Directory { path: PathBuf },
}

impl Entry {
    pub fn path(&self) -> &Path {
        match self {
            Entry::File { path, .. } | Entry::Directory { path } => path,
        }
    }
}

/// Filesystem walker configuration
#[derive(Debug, Clone, Default)]
pub struct WalkerConfig {
    /// Whether to follow symbolic links (default: false for determinism)
    pub follow_symlinks: bool,
    /// Slash-separated paths, relative to the root, pruned with their subtrees
    pub excluded_paths: Vec<String>,
    /// Maximum depth to traverse (None = unlimited)
    pub max_depth: Option<usize>,
}

impl WalkerConfig {
    pub fn excluding<I, S>(paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            excluded_paths: paths.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }
}

/// Filesystem walker
pub struct Walker {
    root: PathBuf,
    config: WalkerConfig,
}

impl Walker {
    /// Create a new walker for the given root path
    pub fn new(root: PathBuf) -> Self {
        Self {
            root,
            config: WalkerConfig::default(),
        }
    }

    /// Create a walker with custom configuration
    pub fn with_config(root: PathBuf, config: WalkerConfig) -> Self {
        Self { root, config }
    }

    /// Walk the filesystem and collect all entries below the root
    ///
    /// Returns entries sorted by path, so a directory always precedes its
    /// contents.
    pub fn walk(&self) -> Result<Vec<Entry>, HashError> {
        let mut entries = Vec::new();

        let walker = WalkDir::new(&self.root)
            .follow_links(self.config.follow_symlinks)
            .max_depth(self.config.max_depth.unwrap_or(usize::MAX))
            .min_depth(1)
            .into_iter()
            .filter_entry(|entry| !self.should_ignore(entry));

        for entry in walker {
            let entry = entry.map_err(|e| {
                let path = e.path().unwrap_or(&self.root).to_path_buf();
                HashError::io(
                    path,
                    std::io::Error::new(std::io::ErrorKind::Other, e.to_string()),
                )
            })?;

            let path = entry.path().to_path_buf();
            let metadata = entry.metadata().map_err(|e| {
                HashError::io(
                    &path,
                    std::io::Error::new(std::io::ErrorKind::Other, e.to_string()),
                )
            })?;

            if metadata.is_dir() {
                entries.push(Entry::Directory { path });
            } else {
                entries.push(Entry::File {
                    path,
                    size: metadata.len(),
                });
            }
        }

        entries.sort_by(|a, b| a.path().cmp(b.path()));

        Ok(entries)
    }

    /// Check whether an entry lies inside one of the excluded paths
    fn should_ignore(&self, entry: &DirEntry) -> bool {
        let Ok(relative) = entry.path().strip_prefix(&self.root) else {
            return false;
        };
        let relative = relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/");

        self.config.excluded_paths.iter().any(|excluded| {
            relative == *excluded
                || (relative.starts_with(excluded.as_str())
                    && relative.as_bytes().get(excluded.len()) == Some(&b'/'))
        })
    }
}
