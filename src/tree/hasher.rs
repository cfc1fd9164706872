//! Raw metadata hashing for filesystem content using BLAKE3
//!
//! The metadata hash identifies bytes exactly as they sit on disk. It never
//! includes the absolute location of the content, so the same file or
//! directory placed under two different distribution roots hashes the same.

use crate::error::HashError;
use crate::types::Hash;
use blake3::Hasher;
use std::fs::File;
use std::io::{self, BufReader};
use std::path::Path;
use std::sync::OnceLock;
use walkdir::WalkDir;

static RAW_HASHES: OnceLock<bool> = OnceLock::new();

/// Force every comparison to use metadata hashes only.
///
/// Set once at startup; later calls are ignored and return `false`.
pub fn set_raw_hashes(raw: bool) -> bool {
    RAW_HASHES.set(raw).is_ok()
}

/// Whether the process-wide raw hashing mode is on
pub fn raw_hashes() -> bool {
    RAW_HASHES.get().copied().unwrap_or(false)
}

/// Compute content hash for file bytes
pub fn compute_content_hash(content: &[u8]) -> Hash {
    let mut hasher = Hasher::new();
    hasher.update(content);
    *hasher.finalize().as_bytes()
}

/// Stream a file through BLAKE3
pub fn hash_file(path: &Path) -> Result<Hash, HashError> {
    let file = File::open(path).map_err(|e| HashError::io(path, e))?;
    let mut hasher = Hasher::new();
    io::copy(&mut BufReader::new(file), &mut hasher).map_err(|e| HashError::io(path, e))?;
    Ok(*hasher.finalize().as_bytes())
}

/// Hash a file or a whole directory
///
/// Directory hash = hash("directory" || for each entry sorted by relative path:
/// kind || path_len || path || content_hash).
pub fn hash_path(path: &Path) -> Result<Hash, HashError> {
    let metadata = std::fs::symlink_metadata(path).map_err(|e| HashError::io(path, e))?;
    if !metadata.is_dir() {
        if metadata.file_type().is_symlink() {
            return hash_symlink(path);
        }
        return hash_file(path);
    }

    let mut hasher = Hasher::new();
    hasher.update(b"directory");

    for entry in WalkDir::new(path).min_depth(1).sort_by_file_name() {
        let entry = entry.map_err(|e| {
            let entry_path = e.path().unwrap_or(path).to_path_buf();
            HashError::io(entry_path, io::Error::new(io::ErrorKind::Other, e.to_string()))
        })?;
        let relative = relative_key(path, entry.path());
        let file_type = entry.file_type();

        if file_type.is_dir() {
            hasher.update(b"d");
            hash_key(&mut hasher, &relative);
        } else if file_type.is_symlink() {
            hasher.update(b"l");
            hash_key(&mut hasher, &relative);
            hasher.update(&hash_symlink(entry.path())?);
        } else {
            hasher.update(b"f");
            hash_key(&mut hasher, &relative);
            hasher.update(&hash_file(entry.path())?);
        }
    }

    Ok(*hasher.finalize().as_bytes())
}

fn hash_symlink(path: &Path) -> Result<Hash, HashError> {
    let target = std::fs::read_link(path).map_err(|e| HashError::io(path, e))?;
    Ok(compute_content_hash(target.to_string_lossy().as_bytes()))
}

fn hash_key(hasher: &mut Hasher, key: &str) {
    hasher.update(&(key.len() as u64).to_be_bytes());
    hasher.update(key.as_bytes());
}

/// Relative path with `/` separators regardless of platform
fn relative_key(root: &Path, path: &Path) -> String {
    let relative = path.strip_prefix(root).unwrap_or(path);
    relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}
