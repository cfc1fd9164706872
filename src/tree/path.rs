//! Path canonicalization and normalization utilities

use crate::error::HashError;
use std::path::{Path, PathBuf};
use unicode_normalization::UnicodeNormalization;

/// Canonicalize a distribution root
///
/// Resolves symlinks, `..` and `.` so that relative segment computations are
/// stable, without the `\\?\` prefix on Windows.
pub fn canonicalize_path(path: &Path) -> Result<PathBuf, HashError> {
    dunce::canonicalize(path).map_err(|e| HashError::io(path, e))
}

/// Normalize a single path segment (Unicode NFC)
pub fn normalize_segment(segment: &str) -> String {
    segment.nfc().collect()
}

/// Normalize a slash-separated path string
///
/// Unicode is normalized to NFC, backslashes become `/`, and leading and
/// trailing separators are removed.
pub fn normalize_path_string(path: &str) -> String {
    let normalized: String = path.nfc().collect();
    let normalized = normalized.replace('\\', "/");
    normalized.trim_matches('/').to_string()
}

/// Split a slash-separated path into normalized, non-empty segments
pub fn split_segments(path: &str) -> Vec<String> {
    normalize_path_string(path)
        .split('/')
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
