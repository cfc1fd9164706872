//! Error types for distribution hashing, diffing and patch generation.

use crate::diff::Target;
use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while computing metadata or comparison hashes
#[derive(Debug, Error)]
pub enum HashError {
    #[error("I/O error on {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid module descriptor {path:?}: {message}")]
    Descriptor { path: PathBuf, message: String },

    #[error("Failed to read archive {path:?}: {source}")]
    Archive {
        path: PathBuf,
        #[source]
        source: zip::result::ZipError,
    },

    #[error("Module resource not found: {0:?}")]
    ResourceNotFound(PathBuf),
}

impl HashError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        HashError::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn descriptor(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        HashError::Descriptor {
            path: path.into(),
            message: message.into(),
        }
    }
}

/// Errors raised by the tree diff engine
#[derive(Debug, Error)]
pub enum DiffError {
    #[error("Missing patch-config for {0}")]
    MissingPatchConfig(Target),

    #[error("Cannot compare {original:?} with {updated:?}: items are not at the same position")]
    NodeMismatch { original: String, updated: String },

    #[error("Cannot compare {path:?}: {original} in the original distribution but {updated} in the updated one")]
    KindMismatch {
        path: String,
        original: &'static str,
        updated: &'static str,
    },

    #[error("Hash error: {0}")]
    Hash(#[from] HashError),
}

/// Errors for a full patch generation run
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Invalid distribution {path:?}: {message}")]
    InvalidDistribution { path: PathBuf, message: String },

    #[error("Distribution names don't match, expected: {expected}, but was {actual}")]
    DistributionMismatch { expected: String, actual: String },

    #[error("Patch target does not match, expected: {expected}, but was {actual}")]
    TargetMismatch { expected: String, actual: String },

    #[error("Patch target version does not match, expected: {expected}, but was {actual}")]
    TargetVersionMismatch { expected: String, actual: String },

    #[error("Failed to write patch: {0}")]
    OutputError(String),

    #[error("Diff error: {0}")]
    Diff(#[from] DiffError),

    #[error("Hash error: {0}")]
    Hash(#[from] HashError),

    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
}

impl From<config::ConfigError> for ApiError {
    fn from(err: config::ConfigError) -> Self {
        ApiError::ConfigError(err.to_string())
    }
}

impl From<zip::result::ZipError> for ApiError {
    fn from(err: zip::result::ZipError) -> Self {
        ApiError::OutputError(err.to_string())
    }
}
