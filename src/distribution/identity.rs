//! Product identity read from an installation's version file

use crate::error::ApiError;
use std::fs;
use std::path::Path;

/// File at the installation root naming the product and its version
pub const VERSION_FILE: &str = "version.txt";

/// Product name and version of an installation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductIdentity {
    pub name: String,
    pub version: String,
}

/// Parse the first non-blank line of a version file
///
/// The name is every word before the first token starting with a digit, that
/// token is the version. Trailing words are ignored.
pub fn parse_version_text(text: &str) -> Option<ProductIdentity> {
    let line = text.lines().map(str::trim).find(|line| !line.is_empty())?;
    let tokens: Vec<&str> = line.split_whitespace().collect();
    let index = tokens
        .iter()
        .position(|token| token.starts_with(|c: char| c.is_ascii_digit()))?;
    if index == 0 {
        return None;
    }

    Some(ProductIdentity {
        name: tokens[..index].join(" "),
        version: tokens[index].to_string(),
    })
}

/// Read the identity of the installation at `root`
pub fn read_identity(root: &Path) -> Result<ProductIdentity, ApiError> {
    let path = root.join(VERSION_FILE);
    let text = fs::read_to_string(&path).map_err(|e| ApiError::InvalidDistribution {
        path: path.clone(),
        message: format!("cannot read version file: {}", e),
    })?;

    parse_version_text(&text).ok_or_else(|| ApiError::InvalidDistribution {
        path,
        message: "version file does not contain '<name> <version>'".to_string(),
    })
}
