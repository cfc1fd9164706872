//! CLI presentation: text and json formatters per command.

use crate::error::ApiError;
use crate::patch::Patch;
use crate::types::{hash_hex, Hash};
use std::path::Path;

/// One line per operation, grouped per element
pub fn format_patch_text(patch: &Patch) -> String {
    let mut lines = vec![format!("Patch {} ({})", patch.id, patch.identity)];
    if patch.is_empty() {
        lines.push("  No changes".to_string());
        return lines.join("\n");
    }

    if !patch.misc.is_empty() {
        lines.push(format!("  Misc files ({}):", patch.misc.len()));
        for operation in &patch.misc {
            lines.push(format!("    - {}", operation));
        }
    }
    for element in &patch.elements {
        lines.push(format!(
            "  {} [{:?}] {} ({}):",
            element.target,
            element.change,
            element.id,
            element.operations.len()
        ));
        for operation in &element.operations {
            lines.push(format!("    - {}", operation));
        }
    }
    lines.join("\n")
}

pub fn format_patch_json(patch: &Patch) -> Result<String, ApiError> {
    patch
        .to_json()
        .map_err(|e| ApiError::OutputError(format!("cannot render patch: {}", e)))
}

pub fn format_patch(patch: &Patch, format: &str) -> Result<String, ApiError> {
    match format {
        "json" => format_patch_json(patch),
        "text" => Ok(format_patch_text(patch)),
        other => Err(ApiError::ConfigError(format!(
            "Invalid output format: {} (must be 'text' or 'json')",
            other
        ))),
    }
}

pub fn format_generate_summary(patch: &Patch, output: &Path) -> String {
    format!(
        "Patch {} written to {}\n  Identity: {}\n  Misc operations: {}\n  Elements: {}\n  Total operations: {}",
        patch.id,
        output.display(),
        patch.identity,
        patch.misc.len(),
        patch.elements.len(),
        patch.operation_count()
    )
}

pub fn format_hash_result(path: &Path, metadata_hash: &Hash, comparison_hash: &Hash) -> String {
    format!(
        "{}\n  metadata:   {}\n  comparison: {}",
        path.display(),
        hash_hex(metadata_hash),
        hash_hex(comparison_hash)
    )
}
