//! Patch archive writer
//!
//! Content is staged in a temporary working directory and then packed into
//! the output zip:
//!
//! ```text
//! patch.json
//! <patch-id>/misc/<path>            added and modified misc files
//! <element-id>/modules/<a/b>/<slot>  added and modified modules
//! <element-id>/bundles/<a/b>/<slot>  added and modified bundles
//! ```

use crate::diff::{PatchOperation, Target};
use crate::distribution::{Distribution, ProcessedLayer};
use crate::error::ApiError;
use crate::patch::{Patch, PatchElement};
use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use tracing::{debug, info, instrument};
use walkdir::WalkDir;
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipWriter};

/// Name of the patch descriptor inside the archive
pub const PATCH_DESCRIPTOR: &str = "patch.json";

const MISC_DIR: &str = "misc";
const MODULES_DIR: &str = "modules";
const BUNDLES_DIR: &str = "bundles";

/// Write `patch` with its new content taken from `updated` into `output`
///
/// The working directory is removed when this returns, whether it succeeds
/// or not.
#[instrument(skip(patch, updated), fields(patch = %patch.id, output = %output.display()))]
pub fn write_patch(patch: &Patch, updated: &Distribution, output: &Path) -> Result<PathBuf, ApiError> {
    let work_dir = TempDir::new()?;
    debug!(work_dir = %work_dir.path().display(), "Staging patch content");

    stage_patch(patch, updated, work_dir.path())?;

    if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    let entries = pack_directory(work_dir.path(), output)?;

    info!(entries, operations = patch.operation_count(), "Wrote patch");
    Ok(output.to_path_buf())
}

/// Write the descriptor and copy new content below `work_dir`
pub fn stage_patch(patch: &Patch, updated: &Distribution, work_dir: &Path) -> Result<(), ApiError> {
    let descriptor = File::create(work_dir.join(PATCH_DESCRIPTOR))?;
    let mut writer = BufWriter::new(descriptor);
    serde_json::to_writer_pretty(&mut writer, patch)
        .map_err(|e| ApiError::OutputError(format!("cannot write patch descriptor: {}", e)))?;
    writer.flush()?;

    let misc_dir = work_dir.join(&patch.id).join(MISC_DIR);
    for operation in &patch.misc {
        if let PatchOperation::AddFile { item, .. } | PatchOperation::ModifyFile { item, .. } = operation {
            let relative = item.relative_path();
            copy_content(&updated.root().join(&relative), &misc_dir.join(&relative))?;
        }
    }

    for element in &patch.elements {
        stage_element(element, updated, &work_dir.join(&element.id))?;
    }
    Ok(())
}

fn stage_element(element: &PatchElement, updated: &Distribution, element_dir: &Path) -> Result<(), ApiError> {
    let layer = match &element.target {
        Target::Layer(name) => updated.layer(name),
        Target::AddOn(name) => updated.add_on(name),
    };

    for operation in &element.operations {
        let (name, slot, bundle) = match operation {
            PatchOperation::AddModule { name, slot, .. }
            | PatchOperation::ModifyModule { name, slot, .. } => (name, slot, false),
            PatchOperation::AddBundle { name, slot, .. }
            | PatchOperation::ModifyBundle { name, slot, .. } => (name, slot, true),
            _ => continue,
        };
        let source = item_source(layer, name, slot, bundle).ok_or_else(|| {
            ApiError::OutputError(format!(
                "{}:{} not found in {} of the updated distribution",
                name, slot, element.target
            ))
        })?;
        let kind_dir = if bundle { BUNDLES_DIR } else { MODULES_DIR };
        let destination = element_dir
            .join(kind_dir)
            .join(name.replace('.', "/"))
            .join(slot);
        copy_content(&source, &destination)?;
    }
    Ok(())
}

fn item_source(layer: Option<&ProcessedLayer>, name: &str, slot: &str, bundle: bool) -> Option<PathBuf> {
    let layer = layer?;
    let set = if bundle { &layer.bundles } else { &layer.modules };
    let full_name = format!("{}:{}", name, slot);
    set.get(&full_name).map(|entry| entry.node().fs_path().to_path_buf())
}

/// Copy a file, or a directory with everything below it
fn copy_content(source: &Path, destination: &Path) -> Result<(), ApiError> {
    if source.is_file() {
        if let Some(parent) = destination.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::copy(source, destination)?;
        return Ok(());
    }

    for entry in WalkDir::new(source).sort_by_file_name() {
        let entry = entry.map_err(|e| ApiError::IoError(io::Error::new(io::ErrorKind::Other, e.to_string())))?;
        let relative = entry
            .path()
            .strip_prefix(source)
            .map_err(|e| ApiError::OutputError(e.to_string()))?;
        let target = destination.join(relative);
        if entry.file_type().is_dir() {
            fs::create_dir_all(&target)?;
        } else {
            fs::copy(entry.path(), &target)?;
        }
    }
    Ok(())
}

/// Zip the contents of `dir` into `output`, returning the number of entries
fn pack_directory(dir: &Path, output: &Path) -> Result<usize, ApiError> {
    let file = File::create(output)
        .map_err(|e| ApiError::OutputError(format!("cannot create {}: {}", output.display(), e)))?;
    let mut zip = ZipWriter::new(BufWriter::new(file));
    let options = FileOptions::default().compression_method(CompressionMethod::Deflated);

    let mut count = 0;
    for entry in WalkDir::new(dir).min_depth(1).sort_by_file_name() {
        let entry = entry.map_err(|e| ApiError::IoError(io::Error::new(io::ErrorKind::Other, e.to_string())))?;
        let relative = entry
            .path()
            .strip_prefix(dir)
            .map_err(|e| ApiError::OutputError(e.to_string()))?;
        let name = relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/");

        if entry.file_type().is_dir() {
            zip.add_directory(format!("{}/", name), options)?;
        } else {
            zip.start_file(name, options)?;
            let mut source = File::open(entry.path())?;
            io::copy(&mut source, &mut zip)?;
        }
        count += 1;
    }

    let mut writer = zip.finish()?;
    writer.flush()?;
    Ok(count)
}
