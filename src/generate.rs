//! Patch generation runs
//!
//! A run scans both distributions, checks that they belong together and match
//! what the configuration targets, diffs them and writes the patch.

use crate::config::{PatchGenConfig, PatchType};
use crate::diff::{compare_distributions, DiffOptions};
use crate::distribution::{Distribution, ScanOptions};
use crate::error::ApiError;
use crate::patch::{write_patch, Patch, PatchBuilder, PatchIdentity};
use crate::tree::hasher;
use chrono::Utc;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{info, instrument, warn};

/// Inputs of one run
#[derive(Debug, Clone)]
pub struct GenerateRequest {
    pub config: PatchGenConfig,
    /// Installation the patch applies to
    pub applies_to_dist: PathBuf,
    /// Installation the patch turns it into
    pub updated_dist: PathBuf,
    /// Defaults to `<updated_dist>/patch-<millis>.zip`
    pub output_file: Option<PathBuf>,
    /// Patch the version modules even for one-off patches
    pub include_version: bool,
    /// Compare by metadata hash only
    pub raw_hashes: bool,
}

impl GenerateRequest {
    pub fn new(config: PatchGenConfig, applies_to_dist: PathBuf, updated_dist: PathBuf) -> Self {
        Self {
            config,
            applies_to_dist,
            updated_dist,
            output_file: None,
            include_version: false,
            raw_hashes: false,
        }
    }

    pub fn include_version(&self) -> bool {
        self.include_version || self.config.include_version()
    }

    fn diff_options(&self) -> DiffOptions {
        let raw = self.raw_hashes || hasher::raw_hashes();
        DiffOptions {
            hasher: self.config.comparison_hasher(raw),
            optional_paths: self.config.optional_paths(),
            include_version: self.include_version(),
            version_module: self.config.hashing.version_module.clone(),
        }
    }
}

/// Result of a run that wrote a patch
#[derive(Debug)]
pub struct GenerateOutcome {
    pub patch: Patch,
    pub output: PathBuf,
}

/// Default output location for a patch of `updated_dist`
pub fn default_output_path(updated_dist: &Path) -> PathBuf {
    updated_dist.join(format!("patch-{}.zip", Utc::now().timestamp_millis()))
}

/// Generate and write a patch
#[instrument(skip(request), fields(patch = %request.config.patch.id))]
pub fn generate(request: &GenerateRequest) -> Result<GenerateOutcome, ApiError> {
    let start = Instant::now();
    let (patch, updated) = build_patch(request)?;

    let output = request
        .output_file
        .clone()
        .unwrap_or_else(|| default_output_path(&request.updated_dist));
    let output = write_patch(&patch, &updated, &output)?;

    info!(
        output = %output.display(),
        operations = patch.operation_count(),
        duration_ms = start.elapsed().as_millis(),
        "Generated patch"
    );
    Ok(GenerateOutcome { patch, output })
}

/// Compute the patch without writing any content
#[instrument(skip(request), fields(patch = %request.config.patch.id))]
pub fn diff_only(request: &GenerateRequest) -> Result<Patch, ApiError> {
    build_patch(request).map(|(patch, _)| patch)
}

fn build_patch(request: &GenerateRequest) -> Result<(Patch, Distribution), ApiError> {
    let config = &request.config;
    config.ensure_valid()?;

    let scan_options = ScanOptions::for_version(request.include_version());
    let original = Distribution::scan(&request.applies_to_dist, &scan_options)?;
    let updated = Distribution::scan(&request.updated_dist, &scan_options)?;

    let identity = resolve_identity(config, &original, &updated)?;
    info!(%identity, "Resolved patch identity");

    let mut builder = PatchBuilder::new(config.patch.id.clone(), identity)
        .with_description(config.patch.description.clone())
        .declare_all(config.element_declarations());

    compare_distributions(&mut builder, &original, &updated, &request.diff_options())?;

    Ok((builder.build(), updated))
}

/// Check both distributions against each other and the configuration
pub fn resolve_identity(
    config: &PatchGenConfig,
    original: &Distribution,
    updated: &Distribution,
) -> Result<PatchIdentity, ApiError> {
    if original.name() != updated.name() {
        return Err(ApiError::DistributionMismatch {
            expected: original.name().to_string(),
            actual: updated.name().to_string(),
        });
    }
    if let Some(product) = &config.patch.applies_to_product {
        if product != original.name() {
            return Err(ApiError::TargetMismatch {
                expected: product.clone(),
                actual: original.name().to_string(),
            });
        }
    }
    if let Some(version) = &config.patch.applies_to_version {
        if version != original.version() {
            return Err(ApiError::TargetVersionMismatch {
                expected: version.clone(),
                actual: original.version().to_string(),
            });
        }
    }

    let identity = match config.patch.patch_type {
        PatchType::OneOff => PatchIdentity::OneOff {
            name: original.name().to_string(),
            version: original.version().to_string(),
        },
        PatchType::Cumulative => {
            if original.version() == updated.version() {
                warn!(
                    version = %original.version(),
                    "Cumulative patch does not change the version"
                );
            }
            PatchIdentity::Upgrade {
                name: original.name().to_string(),
                version: original.version().to_string(),
                to_version: updated.version().to_string(),
            }
        }
    };
    Ok(identity)
}
