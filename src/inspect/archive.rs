//! Archive-aware hashing for jar-like archives
//!
//! Entries that a rebuild regenerates without a real change (signatures,
//! build provenance, generated logger classes, volatile manifest attributes)
//! are left out, and the remaining entries are digested in name order, so a
//! reordered or re-timestamped archive hashes the same.

use crate::error::HashError;
use crate::inspect::manifest::{self, MANIFEST_NAME};
use crate::types::Hash;
use blake3::Hasher;
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{self, BufReader, Read};
use std::path::Path;
use tracing::{instrument, trace};
use zip::ZipArchive;

/// File extension marking an archive
pub const ARCHIVE_EXTENSION: &str = ".jar";

const METADATA_DIR: &str = "META-INF/";
const PROVENANCE_DIR: &str = "META-INF/maven/";
const INDEX_LIST: &str = "META-INF/INDEX.LIST";
const SIGNATURE_SUFFIXES: &[&str] = &[".SF", ".DSA", ".RSA", ".EC"];
const PROVENANCE_SUFFIXES: &[&str] = &["/pom.properties", "/pom.xml", "/effective-pom.xml"];
const GENERATED_CLASS_SUFFIXES: &[&str] = &["_$bundle.class", "_$logger.class"];
const GENERATED_CLASS_INFIXES: &[&str] = &["_$bundle_", "_$logger_"];

/// Whether a file name marks an archive
pub fn is_archive_name(name: &str) -> bool {
    name.ends_with(ARCHIVE_EXTENSION)
}

/// Whether an archive entry is excluded from comparison hashing
pub fn is_ignored_entry(name: &str) -> bool {
    if name.starts_with(METADATA_DIR)
        && SIGNATURE_SUFFIXES.iter().any(|suffix| name.ends_with(suffix))
    {
        return true;
    }
    if name == INDEX_LIST {
        return true;
    }
    if name.starts_with(PROVENANCE_DIR)
        && PROVENANCE_SUFFIXES.iter().any(|suffix| name.ends_with(suffix))
    {
        return true;
    }
    if name.ends_with(".class") {
        return GENERATED_CLASS_SUFFIXES.iter().any(|s| name.ends_with(s))
            || GENERATED_CLASS_INFIXES.iter().any(|s| name.contains(s));
    }
    false
}

/// Compute the standalone comparison hash of an archive
pub fn archive_hash(path: &Path) -> Result<Hash, HashError> {
    let mut digest = Hasher::new();
    digest_archive_into(path, &mut digest)?;
    Ok(*digest.finalize().as_bytes())
}

/// Append the canonical entry hashes of an archive to a running digest
#[instrument(skip(digest), fields(archive = %path.display()))]
pub fn digest_archive_into(path: &Path, digest: &mut Hasher) -> Result<(), HashError> {
    let entries = canonical_entries(path)?;
    trace!(entry_count = entries.len(), "Digesting archive entries");
    for hash in entries.values() {
        digest.update(hash);
    }
    Ok(())
}

/// Retained entries of an archive, keyed and ordered by entry name
pub fn canonical_entries(path: &Path) -> Result<BTreeMap<String, Hash>, HashError> {
    let file = File::open(path).map_err(|e| HashError::io(path, e))?;
    let mut archive = ZipArchive::new(BufReader::new(file)).map_err(|source| {
        HashError::Archive {
            path: path.to_path_buf(),
            source,
        }
    })?;

    let mut entries = BTreeMap::new();
    let mut manifest_hash = None;

    for index in 0..archive.len() {
        let mut entry = archive.by_index(index).map_err(|source| HashError::Archive {
            path: path.to_path_buf(),
            source,
        })?;
        if entry.is_dir() {
            continue;
        }
        let name = entry.name().to_string();

        if name.eq_ignore_ascii_case(MANIFEST_NAME) {
            let mut content = Vec::new();
            entry
                .read_to_end(&mut content)
                .map_err(|e| HashError::io(path, e))?;
            manifest_hash = Some(manifest_digest(&content));
            continue;
        }
        if is_ignored_entry(&name) {
            trace!(entry = %name, "Skipping rebuild-only entry");
            continue;
        }

        let mut hasher = Hasher::new();
        io::copy(&mut entry, &mut hasher).map_err(|e| HashError::io(path, e))?;
        entries.insert(name, *hasher.finalize().as_bytes());
    }

    if let Some(hash) = manifest_hash {
        entries.insert(MANIFEST_NAME.to_string(), hash);
    }

    Ok(entries)
}

/// Digest the manifest main attributes that survive a plain rebuild
///
/// Attributes are digested sorted by name so that attribute order in the
/// manifest does not matter.
fn manifest_digest(content: &[u8]) -> Hash {
    let mut attributes: Vec<(String, String)> = manifest::main_attributes(content)
        .into_iter()
        .filter(|(name, _)| !manifest::is_ignored_attribute(name))
        .collect();
    attributes.sort_by(|a, b| a.0.to_ascii_lowercase().cmp(&b.0.to_ascii_lowercase()));

    let mut hasher = Hasher::new();
    for (name, value) in &attributes {
        hasher.update(name.as_bytes());
        hasher.update(value.as_bytes());
    }
    *hasher.finalize().as_bytes()
}
