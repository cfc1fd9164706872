//! Module-aware hashing for module descriptor directories
//!
//! The descriptor is digested structurally (namespace, element names,
//! attributes) while its declared resources are digested by content. Resource
//! paths themselves never enter the digest, so the same module laid out under
//! different roots hashes the same.

use crate::error::HashError;
use crate::inspect::archive::{self, is_archive_name};
use crate::tree::hasher;
use crate::types::Hash;
use blake3::Hasher;
use quick_xml::events::{BytesStart, Event};
use quick_xml::name::ResolveResult;
use quick_xml::NsReader;
use std::io::BufRead;
use std::path::Path;
use tracing::{debug, instrument};

/// Descriptor file marking a module directory
pub const MODULE_DESCRIPTOR: &str = "module.xml";

/// Directory of native libraries shipped with a module
pub const NATIVE_LIB_DIR: &str = "lib";

const RESOURCES_ELEMENT: &[u8] = b"resources";
const RESOURCE_ROOT_ELEMENT: &[u8] = b"resource-root";

/// Compute the comparison hash of a module directory
///
/// Modules outside `internal_prefix` are compared byte for byte: the
/// `metadata_hash` is returned unchanged.
#[instrument(skip(metadata_hash), fields(module = %module_name))]
pub fn module_hash(
    module_dir: &Path,
    module_name: &str,
    internal_prefix: &str,
    metadata_hash: Hash,
) -> Result<Hash, HashError> {
    if !module_name.starts_with(internal_prefix) {
        debug!("Module outside internal prefix, using metadata hash");
        return Ok(metadata_hash);
    }

    let descriptor = module_dir.join(MODULE_DESCRIPTOR);
    if !descriptor.is_file() {
        return Err(HashError::descriptor(&descriptor, "not a module directory"));
    }

    let mut digest = Hasher::new();
    let resources = digest_descriptor(&descriptor, &mut digest)?;

    for resource_path in &resources {
        let resource = module_dir.join(resource_path);
        if !resource.exists() {
            return Err(HashError::ResourceNotFound(resource));
        }
        if is_archive_name(resource_path) {
            archive::digest_archive_into(&resource, &mut digest)?;
        } else {
            digest.update(&hasher::hash_path(&resource)?);
        }
    }

    let native = module_dir.join(NATIVE_LIB_DIR);
    if native.exists() {
        digest.update(&hasher::hash_path(&native)?);
    }

    Ok(*digest.finalize().as_bytes())
}

/// Digest a module descriptor and collect its resource-root paths
///
/// Resource paths are returned in declaration order with duplicates removed.
pub fn digest_descriptor(descriptor: &Path, digest: &mut Hasher) -> Result<Vec<String>, HashError> {
    let mut reader = NsReader::from_file(descriptor)
        .map_err(|e| HashError::descriptor(descriptor, e.to_string()))?;
    let mut walker = DescriptorWalker {
        path: descriptor,
        buf: Vec::new(),
        resources: Vec::new(),
    };
    walker.process_root(&mut reader, digest)?;
    Ok(walker.resources)
}

/// Element-level event of the descriptor, with text and comments dropped
enum Tag {
    Open {
        local_name: Vec<u8>,
        namespace: Vec<u8>,
        attributes: Vec<(Vec<u8>, String)>,
        empty: bool,
    },
    Close,
    Eof,
}

struct DescriptorWalker<'p> {
    path: &'p Path,
    buf: Vec<u8>,
    resources: Vec<String>,
}

impl DescriptorWalker<'_> {
    fn process_root<R: BufRead>(
        &mut self,
        reader: &mut NsReader<R>,
        digest: &mut Hasher,
    ) -> Result<(), HashError> {
        let Tag::Open {
            namespace,
            attributes,
            empty,
            ..
        } = self.next_tag(reader)?
        else {
            return Err(self.error("missing root element"));
        };

        digest.update(&namespace);
        digest_attributes(&attributes, digest);
        if !empty {
            self.process_children(reader, digest)?;
        }

        match self.next_tag(reader)? {
            Tag::Eof => Ok(()),
            _ => Err(self.error("content after root element")),
        }
    }

    fn process_children<R: BufRead>(
        &mut self,
        reader: &mut NsReader<R>,
        digest: &mut Hasher,
    ) -> Result<(), HashError> {
        loop {
            match self.next_tag(reader)? {
                Tag::Close => return Ok(()),
                Tag::Eof => return Err(self.error("unexpected end of document")),
                Tag::Open {
                    local_name,
                    attributes,
                    empty,
                    ..
                } => {
                    if local_name == RESOURCES_ELEMENT {
                        if !empty {
                            self.process_resources(reader)?;
                        }
                        continue;
                    }
                    digest.update(&local_name);
                    digest_attributes(&attributes, digest);
                    if !empty {
                        self.process_children(reader, digest)?;
                    }
                }
            }
        }
    }

    fn process_resources<R: BufRead>(&mut self, reader: &mut NsReader<R>) -> Result<(), HashError> {
        loop {
            match self.next_tag(reader)? {
                Tag::Close => return Ok(()),
                Tag::Eof => return Err(self.error("unexpected end of document")),
                Tag::Open {
                    local_name,
                    attributes,
                    empty,
                    ..
                } => {
                    if local_name != RESOURCE_ROOT_ELEMENT {
                        return Err(self.error(format!(
                            "unrecognized element {}",
                            String::from_utf8_lossy(&local_name)
                        )));
                    }
                    if attributes.len() != 1 {
                        return Err(self.error(format!(
                            "resource-root must have exactly one attribute, found {}",
                            attributes.len()
                        )));
                    }
                    let resource = attributes[0].1.trim().to_string();
                    if !self.resources.contains(&resource) {
                        self.resources.push(resource);
                    }
                    if !empty {
                        match self.next_tag(reader)? {
                            Tag::Close => {}
                            _ => return Err(self.error("unexpected element in resource-root")),
                        }
                    }
                }
            }
        }
    }

    fn next_tag<R: BufRead>(&mut self, reader: &mut NsReader<R>) -> Result<Tag, HashError> {
        loop {
            self.buf.clear();
            let (resolved, event) = reader
                .read_resolved_event_into(&mut self.buf)
                .map_err(|e| HashError::descriptor(self.path, e.to_string()))?;
            match event {
                Event::Start(start) => {
                    let namespace = namespace_bytes(&resolved);
                    return open_tag(self.path, &start, namespace, false);
                }
                Event::Empty(start) => {
                    let namespace = namespace_bytes(&resolved);
                    return open_tag(self.path, &start, namespace, true);
                }
                Event::End(_) => return Ok(Tag::Close),
                Event::Eof => return Ok(Tag::Eof),
                _ => continue,
            }
        }
    }

    fn error(&self, message: impl Into<String>) -> HashError {
        HashError::descriptor(self.path, message)
    }
}

fn namespace_bytes(resolved: &ResolveResult<'_>) -> Vec<u8> {
    match resolved {
        ResolveResult::Bound(namespace) => namespace.as_ref().to_vec(),
        _ => Vec::new(),
    }
}

fn open_tag(
    path: &Path,
    start: &BytesStart<'_>,
    namespace: Vec<u8>,
    empty: bool,
) -> Result<Tag, HashError> {
    let mut attributes = Vec::new();
    for attribute in start.attributes() {
        let attribute =
            attribute.map_err(|e| HashError::descriptor(path, e.to_string()))?;
        let key = attribute.key.as_ref();
        if key == b"xmlns" || key.starts_with(b"xmlns:") {
            continue;
        }
        let value = attribute
            .unescape_value()
            .map_err(|e| HashError::descriptor(path, e.to_string()))?
            .into_owned();
        attributes.push((attribute.key.local_name().as_ref().to_vec(), value));
    }
    Ok(Tag::Open {
        local_name: start.local_name().as_ref().to_vec(),
        namespace,
        attributes,
        empty,
    })
}

/// Digest attributes in declaration order: name bytes then value bytes
fn digest_attributes(attributes: &[(Vec<u8>, String)], digest: &mut Hasher) {
    for (name, value) in attributes {
        digest.update(name);
        digest.update(value.as_bytes());
    }
}
