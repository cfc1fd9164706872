//! Integration tests for module-aware comparison hashing

use super::test_utils::{manifest, module_xml, write_jar};
use patch_gen::error::HashError;
use patch_gen::inspect::module::{digest_descriptor, module_hash};
use patch_gen::inspect::ComparisonHasher;
use patch_gen::tree::{hasher, TreeBuilder};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn write_module(dir: &Path, name: &str, jar_entries: &[(&str, &[u8])]) {
    fs::create_dir_all(dir).unwrap();
    fs::write(dir.join("module.xml"), module_xml(name, &["core.jar"])).unwrap();
    write_jar(&dir.join("core.jar"), jar_entries);
}

#[test]
fn test_module_hash_is_location_independent() {
    let first = TempDir::new().unwrap();
    let second = TempDir::new().unwrap();
    let entries: &[(&str, &[u8])] = &[("x/Core.class", b"core")];
    write_module(&first.path().join("a/deep/place"), "org.jboss.as.core", entries);
    write_module(&second.path().join("main"), "org.jboss.as.core", entries);

    let one = module_hash(
        &first.path().join("a/deep/place"),
        "org.jboss.as.core",
        "org.jboss.as",
        [0; 32],
    )
    .unwrap();
    let two = module_hash(
        &second.path().join("main"),
        "org.jboss.as.core",
        "org.jboss.as",
        [1; 32],
    )
    .unwrap();
    assert_eq!(one, two);
}

#[test]
fn test_rebuilt_jar_keeps_module_hash() {
    let first = TempDir::new().unwrap();
    let second = TempDir::new().unwrap();
    write_module(
        first.path(),
        "org.jboss.as.core",
        &[
            ("META-INF/MANIFEST.MF", &manifest(&[("Created-By", "jdk 11")])),
            ("x/Core.class", b"core"),
        ],
    );
    write_module(
        second.path(),
        "org.jboss.as.core",
        &[
            ("x/Core.class", b"core"),
            ("META-INF/MANIFEST.MF", &manifest(&[("Created-By", "jdk 17")])),
        ],
    );

    let one = module_hash(first.path(), "org.jboss.as.core", "org.jboss.as", [0; 32]).unwrap();
    let two = module_hash(second.path(), "org.jboss.as.core", "org.jboss.as", [0; 32]).unwrap();
    assert_eq!(one, two);
}

#[test]
fn test_changed_dependency_changes_module_hash() {
    let first = TempDir::new().unwrap();
    let second = TempDir::new().unwrap();
    let entries: &[(&str, &[u8])] = &[("x/Core.class", b"core")];
    write_module(first.path(), "org.jboss.as.core", entries);
    write_module(second.path(), "org.jboss.as.core", entries);
    let changed = module_xml("org.jboss.as.core", &["core.jar"]).replace("java.logging", "java.sql");
    fs::write(second.path().join("module.xml"), changed).unwrap();

    let one = module_hash(first.path(), "org.jboss.as.core", "org.jboss.as", [0; 32]).unwrap();
    let two = module_hash(second.path(), "org.jboss.as.core", "org.jboss.as", [0; 32]).unwrap();
    assert_ne!(one, two);
}

#[test]
fn test_native_lib_dir_is_digested() {
    let first = TempDir::new().unwrap();
    let second = TempDir::new().unwrap();
    let entries: &[(&str, &[u8])] = &[("x/Core.class", b"core")];
    write_module(first.path(), "org.jboss.as.core", entries);
    write_module(second.path(), "org.jboss.as.core", entries);
    fs::create_dir_all(second.path().join("lib/linux-x86_64")).unwrap();
    fs::write(second.path().join("lib/linux-x86_64/libcore.so"), "native").unwrap();

    let one = module_hash(first.path(), "org.jboss.as.core", "org.jboss.as", [0; 32]).unwrap();
    let two = module_hash(second.path(), "org.jboss.as.core", "org.jboss.as", [0; 32]).unwrap();
    assert_ne!(one, two);
}

#[test]
fn test_module_outside_prefix_uses_metadata_hash() {
    let temp_dir = TempDir::new().unwrap();
    let dir = temp_dir.path().join("com/x/main");
    write_module(&dir, "com.x", &[("x/X.class", b"x")]);

    let tree = TreeBuilder::new(temp_dir.path().to_path_buf()).build().unwrap();
    let node = tree.find(&["com", "x", "main"]).unwrap();
    let hasher = ComparisonHasher::new();
    assert_eq!(hasher.comparison_hash(&node).unwrap(), node.metadata_hash().unwrap());
    assert_eq!(node.metadata_hash().unwrap(), hasher::hash_path(&dir).unwrap());
}

#[test]
fn test_missing_resource_is_an_error() {
    let temp_dir = TempDir::new().unwrap();
    fs::write(
        temp_dir.path().join("module.xml"),
        module_xml("org.jboss.as.core", &["missing.jar"]),
    )
    .unwrap();

    let result = module_hash(temp_dir.path(), "org.jboss.as.core", "org.jboss.as", [0; 32]);
    assert!(matches!(result, Err(HashError::ResourceNotFound(_))));
}

#[test]
fn test_malformed_resource_root_is_an_error() {
    let temp_dir = TempDir::new().unwrap();
    fs::write(
        temp_dir.path().join("module.xml"),
        r#"<module xmlns="urn:jboss:module:1.9" name="org.jboss.as.core">
    <resources>
        <resource-root path="core.jar" name="extra"/>
    </resources>
</module>"#,
    )
    .unwrap();

    let result = module_hash(temp_dir.path(), "org.jboss.as.core", "org.jboss.as", [0; 32]);
    assert!(matches!(result, Err(HashError::Descriptor { .. })));
}

#[test]
fn test_descriptor_resources_deduplicated_in_order() {
    let temp_dir = TempDir::new().unwrap();
    let descriptor = temp_dir.path().join("module.xml");
    fs::write(
        &descriptor,
        module_xml("org.jboss.as.core", &["b.jar", " a.jar ", "b.jar", "classes"]),
    )
    .unwrap();

    let mut digest = blake3::Hasher::new();
    let resources = digest_descriptor(&descriptor, &mut digest).unwrap();
    assert_eq!(resources, vec!["b.jar", "a.jar", "classes"]);
}
