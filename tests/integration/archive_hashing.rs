//! Integration tests for archive-aware comparison hashing

use super::test_utils::{manifest, write_jar};
use patch_gen::inspect::archive::{archive_hash, canonical_entries};
use patch_gen::inspect::ComparisonHasher;
use patch_gen::tree::hasher;
use tempfile::TempDir;

#[test]
fn test_reordered_entries_hash_the_same() {
    let temp_dir = TempDir::new().unwrap();
    let one = temp_dir.path().join("one.jar");
    let two = temp_dir.path().join("two.jar");
    write_jar(
        &one,
        &[
            ("META-INF/MANIFEST.MF", &manifest(&[("Main-Class", "x.Main")])),
            ("x/Main.class", b"main"),
            ("x/Util.class", b"util"),
        ],
    );
    write_jar(
        &two,
        &[
            ("x/Util.class", b"util"),
            ("x/Main.class", b"main"),
            ("META-INF/MANIFEST.MF", &manifest(&[("Main-Class", "x.Main")])),
        ],
    );

    assert_ne!(hasher::hash_path(&one).unwrap(), hasher::hash_path(&two).unwrap());
    assert_eq!(archive_hash(&one).unwrap(), archive_hash(&two).unwrap());
}

#[test]
fn test_ignored_manifest_attributes_do_not_matter() {
    let temp_dir = TempDir::new().unwrap();
    let one = temp_dir.path().join("one.jar");
    let two = temp_dir.path().join("two.jar");
    write_jar(
        &one,
        &[
            (
                "META-INF/MANIFEST.MF",
                &manifest(&[("Built-By", "alice"), ("Build-Timestamp", "2020-01-01")]),
            ),
            ("x/A.class", b"a"),
        ],
    );
    write_jar(
        &two,
        &[
            (
                "META-INF/MANIFEST.MF",
                &manifest(&[("Built-By", "bob"), ("Build-Timestamp", "2024-06-30")]),
            ),
            ("x/A.class", b"a"),
        ],
    );

    assert_eq!(archive_hash(&one).unwrap(), archive_hash(&two).unwrap());
}

#[test]
fn test_kept_manifest_attribute_change_is_detected() {
    let temp_dir = TempDir::new().unwrap();
    let one = temp_dir.path().join("one.jar");
    let two = temp_dir.path().join("two.jar");
    write_jar(
        &one,
        &[("META-INF/MANIFEST.MF", &manifest(&[("Dependencies", "org.a")]))],
    );
    write_jar(
        &two,
        &[("META-INF/MANIFEST.MF", &manifest(&[("Dependencies", "org.b")]))],
    );

    assert_ne!(archive_hash(&one).unwrap(), archive_hash(&two).unwrap());
}

#[test]
fn test_regenerated_logger_classes_do_not_matter() {
    let temp_dir = TempDir::new().unwrap();
    let one = temp_dir.path().join("one.jar");
    let two = temp_dir.path().join("two.jar");
    write_jar(
        &one,
        &[
            ("x/Core.class", b"core"),
            ("x/Logger_$logger.class", b"generated-1"),
            ("x/Messages_$bundle.class", b"generated-1"),
            ("META-INF/maven/x/core/pom.properties", b"version=1"),
        ],
    );
    write_jar(
        &two,
        &[
            ("x/Core.class", b"core"),
            ("x/Logger_$logger.class", b"generated-2"),
            ("x/Messages_$bundle.class", b"generated-2"),
            ("META-INF/maven/x/core/pom.properties", b"version=2"),
            ("META-INF/SIGNER.SF", b"signature"),
        ],
    );

    assert_eq!(archive_hash(&one).unwrap(), archive_hash(&two).unwrap());
}

#[test]
fn test_canonical_entries_are_sorted_and_filtered() {
    let temp_dir = TempDir::new().unwrap();
    let jar = temp_dir.path().join("lib.jar");
    write_jar(
        &jar,
        &[
            ("z/Z.class", b"z"),
            ("a/", b""),
            ("a/A.class", b"a"),
            ("META-INF/INDEX.LIST", b"index"),
            ("META-INF/MANIFEST.MF", &manifest(&[])),
        ],
    );

    let names: Vec<String> = canonical_entries(&jar).unwrap().into_keys().collect();
    assert_eq!(names, vec!["META-INF/MANIFEST.MF", "a/A.class", "z/Z.class"]);
}

#[test]
fn test_corrupt_archive_reports_path() {
    let temp_dir = TempDir::new().unwrap();
    let jar = temp_dir.path().join("broken.jar");
    std::fs::write(&jar, b"not a zip").unwrap();

    let err = archive_hash(&jar).unwrap_err();
    assert!(err.to_string().contains("broken.jar"));
}

#[test]
fn test_raw_mode_uses_bytes() {
    let temp_dir = TempDir::new().unwrap();
    let jar = temp_dir.path().join("lib.jar");
    write_jar(&jar, &[("a/A.class", b"a")]);

    let raw = ComparisonHasher::new().with_raw(true);
    assert_eq!(
        raw.path_hash(&jar, None).unwrap(),
        hasher::hash_path(&jar).unwrap()
    );
    assert_eq!(
        ComparisonHasher::new().path_hash(&jar, None).unwrap(),
        archive_hash(&jar).unwrap()
    );
}
