//! Integration tests for the misc-file tree diff

use patch_gen::diff::{MiscDiff, PatchOperation};
use patch_gen::error::DiffError;
use patch_gen::inspect::ComparisonHasher;
use patch_gen::optional::{OptionalPathRule, OptionalPaths};
use patch_gen::patch::{PatchBuilder, PatchIdentity};
use patch_gen::tree::{ContentTree, TreeBuilder};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn write(root: &Path, relative: &str, content: &str) {
    let path = root.join(relative);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

fn build(root: &Path) -> ContentTree {
    TreeBuilder::new(root.to_path_buf()).build().unwrap()
}

fn diff_trees(original: &Path, updated: &Path, rules: &[OptionalPathRule]) -> Result<Vec<String>, DiffError> {
    let original_tree = build(original);
    let updated_tree = build(updated);
    let hasher = ComparisonHasher::new();
    let optional_paths = OptionalPaths::new(rules);
    let misc = MiscDiff {
        hasher: &hasher,
        optional_paths: &optional_paths,
    };

    let mut builder = PatchBuilder::new(
        "p1",
        PatchIdentity::OneOff {
            name: "Server".to_string(),
            version: "1.0.0".to_string(),
        },
    );
    misc.compare(
        &mut builder,
        Some(original_tree.root()),
        Some(updated_tree.root()),
    )?;
    Ok(builder.build().misc.iter().map(|op| op.to_string()).collect())
}

#[test]
fn test_identical_trees_produce_nothing() {
    let original = TempDir::new().unwrap();
    let updated = TempDir::new().unwrap();
    for root in [original.path(), updated.path()] {
        write(root, "bin/run.sh", "run");
        write(root, "docs/readme.txt", "read me");
    }

    assert!(diff_trees(original.path(), updated.path(), &[]).unwrap().is_empty());
}

#[test]
fn test_add_modify_remove_files() {
    let original = TempDir::new().unwrap();
    let updated = TempDir::new().unwrap();
    write(original.path(), "bin/run.sh", "run v1");
    write(original.path(), "bin/old.sh", "old");
    write(updated.path(), "bin/run.sh", "run v2");
    write(updated.path(), "bin/new.sh", "new");

    let ops = diff_trees(original.path(), updated.path(), &[]).unwrap();
    assert_eq!(
        ops,
        vec![
            "remove file bin/old.sh",
            "modify file bin/run.sh",
            "add file bin/new.sh",
        ]
    );
}

#[test]
fn test_added_directory_is_flattened_to_leaves() {
    let original = TempDir::new().unwrap();
    let updated = TempDir::new().unwrap();
    write(original.path(), "a.txt", "a");
    write(updated.path(), "a.txt", "a");
    write(updated.path(), "docs/guide/intro.txt", "intro");
    write(updated.path(), "docs/index.txt", "index");

    let ops = diff_trees(original.path(), updated.path(), &[]).unwrap();
    assert_eq!(
        ops,
        vec!["add file docs/guide/intro.txt", "add file docs/index.txt"]
    );
}

#[test]
fn test_removed_directory_is_one_operation() {
    let original = TempDir::new().unwrap();
    let updated = TempDir::new().unwrap();
    write(original.path(), "a.txt", "a");
    write(original.path(), "docs/guide/intro.txt", "intro");
    write(original.path(), "docs/index.txt", "index");
    write(updated.path(), "a.txt", "a");

    let original_tree = build(original.path());
    let updated_tree = build(updated.path());
    let hasher = ComparisonHasher::new();
    let optional_paths = OptionalPaths::default();
    let misc = MiscDiff {
        hasher: &hasher,
        optional_paths: &optional_paths,
    };
    let mut builder = PatchBuilder::new(
        "p1",
        PatchIdentity::OneOff {
            name: "Server".to_string(),
            version: "1.0.0".to_string(),
        },
    );
    misc.compare(&mut builder, Some(original_tree.root()), Some(updated_tree.root()))
        .unwrap();
    let patch = builder.build();

    assert_eq!(patch.misc.len(), 1);
    match &patch.misc[0] {
        PatchOperation::RemoveFile {
            item,
            original_hash,
            condition,
        } => {
            assert!(item.directory);
            assert_eq!(item.relative_path(), "docs");
            assert_eq!(
                *original_hash,
                original_tree.find(&["docs"]).unwrap().metadata_hash().unwrap()
            );
            assert!(condition.is_none());
        }
        other => panic!("unexpected operation {:?}", other),
    }
}

#[test]
fn test_removed_file_under_optional_dir_is_conditional() {
    let original = TempDir::new().unwrap();
    let updated = TempDir::new().unwrap();
    write(original.path(), "docs/readme.txt", "read me");
    write(original.path(), "docs/other.txt", "other");
    write(updated.path(), "docs/other.txt", "other");

    let ops = diff_trees(original.path(), updated.path(), &[OptionalPathRule::new("docs")]).unwrap();
    assert_eq!(ops, vec!["remove file docs/readme.txt [exists: docs]"]);
}

#[test]
fn test_rebuilt_jar_in_misc_tree_is_unchanged() {
    use super::test_utils::{manifest, write_jar};

    let original = TempDir::new().unwrap();
    let updated = TempDir::new().unwrap();
    write_jar(
        &original.path().join("bin/client.jar"),
        &[
            ("META-INF/MANIFEST.MF", &manifest(&[("Build-Jdk", "11")])),
            ("c/Client.class", b"client"),
        ],
    );
    write_jar(
        &updated.path().join("bin/client.jar"),
        &[
            ("c/Client.class", b"client"),
            ("META-INF/MANIFEST.MF", &manifest(&[("Build-Jdk", "17")])),
        ],
    );

    assert!(diff_trees(original.path(), updated.path(), &[]).unwrap().is_empty());
}

#[test]
fn test_file_replaced_by_directory_is_an_error() {
    let original = TempDir::new().unwrap();
    let updated = TempDir::new().unwrap();
    write(original.path(), "conf", "flat file");
    write(updated.path(), "conf/app.properties", "x=1");

    let result = diff_trees(original.path(), updated.path(), &[]);
    match result {
        Err(DiffError::KindMismatch {
            path,
            original,
            updated,
        }) => {
            assert_eq!(path, "conf");
            assert_eq!(original, "a file");
            assert_eq!(updated, "a directory");
        }
        other => panic!("expected kind mismatch, got {:?}", other),
    }
}

#[test]
fn test_nodes_at_different_positions_are_an_error() {
    let original = TempDir::new().unwrap();
    let updated = TempDir::new().unwrap();
    write(original.path(), "a/x.txt", "x");
    write(updated.path(), "b/x.txt", "x");

    let original_tree = build(original.path());
    let updated_tree = build(updated.path());
    let hasher = ComparisonHasher::new();
    let optional_paths = OptionalPaths::default();
    let misc = MiscDiff {
        hasher: &hasher,
        optional_paths: &optional_paths,
    };
    let mut builder = PatchBuilder::new(
        "p1",
        PatchIdentity::OneOff {
            name: "Server".to_string(),
            version: "1.0.0".to_string(),
        },
    );

    let result = misc.compare(
        &mut builder,
        original_tree.find(&["a"]),
        updated_tree.find(&["b"]),
    );
    assert!(matches!(result, Err(DiffError::NodeMismatch { .. })));
}
