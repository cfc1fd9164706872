//! Integration tests for layer, add-on and module set diffs

use super::test_utils::{manifest, DistFixture};
use patch_gen::diff::{compare_distributions, DiffOptions, ElementChange, PatchOperation, Target};
use patch_gen::distribution::{Distribution, ScanOptions};
use patch_gen::error::DiffError;
use patch_gen::patch::{ElementDeclaration, Patch, PatchBuilder, PatchIdentity};

fn scan(fixture: &DistFixture, include_version: bool) -> Distribution {
    Distribution::scan(fixture.path(), &ScanOptions::for_version(include_version)).unwrap()
}

fn builder(targets: &[Target]) -> PatchBuilder {
    PatchBuilder::new(
        "p1",
        PatchIdentity::OneOff {
            name: "Server".to_string(),
            version: "1.0.0".to_string(),
        },
    )
    .declare_all(targets.iter().cloned().map(ElementDeclaration::new))
}

fn run(
    original: &DistFixture,
    updated: &DistFixture,
    targets: &[Target],
    options: &DiffOptions,
) -> Result<Patch, DiffError> {
    let original = scan(original, options.include_version);
    let updated = scan(updated, options.include_version);
    let mut builder = builder(targets);
    compare_distributions(&mut builder, &original, &updated, options)?;
    Ok(builder.build())
}

fn layer(name: &str) -> Target {
    Target::Layer(name.to_string())
}

fn element_ops(patch: &Patch, target: &Target) -> Vec<String> {
    patch
        .elements
        .iter()
        .filter(|e| &e.target == target)
        .flat_map(|e| e.operations.iter().map(|op| op.to_string()))
        .collect()
}

#[test]
fn test_layer_order_modify_remove_add() {
    let original = DistFixture::new("Server", "1.0.0");
    original
        .layers_conf(&["core"])
        .module("base", "com.b", "main", &[("B.class", b"b1")])
        .module("core", "com.c", "main", &[("C.class", b"c")]);
    let updated = DistFixture::new("Server", "1.0.0");
    updated
        .layers_conf(&["ext"])
        .module("base", "com.b", "main", &[("B.class", b"b2")])
        .module("ext", "com.e", "main", &[("E.class", b"e")]);

    let patch = run(
        &original,
        &updated,
        &[layer("base"), layer("core"), layer("ext")],
        &DiffOptions::default(),
    )
    .unwrap();

    let order: Vec<(Target, ElementChange)> = patch
        .elements
        .iter()
        .map(|e| (e.target.clone(), e.change))
        .collect();
    assert_eq!(
        order,
        vec![
            (layer("core"), ElementChange::Remove),
            (layer("base"), ElementChange::Modify),
            (layer("ext"), ElementChange::Add),
        ]
    );
    assert_eq!(element_ops(&patch, &layer("core")), vec!["remove module com.c:main (layer core)"]);
    assert_eq!(element_ops(&patch, &layer("base")), vec!["modify module com.b:main (layer base)"]);
    assert_eq!(element_ops(&patch, &layer("ext")), vec!["add module com.e:main (layer ext)"]);
}

#[test]
fn test_undeclared_layer_is_a_config_error() {
    let original = DistFixture::new("Server", "1.0.0");
    let updated = DistFixture::new("Server", "1.0.0");
    updated
        .layers_conf(&["ext"])
        .module("ext", "com.e", "main", &[("E.class", b"e")]);

    let result = run(&original, &updated, &[layer("base")], &DiffOptions::default());
    match result {
        Err(DiffError::MissingPatchConfig(target)) => assert_eq!(target, layer("ext")),
        other => panic!("expected missing patch config, got {:?}", other),
    }
}

#[test]
fn test_unchanged_undeclared_layer_is_fine() {
    let original = DistFixture::new("Server", "1.0.0");
    original.module("base", "com.b", "main", &[("B.class", b"b")]);
    let updated = DistFixture::new("Server", "1.0.0");
    updated.module("base", "com.b", "main", &[("B.class", b"b")]);

    let patch = run(&original, &updated, &[], &DiffOptions::default()).unwrap();
    assert!(patch.is_empty());
}

#[test]
fn test_rebuilt_internal_module_is_unchanged() {
    let original = DistFixture::new("Server", "1.0.0");
    original.module(
        "base",
        "org.jboss.as.server",
        "main",
        &[
            ("META-INF/MANIFEST.MF", &manifest(&[("Build-Timestamp", "1")])),
            ("S.class", b"s"),
        ],
    );
    let updated = DistFixture::new("Server", "1.0.0");
    updated.module(
        "base",
        "org.jboss.as.server",
        "main",
        &[
            ("S.class", b"s"),
            ("META-INF/MANIFEST.MF", &manifest(&[("Build-Timestamp", "2")])),
        ],
    );

    let patch = run(&original, &updated, &[layer("base")], &DiffOptions::default()).unwrap();
    assert!(patch.is_empty());

    let raw = DiffOptions {
        hasher: patch_gen::inspect::ComparisonHasher::new().with_raw(true),
        ..DiffOptions::default()
    };
    let patch = run(&original, &updated, &[layer("base")], &raw).unwrap();
    assert_eq!(
        element_ops(&patch, &layer("base")),
        vec!["modify module org.jboss.as.server:main (layer base)"]
    );
}

#[test]
fn test_added_modules_sorted_by_full_name() {
    let original = DistFixture::new("Server", "1.0.0");
    let updated = DistFixture::new("Server", "1.0.0");
    updated
        .module("base", "org.zeta", "main", &[("Z.class", b"z")])
        .module("base", "com.alpha", "main", &[("A.class", b"a")])
        .module("base", "com.alpha", "1.0", &[("A.class", b"a")]);

    let patch = run(&original, &updated, &[layer("base")], &DiffOptions::default()).unwrap();
    assert_eq!(
        element_ops(&patch, &layer("base")),
        vec![
            "add module com.alpha:1.0 (layer base)",
            "add module com.alpha:main (layer base)",
            "add module org.zeta:main (layer base)",
        ]
    );
}

#[test]
fn test_version_module_forced_modify() {
    let original = DistFixture::new("Server", "1.0.0");
    original.module(
        "base",
        "org.jboss.as.version",
        "main",
        &[("META-INF/MANIFEST.MF", &manifest(&[("JBossAS-Release-Version", "1.0.0")]))],
    );
    let updated = DistFixture::new("Server", "1.1.0");
    updated.module(
        "base",
        "org.jboss.as.version",
        "main",
        &[("META-INF/MANIFEST.MF", &manifest(&[("JBossAS-Release-Version", "1.1.0")]))],
    );

    let without_version = run(&original, &updated, &[layer("base")], &DiffOptions::default()).unwrap();
    assert!(element_ops(&without_version, &layer("base")).is_empty());

    let with_version = DiffOptions {
        include_version: true,
        ..DiffOptions::default()
    };
    let patch = run(&original, &updated, &[layer("base")], &with_version).unwrap();
    let ops = &patch.elements[0].operations;
    assert_eq!(ops.len(), 1);
    match &ops[0] {
        PatchOperation::ModifyModule {
            name,
            original_hash,
            updated_hash,
            ..
        } => {
            assert_eq!(name, "org.jboss.as.version");
            assert_ne!(original_hash, updated_hash);
        }
        other => panic!("unexpected operation {:?}", other),
    }
}

#[test]
fn test_bundles_and_add_ons() {
    let original = DistFixture::new("Server", "1.0.0");
    original
        .bundle("base", "org.b", "main", "v1")
        .add_on_module("extra", "com.gone", "main");
    let updated = DistFixture::new("Server", "1.0.0");
    updated
        .bundle("base", "org.b", "main", "v2")
        .add_on_module("fresh", "com.fresh", "main");

    let extra = Target::AddOn("extra".to_string());
    let fresh = Target::AddOn("fresh".to_string());
    let patch = run(
        &original,
        &updated,
        &[layer("base"), extra.clone(), fresh.clone()],
        &DiffOptions::default(),
    )
    .unwrap();

    assert_eq!(element_ops(&patch, &layer("base")), vec!["modify bundle org.b:main (layer base)"]);
    assert_eq!(element_ops(&patch, &extra), vec!["remove module com.gone:main (add-on extra)"]);
    assert_eq!(element_ops(&patch, &fresh), vec!["add module com.fresh:main (add-on fresh)"]);
}
