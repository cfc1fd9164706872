//! Integration tests for optional-path conditions

use patch_gen::config::PatchGenConfig;
use patch_gen::diff::{MiscItem, ModificationCondition};
use patch_gen::optional::{OptionalPathRule, OptionalPaths};

fn condition(paths: &OptionalPaths, item: &str) -> Option<String> {
    let segments: Vec<&str> = item.split('/').collect();
    paths.condition_for(&segments).map(|c| c.to_string())
}

#[test]
fn test_wildcard_rule_with_requires() {
    let paths = OptionalPaths::new(&[OptionalPathRule::requiring("bin/appclient.*", "appclient")]);

    assert_eq!(condition(&paths, "bin/appclient.sh").as_deref(), Some("exists: appclient"));
    assert_eq!(condition(&paths, "bin/appclient.bat").as_deref(), Some("exists: appclient"));
    assert_eq!(condition(&paths, "bin/standalone.sh"), None);
}

#[test]
fn test_requires_condition_is_a_file_check() {
    let paths = OptionalPaths::new(&[OptionalPathRule::requiring(
        "bin/appclient.*",
        "modules/system/layers/base/org/jboss/as/appclient",
    )]);

    let result = paths.condition_for(&["bin", "appclient.conf"]).unwrap();
    let ModificationCondition::Exists(item) = result;
    assert!(!item.directory);
    assert_eq!(item.name, "appclient");
    assert_eq!(item.path.len(), 6);
}

#[test]
fn test_optional_directory_covers_descendants() {
    let paths = OptionalPaths::new(&[
        OptionalPathRule::new("docs"),
        OptionalPathRule::new("welcome-content"),
    ]);

    assert_eq!(
        paths.condition_for(&["docs", "examples", "configs", "a.xml"]),
        Some(ModificationCondition::Exists(MiscItem::directory("docs", Vec::new())))
    );
    assert_eq!(condition(&paths, "welcome-content/index.html").as_deref(), Some("exists: welcome-content"));
    assert_eq!(condition(&paths, "bin/run.sh"), None);
}

#[test]
fn test_rules_from_config_file_section() {
    let toml = r#"
[patch]
id = "p1"

[[optional_paths]]
path = "docs/examples"

[[optional_paths]]
path = "bin/appclient.*"
requires = "appclient"
"#;
    let temp_dir = tempfile::TempDir::new().unwrap();
    let file = temp_dir.path().join("patch.toml");
    std::fs::write(&file, toml).unwrap();

    let config: PatchGenConfig = patch_gen::config::ConfigLoader::load_from_file(&file).unwrap();
    assert_eq!(config.optional_paths.len(), 2);
    let paths = config.optional_paths();

    assert_eq!(condition(&paths, "docs/examples/a.xml").as_deref(), Some("exists: docs/examples"));
    assert_eq!(condition(&paths, "docs/schema/a.xsd"), None);
    assert_eq!(condition(&paths, "bin/appclient.sh").as_deref(), Some("exists: appclient"));
}
