//! Integration tests for Configuration System

use super::test_utils::{patch_config_toml, with_isolated_env};
use patch_gen::config::{ConfigLoader, PatchType};
use patch_gen::diff::Target;
use std::fs;
use tempfile::TempDir;

#[test]
fn test_config_loads_patch_and_elements() {
    let temp_dir = TempDir::new().unwrap();
    let config_file = temp_dir.path().join("patch.toml");

    fs::write(
        &config_file,
        r#"
[patch]
id = "cp-1.1"
type = "cumulative"
description = "Security fixes"
applies_to_product = "Server"
applies_to_version = "1.0.0"

[[elements]]
name = "base"
id = "base-cp"

[[elements]]
name = "metrics"
add_on = true
description = "Metrics add-on"
"#,
    )
    .unwrap();

    let config = ConfigLoader::load_from_file(&config_file).unwrap();
    assert!(config.validate().is_ok());

    assert_eq!(config.patch.id, "cp-1.1");
    assert_eq!(config.patch.patch_type, PatchType::Cumulative);
    assert_eq!(config.patch.description.as_deref(), Some("Security fixes"));
    assert_eq!(config.patch.applies_to_version.as_deref(), Some("1.0.0"));
    assert!(config.include_version());

    let declarations = config.element_declarations();
    assert_eq!(declarations.len(), 2);
    assert_eq!(declarations[0].target, Target::Layer("base".to_string()));
    assert_eq!(declarations[0].id.as_deref(), Some("base-cp"));
    assert_eq!(declarations[1].target, Target::AddOn("metrics".to_string()));
    assert_eq!(declarations[1].description.as_deref(), Some("Metrics add-on"));
}

#[test]
fn test_config_defaults_applied() {
    let temp_dir = TempDir::new().unwrap();
    let config_file = temp_dir.path().join("patch.toml");
    fs::write(&config_file, "[patch]\nid = \"p1\"\n").unwrap();

    let config = ConfigLoader::load_from_file(&config_file).unwrap();
    assert_eq!(config.patch.patch_type, PatchType::OneOff);
    assert!(!config.include_version());
    assert!(!config.hashing.raw);
    assert_eq!(config.hashing.internal_module_prefix, "org.jboss.as");
    assert_eq!(config.hashing.version_module, "org.jboss.as.version");
    assert!(config.elements.is_empty());
    assert!(!config.logging.enabled);
}

#[test]
fn test_missing_patch_config_file() {
    let temp_dir = TempDir::new().unwrap();
    let result = ConfigLoader::load_from_file(&temp_dir.path().join("missing.toml"));
    assert!(result.is_err());
}

#[test]
fn test_validation_reports_every_problem() {
    let temp_dir = TempDir::new().unwrap();
    let config_file = temp_dir.path().join("patch.toml");
    fs::write(
        &config_file,
        r#"
[patch]
id = ""

[[elements]]
name = "base"

[[elements]]
name = "base"

[[optional_paths]]
path = "/"
"#,
    )
    .unwrap();

    let config = ConfigLoader::load_from_file(&config_file).unwrap();
    let errors = config.validate().unwrap_err();
    assert_eq!(errors.len(), 3);

    let message = config.ensure_valid().unwrap_err().to_string();
    assert!(message.contains("id cannot be empty"));
    assert!(message.contains("declared twice as layer base"));
    assert!(message.contains("path cannot be empty"));
}

#[test]
fn test_environment_overrides_patch_file() {
    let temp_dir = TempDir::new().unwrap();
    let config_file = temp_dir.path().join("patch.toml");
    fs::write(&config_file, patch_config_toml("p1", "one-off", &["base"])).unwrap();

    let config = with_isolated_env(
        &temp_dir,
        &[
            ("PATCHGEN__PATCH__ID", "from-env"),
            ("PATCHGEN__HASHING__RAW", "true"),
        ],
        || ConfigLoader::load(&config_file).unwrap(),
    );

    assert_eq!(config.patch.id, "from-env");
    assert!(config.hashing.raw);
    assert_eq!(config.elements.len(), 1);
}

#[test]
fn test_global_file_sits_below_patch_file() {
    let temp_dir = TempDir::new().unwrap();
    let config_file = temp_dir.path().join("patch.toml");
    fs::write(
        &config_file,
        "[patch]\nid = \"p1\"\ndescription = \"from patch file\"\n",
    )
    .unwrap();

    let config = with_isolated_env(&temp_dir, &[], || {
        let global = patch_gen::config::global_config_path().unwrap();
        fs::create_dir_all(global.parent().unwrap()).unwrap();
        fs::write(
            &global,
            r#"
[patch]
description = "from global file"

[hashing]
internal_module_prefix = "com.acme"

[logging]
level = "debug"
"#,
        )
        .unwrap();
        ConfigLoader::load(&config_file).unwrap()
    });

    assert_eq!(config.patch.id, "p1");
    assert_eq!(config.patch.description.as_deref(), Some("from patch file"));
    assert_eq!(config.hashing.internal_module_prefix, "com.acme");
    assert_eq!(config.logging.level, "debug");
}

#[test]
fn test_load_from_file_skips_global_file() {
    let temp_dir = TempDir::new().unwrap();
    let config_file = temp_dir.path().join("patch.toml");
    fs::write(&config_file, "[patch]\nid = \"p1\"\n").unwrap();

    let config = with_isolated_env(&temp_dir, &[], || {
        let global = patch_gen::config::global_config_path().unwrap();
        fs::create_dir_all(global.parent().unwrap()).unwrap();
        fs::write(&global, "[hashing]\ninternal_module_prefix = \"com.acme\"\n").unwrap();
        ConfigLoader::load_from_file(&config_file).unwrap()
    });

    assert_eq!(config.hashing.internal_module_prefix, "org.jboss.as");
}
