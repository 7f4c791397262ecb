mod common;

use common::GoModule;
use mirrorgen::config::{MarshalerConfig, MirrorConfig};
use mirrorgen::core::{CleaningPolicy, PackageRewrite, UnsupportedPolicy};
use mirrorgen::MirrorError;
use std::fs;
use std::path::PathBuf;

const FULL: &str = r#"
module_root = "src"
root_package = "example.com/app/pkg/config/dynamic"
destination = "mirror/dynamic"
package_name = "dynamic"
included_packages = ["example.com/app/pkg/tls"]
excluded_types = ["Message"]
excluded_files = ["example.com/app/pkg/config/dynamic/plugins.go"]
on_unsupported = "fail"

[cleaning]
collapse_current_package = true
collapse_prefixes = ["example.com/app/pkg/"]
dropped_packages = ["example.com/app/pkg/types"]

[cleaning.type_substitutions]
"example.com/app/pkg/types.Duration" = "string"

[[cleaning.package_rewrites]]
from = "example.com/app/pkg"
to = "example.com/mirror"

[formatter]
command = ["gofmt"]

[marshaler]
root_type = "Configuration"
"#;

#[test]
fn parses_every_section() {
    let config = MirrorConfig::from_toml_str(FULL).unwrap();

    assert_eq!(config.module_root, PathBuf::from("src"));
    assert_eq!(config.package_name, "dynamic");
    assert_eq!(config.included_packages, vec!["example.com/app/pkg/tls"]);
    assert_eq!(config.on_unsupported, UnsupportedPolicy::Fail);
    assert_eq!(config.formatter.command, vec!["gofmt"]);
    assert!(config.imports.command.is_empty());
    assert_eq!(
        config.marshaler,
        MarshalerConfig {
            enabled: true,
            file_name: "marshaler.go".to_string(),
            root_type: "Configuration".to_string(),
        }
    );

    let cleaning = &config.cleaning;
    assert!(cleaning.collapse_current_package);
    assert_eq!(
        cleaning.package_rewrites,
        vec![PackageRewrite {
            from: "example.com/app/pkg".to_string(),
            to: "example.com/mirror".to_string(),
        }]
    );
    assert_eq!(cleaning.clean_package("example.com/app/pkg/tls"), "example.com/mirror/tls");
    assert_eq!(cleaning.clean_package("example.com/app/pkg/types"), "");
}

#[test]
fn defaults_apply_to_missing_sections() {
    let config = MirrorConfig::from_toml_str(
        "root_package = \"example.com/app\"\ndestination = \"out\"\npackage_name = \"app\"\n",
    )
    .unwrap();

    assert_eq!(config.module_root, PathBuf::from("."));
    assert_eq!(config.on_unsupported, UnsupportedPolicy::Skip);
    assert_eq!(config.marshaler, MarshalerConfig::default());
    assert!(config.marshaler.enabled);
    assert!(config.cleaning.type_substitutions.is_empty());
    assert!(config.validate().is_ok());
}

#[test]
fn unknown_keys_are_rejected() {
    let err = MirrorConfig::from_toml_str("root_pakage = \"typo\"\n").unwrap_err();
    assert!(matches!(err, MirrorError::Config { path: None, .. }));
}

#[test]
fn validation_reports_missing_and_malformed_settings() {
    let mut config = MirrorConfig::from_toml_str(FULL).unwrap();
    assert!(config.validate().is_ok());

    config.package_name = "dynamic-config".to_string();
    assert!(config.validate().is_err());
    config.package_name = "dynamic".to_string();

    config.excluded_files = vec!["plugins.go".to_string()];
    assert!(config.validate().is_err());
    config.excluded_files.clear();

    config.destination = PathBuf::new();
    assert!(config.validate().is_err());

    let empty = MirrorConfig::default();
    let err = empty.validate().unwrap_err();
    assert!(err.to_string().contains("root_package"));
}

#[test]
fn load_resolves_paths_against_the_config_directory() {
    let tmp = tempfile::TempDir::new().unwrap();
    let path = tmp.path().join("mirrorgen.toml");
    fs::write(&path, FULL).unwrap();

    let config = MirrorConfig::load(&path).unwrap();

    assert_eq!(config.module_root, tmp.path().join("src"));
    assert_eq!(config.destination, tmp.path().join("mirror/dynamic"));
}

#[test]
fn load_names_the_file_on_failure() {
    let tmp = tempfile::TempDir::new().unwrap();
    let path = tmp.path().join("mirrorgen.toml");
    fs::write(&path, "root_package = [").unwrap();

    match MirrorConfig::load(&path).unwrap_err() {
        MirrorError::Config { path: Some(p), .. } => assert_eq!(p, path),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn build_driver_runs_against_the_module() {
    let module = GoModule::new();
    module.write(
        "pkg/config/dynamic/config.go",
        "package dynamic\n\ntype Configuration struct {\n\tName string `json:\"name\"`\n}\n",
    );
    let out = module.out_dir();
    let config = MirrorConfig {
        module_root: module.root.clone(),
        root_package: "example.com/app/pkg/config/dynamic".to_string(),
        destination: out.clone(),
        package_name: "dynamic".to_string(),
        ..MirrorConfig::default()
    };

    let summary = config
        .build_driver()
        .unwrap()
        .run(&config.destination, &config.package_name)
        .unwrap();

    assert_eq!(summary.written().len(), 2);
    assert!(out.join("config.go").exists());
    assert!(out.join("marshaler.go").exists());
}

#[test]
fn marshaler_can_be_disabled_in_the_file() {
    let module = GoModule::new();
    module.write(
        "pkg/config/dynamic/config.go",
        "package dynamic\n\ntype Configuration struct {\n\tName string\n}\n",
    );
    let mut config = MirrorConfig::from_toml_str(
        "root_package = \"example.com/app/pkg/config/dynamic\"\n\
         destination = \"out\"\n\
         package_name = \"dynamic\"\n\
         \n\
         [marshaler]\n\
         enabled = false\n",
    )
    .unwrap();
    assert!(!config.marshaler.enabled);
    config.module_root = module.root.clone();
    config.destination = module.out_dir();

    let summary = config
        .build_driver()
        .unwrap()
        .run(&config.destination, &config.package_name)
        .unwrap();

    let config_go = module.out_dir().join("config.go");
    assert!(summary.marshaler.is_none());
    assert_eq!(summary.written(), vec![config_go.as_path()]);
}

#[test]
fn build_driver_requires_a_go_mod() {
    let tmp = tempfile::TempDir::new().unwrap();
    let config = MirrorConfig {
        module_root: tmp.path().to_path_buf(),
        root_package: "example.com/app".to_string(),
        destination: tmp.path().join("out"),
        package_name: "app".to_string(),
        ..MirrorConfig::default()
    };

    assert!(matches!(
        config.build_driver(),
        Err(MirrorError::Load { .. })
    ));
}
