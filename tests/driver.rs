mod common;

use common::{dynamic_scope, BraceFormatter, GoModule, PassthroughResolver};
use mirrorgen::core::writer::PROVENANCE;
use mirrorgen::core::{Driver, MarshalerOptions, Package, RulePolicy, UnsupportedPolicy};
use mirrorgen::parsers::{GoPackageLoader, MemoryLoader};
use mirrorgen::MirrorError;
use std::fs;
use std::path::Path;

const ROOT: &str = "example.com/app/pkg/config/dynamic";
const TLS: &str = "example.com/app/pkg/tls";

const CONFIG_GO: &str = r#"package dynamic

import (
	"example.com/app/pkg/tls"
	"example.com/app/pkg/types"
)

type Configuration struct {
	HTTP *HTTPConfiguration `json:"http,omitempty"`
	TLS  *TLSConfiguration  `json:"tls,omitempty"`
}

type HTTPConfiguration struct {
	Routers  map[string]*Router `json:"routers,omitempty"`
	Timeout  types.Duration     `json:"timeout"`
	internal bool
}

type TLSConfiguration struct {
	Stores  map[string]tls.Store `json:"stores,omitempty"`
	Options []tls.Options        `json:"-"`
}

type Handler interface {
	Serve()
}
"#;

const ROUTER_GO: &str = r#"package dynamic

type Router struct {
	Rule     string `json:"rule"`
	Priority int    `json:"priority,omitempty" toml:"priority"`
}

type Routers []*Router
"#;

const TLS_GO: &str = r#"package tls

type Store struct {
	DefaultCertificate *Certificate `json:"defaultCertificate,omitempty"`
}

type Certificate struct {
	CertFile string `json:"certFile"`
	KeyFile  string `json:"keyFile"`
}
"#;

const STORES_GO: &str = r#"package dynamic

import "example.com/app/pkg/tls"

type DefaultStore tls.Store
"#;

fn app_module() -> GoModule {
    let module = GoModule::new();
    module.write("pkg/config/dynamic/config.go", CONFIG_GO);
    module.write("pkg/config/dynamic/stores.go", STORES_GO);
    module.write("pkg/config/dynamic/router.go", ROUTER_GO);
    module.write("pkg/tls/tls.go", TLS_GO);
    module.write("pkg/types/duration.go", "package types\n\ntype Duration int64\n");
    module
}

fn policy() -> RulePolicy {
    RulePolicy::new()
        .substitute("example.com/app/pkg/types.Duration", "string")
        .with_collapse_current_package(true)
        .collapse_prefix("example.com/app/pkg/")
        .drop_package("example.com/app/pkg/types")
        .rewrite_package("example.com/app/pkg", "example.com/mirror")
}

fn driver(module: &GoModule) -> Driver {
    let loader = GoPackageLoader::new(&module.root).unwrap();
    Driver::new(ROOT, loader)
        .with_policy(policy())
        .include_package(TLS)
        .include_package("example.com/app/pkg/unused")
}

fn read(path: &Path) -> String {
    fs::read_to_string(path).unwrap()
}

#[test]
fn mirrors_root_package_file_by_file() {
    let module = app_module();
    let out = module.out_dir().join("dynamic");

    let summary = driver(&module).run(&out, "dynamic").unwrap();

    let root = &summary.packages[0];
    assert_eq!(root.package, ROOT);
    assert_eq!(
        root.files,
        vec![out.join("config.go"), out.join("router.go"), out.join("stores.go")]
    );

    assert_eq!(
        read(&out.join("router.go")),
        format!(
            "package dynamic\n\n{PROVENANCE}\n\n\
             type Router struct {{\n\tRule string `json:\"rule\"`\n\tPriority int `json:\"priority,omitempty\"`\n}}\n\n\
             type Routers []*Router\n"
        )
    );

    let config = read(&out.join("config.go"));
    assert!(config.contains("import (\n\t\"example.com/mirror/tls\"\n)\n"));
    assert!(config.contains("\tHTTP *HTTPConfiguration `json:\"http,omitempty\"`\n"));
    assert!(config.contains("\tRouters map[string]*Router `json:\"routers,omitempty\"`\n"));
    assert!(config.contains("\tTimeout string `json:\"timeout\"`\n"));
    assert!(config.contains("\tStores map[string]tls.Store `json:\"stores,omitempty\"`\n"));
    assert!(!config.contains("internal"));
    assert!(!config.contains("Options"));
    assert!(!config.contains("Handler"));
    assert!(!config.contains("types"));
}

#[test]
fn declarations_of_foreign_named_types_use_the_underlying_struct() {
    let module = app_module();
    let out = module.out_dir().join("dynamic");

    driver(&module).run(&out, "dynamic").unwrap();

    let stores = read(&out.join("stores.go"));
    assert!(stores.contains("import (\n\t\"example.com/mirror/tls\"\n)\n"));
    assert!(stores.contains(
        "type DefaultStore struct {\n\tDefaultCertificate *tls.Certificate `json:\"defaultCertificate,omitempty\"`\n}\n"
    ));
}

#[test]
fn included_dependency_lands_in_its_own_subdirectory() {
    let module = app_module();
    let out = module.out_dir().join("dynamic");

    let summary = driver(&module).run(&out, "dynamic").unwrap();

    assert_eq!(summary.packages.len(), 2);
    let tls = &summary.packages[1];
    assert_eq!(tls.package, TLS);
    assert_eq!(tls.destination, out.join("tls"));
    assert_eq!(tls.files, vec![out.join("tls").join("tls.go")]);

    let source = read(&out.join("tls").join("tls.go"));
    assert!(source.starts_with("package tls\n"));
    assert!(source.contains("\tDefaultCertificate *Certificate `json:\"defaultCertificate,omitempty\"`\n"));
    assert!(!source.contains("import"));

    assert!(!out.join("unused").exists());
    assert!(!out.join("types").exists());
}

#[test]
fn marshaler_helper_is_written_by_default() {
    let module = app_module();
    let out = module.out_dir().join("dynamic");

    let summary = driver(&module).run(&out, "dynamic").unwrap();

    let path = summary.marshaler.clone().unwrap();
    assert_eq!(path, out.join("marshaler.go"));
    let source = read(&path);
    assert!(source.starts_with("package dynamic\n"));
    assert!(source.contains("import \"encoding/json\""));
    assert!(source.contains("\t*Configuration\n"));
    assert!(source.contains("return json.Marshal(c.Configuration)"));

    let written = summary.written();
    assert_eq!(written.len(), 5);
    assert_eq!(written.last().copied(), Some(path.as_path()));
}

#[test]
fn marshaler_helper_can_be_renamed_or_disabled() {
    let module = app_module();
    let out = module.out_dir().join("renamed");

    let summary = driver(&module)
        .with_marshaler(MarshalerOptions {
            file_name: "payload.go".to_string(),
            root_type: "Root".to_string(),
        })
        .run(&out, "dynamic")
        .unwrap();
    assert_eq!(summary.marshaler, Some(out.join("payload.go")));
    assert!(read(&out.join("payload.go")).contains("\t*Root\n"));

    let out = module.out_dir().join("disabled");
    let summary = driver(&module)
        .without_marshaler()
        .run(&out, "dynamic")
        .unwrap();
    assert!(summary.marshaler.is_none());
    assert!(!out.join("marshaler.go").exists());
}

#[test]
fn fail_policy_stops_before_writing() {
    let module = app_module();
    let out = module.out_dir().join("dynamic");

    let err = driver(&module)
        .with_unsupported_policy(UnsupportedPolicy::Fail)
        .run(&out, "dynamic")
        .unwrap_err();

    assert!(matches!(
        err,
        MirrorError::UnsupportedDeclaration { ref name, .. } if name == "Handler"
    ));
    assert!(!out.exists());
}

#[test]
fn excluded_types_are_left_out_of_the_mirror() {
    let module = app_module();
    let out = module.out_dir().join("dynamic");

    driver(&module)
        .exclude_type("Routers")
        .exclude_file(&format!("{ROOT}/config.go"))
        .run(&out, "dynamic")
        .unwrap();

    assert!(!out.join("config.go").exists());
    let router = read(&out.join("router.go"));
    assert!(router.contains("type Router struct"));
    assert!(!router.contains("Routers"));
}

#[test]
fn missing_root_package_is_fatal() {
    let module = app_module();
    let loader = GoPackageLoader::new(&module.root).unwrap();

    let err = Driver::new("example.com/app/pkg/nope", loader)
        .run(&module.out_dir(), "nope")
        .unwrap_err();

    assert!(matches!(err, MirrorError::PackageNotFound { .. }));
}

#[test]
fn memory_loader_drives_custom_pipelines() {
    let mut package = Package::new("pkg/dynamic", "dynamic", Path::new("/src/pkg/dynamic"));
    package.scope = dynamic_scope();
    package.imports.insert("pkg/tls".to_string());
    let loader = MemoryLoader::new().with_package(package);
    let tmp = tempfile::TempDir::new().unwrap();

    let err = Driver::new("pkg/dynamic", loader)
        .with_policy(
            RulePolicy::new()
                .with_collapse_current_package(true)
                .collapse_prefix("pkg/"),
        )
        .with_formatter(BraceFormatter)
        .with_import_resolver(PassthroughResolver)
        .include_package("pkg/tls")
        .run(tmp.path(), "dynamic")
        .unwrap_err();

    // The root package is mirrored before the missing dependency is loaded.
    let config = read(&tmp.path().join("config.go"));
    assert!(config.contains("\tInner tls.Certificate `json:\"inner\"`\n"));
    assert!(config.contains("import (\n\t\"pkg/tls\"\n)\n"));
    assert!(matches!(
        err,
        MirrorError::PackageNotFound { ref import_path, .. } if import_path == "pkg/tls"
    ));
}
