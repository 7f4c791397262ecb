use criterion::{black_box, criterion_group, criterion_main, Criterion};
use mirrorgen::core::{DeclarationScanner, RulePolicy};
use mirrorgen::parsers::{GoPackageLoader, PackageLoader};
use tempfile::TempDir;

const MODULE: &str = "example.com/bench";
const PACKAGE: &str = "example.com/bench/pkg/config/dynamic";

fn write_module(files: usize) -> TempDir {
    let tmp = TempDir::new().unwrap();
    std::fs::write(tmp.path().join("go.mod"), format!("module {MODULE}\n")).unwrap();
    let dir = tmp.path().join("pkg/config/dynamic");
    std::fs::create_dir_all(&dir).unwrap();

    for i in 0..files {
        let content = format!(
            r#"package dynamic

import "example.com/bench/pkg/tls"

type Router{i} struct {{
	Rule        string            `json:"rule,omitempty"`
	Service     *Service{i}       `json:"service,omitempty"`
	Middlewares []string          `json:"middlewares,omitempty"`
	Certs       map[string]tls.Store `json:"certs,omitempty"`
	priority    int
}}

type Service{i} struct {{
	Servers []*Server{i} `json:"servers"`
	Sticky  bool         `json:"sticky" toml:"sticky"`
}}

type Server{i} struct {{
	URL string `json:"url"`
}}

type Routers{i} map[string]*Router{i}
"#
        );
        std::fs::write(dir.join(format!("router_{i}.go")), content).unwrap();
    }
    tmp
}

fn policy() -> RulePolicy {
    RulePolicy::new()
        .with_collapse_current_package(true)
        .collapse_prefix("example.com/bench/pkg/")
        .rewrite_package("example.com/bench/pkg", "example.com/mirror")
}

fn benchmark_loading(c: &mut Criterion) {
    let mut group = c.benchmark_group("package_loading");

    let small = write_module(10);
    group.bench_function("small_package", |b| {
        let loader = GoPackageLoader::new(small.path()).unwrap();
        b.iter(|| black_box(loader.load(black_box(PACKAGE)).unwrap()));
    });

    let large = write_module(100);
    group.bench_function("large_package", |b| {
        let loader = GoPackageLoader::new(large.path()).unwrap();
        b.iter(|| black_box(loader.load(black_box(PACKAGE)).unwrap()));
    });

    group.finish();
}

fn benchmark_scanning(c: &mut Criterion) {
    let mut group = c.benchmark_group("declaration_scanning");

    let module = write_module(100);
    let package = GoPackageLoader::new(module.path())
        .unwrap()
        .load(PACKAGE)
        .unwrap();
    let policy = policy();

    group.bench_function("scan_large_package", |b| {
        let scanner = DeclarationScanner::new(&policy);
        b.iter(|| {
            let files = scanner
                .scan(black_box(&package.scope), PACKAGE, "dynamic")
                .unwrap();
            black_box(files)
        });
    });

    group.finish();
}

criterion_group!(benches, benchmark_loading, benchmark_scanning);
criterion_main!(benches);
