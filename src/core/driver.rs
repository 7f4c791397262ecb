use serde::Serialize;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use super::marshaler;
use super::policy::{CleaningPolicy, IdentityPolicy};
use super::scanner::{DeclarationScanner, UnsupportedPolicy};
use super::types::Package;
use super::writer::FileWriter;
use crate::error::Result;
use crate::formatters::{ImportResolver, SourceFormatter, SyntaxFormatter, UsageImportResolver};
use crate::parsers::PackageLoader;

/// Where and how the JSON marshaling helper is generated
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarshalerOptions {
    pub file_name: String,
    pub root_type: String,
}

impl Default for MarshalerOptions {
    fn default() -> Self {
        Self {
            file_name: marshaler::DEFAULT_FILE_NAME.to_string(),
            root_type: marshaler::DEFAULT_ROOT_TYPE.to_string(),
        }
    }
}

/// Outcome of mirroring one package
#[derive(Debug, Clone, Serialize)]
pub struct PackageSummary {
    pub package: String,
    pub destination: PathBuf,
    pub files: Vec<PathBuf>,
}

/// Outcome of a whole run
#[derive(Debug, Clone, Default, Serialize)]
pub struct RunSummary {
    pub packages: Vec<PackageSummary>,
    pub marshaler: Option<PathBuf>,
}

impl RunSummary {
    /// Every file written during the run
    pub fn written(&self) -> Vec<&Path> {
        self.packages
            .iter()
            .flat_map(|package| package.files.iter().map(PathBuf::as_path))
            .chain(self.marshaler.as_deref())
            .collect()
    }
}

/// Mirrors a root package and selected dependencies into a destination tree
pub struct Driver {
    root_package: String,
    loader: Box<dyn PackageLoader>,
    policy: Box<dyn CleaningPolicy>,
    formatter: Box<dyn SourceFormatter>,
    resolver: Box<dyn ImportResolver>,
    included_packages: BTreeSet<String>,
    excluded_types: BTreeSet<String>,
    excluded_files: BTreeSet<String>,
    on_unsupported: UnsupportedPolicy,
    marshaler: Option<MarshalerOptions>,
}

impl Driver {
    pub fn new(root_package: &str, loader: impl PackageLoader + 'static) -> Self {
        Self {
            root_package: root_package.to_string(),
            loader: Box::new(loader),
            policy: Box::new(IdentityPolicy),
            formatter: Box::new(SyntaxFormatter::new()),
            resolver: Box::new(UsageImportResolver::new()),
            included_packages: BTreeSet::new(),
            excluded_types: BTreeSet::new(),
            excluded_files: BTreeSet::new(),
            on_unsupported: UnsupportedPolicy::Skip,
            marshaler: Some(MarshalerOptions::default()),
        }
    }

    pub fn with_policy(mut self, policy: impl CleaningPolicy + 'static) -> Self {
        self.policy = Box::new(policy);
        self
    }

    pub fn with_formatter(mut self, formatter: impl SourceFormatter + 'static) -> Self {
        self.formatter = Box::new(formatter);
        self
    }

    pub fn with_import_resolver(mut self, resolver: impl ImportResolver + 'static) -> Self {
        self.resolver = Box::new(resolver);
        self
    }

    /// Also mirror `path` into a subdirectory when the root package imports it
    pub fn include_package(mut self, path: &str) -> Self {
        self.included_packages.insert(path.to_string());
        self
    }

    pub fn exclude_type(mut self, name: &str) -> Self {
        self.excluded_types.insert(name.to_string());
        self
    }

    /// Exclude every declaration of `<package path>/<file name>`
    pub fn exclude_file(mut self, package_file: &str) -> Self {
        self.excluded_files.insert(package_file.to_string());
        self
    }

    pub fn with_unsupported_policy(mut self, policy: UnsupportedPolicy) -> Self {
        self.on_unsupported = policy;
        self
    }

    /// Replace the options of the marshaling helper written next to the root package
    pub fn with_marshaler(mut self, options: MarshalerOptions) -> Self {
        self.marshaler = Some(options);
        self
    }

    pub fn without_marshaler(mut self) -> Self {
        self.marshaler = None;
        self
    }

    fn scanner(&self) -> DeclarationScanner<'_> {
        DeclarationScanner::new(&*self.policy)
            .with_excluded_types(self.excluded_types.iter().cloned())
            .with_excluded_files(self.excluded_files.iter().cloned())
            .with_unsupported_policy(self.on_unsupported)
    }

    fn writer(&self, dir: PathBuf) -> FileWriter<'_> {
        FileWriter::new(dir, &*self.formatter, &*self.resolver)
    }

    fn mirror(
        &self,
        scanner: &DeclarationScanner<'_>,
        package: &Package,
        package_name: &str,
        destination: PathBuf,
    ) -> Result<PackageSummary> {
        let files = scanner.scan(&package.scope, &package.path, package_name)?;
        let written = self.writer(destination.clone()).write_all(&files)?;
        tracing::info!(
            package = %package.path,
            destination = %destination.display(),
            files = written.len(),
            "mirrored package"
        );
        Ok(PackageSummary {
            package: package.path.clone(),
            destination,
            files: written,
        })
    }

    /// Mirror the root package into `destination` as `package_name` along with
    /// the marshaling helper (unless disabled), then each included dependency
    /// the root imports into `destination/<its name>`.
    pub fn run(&self, destination: &Path, package_name: &str) -> Result<RunSummary> {
        let scanner = self.scanner();
        let mut summary = RunSummary::default();

        let root = self.loader.load(&self.root_package)?;
        summary.packages.push(self.mirror(
            &scanner,
            &root,
            package_name,
            destination.to_path_buf(),
        )?);

        if let Some(options) = &self.marshaler {
            let source = marshaler::render(package_name, &options.root_type);
            let path = self
                .writer(destination.to_path_buf())
                .write_source(&options.file_name, &source)?;
            summary.marshaler = Some(path);
        }

        for path in &self.included_packages {
            if !root.imports_package(path) {
                tracing::debug!(package = %path, "not imported by the root package, skipping");
                continue;
            }
            let package = self.loader.load(path)?;
            let package_dir = destination.join(&package.name);
            summary
                .packages
                .push(self.mirror(&scanner, &package, &package.name, package_dir)?);
        }

        Ok(summary)
    }
}
