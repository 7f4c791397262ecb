//! `mirrorgen.toml` configuration
//!
//! ```toml
//! module_root = "."
//! root_package = "example.com/app/pkg/config/dynamic"
//! destination = "mirror/dynamic"
//! package_name = "dynamic"
//! included_packages = ["example.com/app/pkg/tls"]
//! excluded_types = ["Message"]
//! excluded_files = ["example.com/app/pkg/config/dynamic/plugins.go"]
//! on_unsupported = "skip"
//!
//! [cleaning]
//! collapse_current_package = true
//! collapse_prefixes = ["example.com/app/pkg/"]
//! dropped_packages = ["example.com/app/pkg/types"]
//!
//! [cleaning.type_substitutions]
//! "example.com/app/pkg/types.Duration" = "string"
//!
//! [[cleaning.package_rewrites]]
//! from = "example.com/app/pkg"
//! to = "example.com/mirror"
//!
//! [formatter]
//! command = ["gofmt"]
//!
//! [marshaler]
//! enabled = true
//! root_type = "Configuration"
//! ```

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::core::driver::{Driver, MarshalerOptions};
use crate::core::marshaler;
use crate::core::policy::RulePolicy;
use crate::core::scanner::UnsupportedPolicy;
use crate::error::{MirrorError, Result};
use crate::formatters::{ExternalTool, SyntaxFormatter, UsageImportResolver};
use crate::parsers::GoPackageLoader;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MirrorConfig {
    /// Directory containing the source module's `go.mod`
    pub module_root: PathBuf,
    pub root_package: String,
    pub destination: PathBuf,
    pub package_name: String,
    pub included_packages: Vec<String>,
    pub excluded_types: Vec<String>,
    /// `<package path>/<file name>` entries
    pub excluded_files: Vec<String>,
    pub on_unsupported: UnsupportedPolicy,
    pub cleaning: RulePolicy,
    pub formatter: ToolConfig,
    pub imports: ToolConfig,
    pub marshaler: MarshalerConfig,
}

/// An external command, or the built-in implementation when empty
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ToolConfig {
    pub command: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MarshalerConfig {
    /// Write the helper at all
    pub enabled: bool,
    pub file_name: String,
    pub root_type: String,
}

impl Default for MarshalerConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            file_name: marshaler::DEFAULT_FILE_NAME.to_string(),
            root_type: marshaler::DEFAULT_ROOT_TYPE.to_string(),
        }
    }
}

impl Default for MirrorConfig {
    fn default() -> Self {
        Self {
            module_root: PathBuf::from("."),
            root_package: String::new(),
            destination: PathBuf::new(),
            package_name: String::new(),
            included_packages: Vec::new(),
            excluded_types: Vec::new(),
            excluded_files: Vec::new(),
            on_unsupported: UnsupportedPolicy::Skip,
            cleaning: RulePolicy::default(),
            formatter: ToolConfig::default(),
            imports: ToolConfig::default(),
            marshaler: MarshalerConfig::default(),
        }
    }
}

impl MirrorConfig {
    /// Read a config file; relative paths in it resolve against its directory
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path).map_err(|err| {
            MirrorError::config(Some(path.to_path_buf()), format!("cannot read: {err}"))
        })?;
        let mut config: Self = toml::from_str(&text)
            .map_err(|err| MirrorError::config(Some(path.to_path_buf()), err.to_string()))?;
        if let Some(base) = path.parent() {
            config.resolve_paths(base);
        }
        Ok(config)
    }

    pub fn from_toml_str(text: &str) -> Result<Self> {
        toml::from_str(text).map_err(|err| MirrorError::config(None, err.to_string()))
    }

    /// Anchor relative `module_root` and `destination` at `base`
    pub fn resolve_paths(&mut self, base: &Path) {
        if self.module_root.is_relative() {
            self.module_root = base.join(&self.module_root);
        }
        if !self.destination.as_os_str().is_empty() && self.destination.is_relative() {
            self.destination = base.join(&self.destination);
        }
    }

    /// Check the settings a run cannot do without
    pub fn validate(&self) -> Result<()> {
        if self.root_package.trim().is_empty() {
            return Err(MirrorError::config(None, "root_package is required"));
        }
        if self.destination.as_os_str().is_empty() {
            return Err(MirrorError::config(None, "destination is required"));
        }
        if !is_identifier(&self.package_name) {
            return Err(MirrorError::config(
                None,
                format!("package_name {:?} is not a valid Go identifier", self.package_name),
            ));
        }
        for entry in &self.excluded_files {
            if !entry.contains('/') {
                return Err(MirrorError::config(
                    None,
                    format!("excluded file {entry:?} must be <package path>/<file name>"),
                ));
            }
        }
        Ok(())
    }

    /// Wire a driver for this configuration, loading sources from `module_root`
    pub fn build_driver(&self) -> Result<Driver> {
        self.validate()?;
        let loader = GoPackageLoader::new(&self.module_root)?;

        let mut driver = Driver::new(&self.root_package, loader)
            .with_policy(self.cleaning.clone())
            .with_unsupported_policy(self.on_unsupported);

        driver = match ExternalTool::from_command_line(&self.formatter.command) {
            Some(tool) => driver.with_formatter(tool),
            None => driver.with_formatter(SyntaxFormatter::new()),
        };
        driver = match ExternalTool::from_command_line(&self.imports.command) {
            Some(tool) => driver.with_import_resolver(tool),
            None => driver.with_import_resolver(UsageImportResolver::new()),
        };

        for path in &self.included_packages {
            driver = driver.include_package(path);
        }
        for name in &self.excluded_types {
            driver = driver.exclude_type(name);
        }
        for file in &self.excluded_files {
            driver = driver.exclude_file(file);
        }
        driver = if self.marshaler.enabled {
            driver.with_marshaler(MarshalerOptions {
                file_name: self.marshaler.file_name.clone(),
                root_type: self.marshaler.root_type.clone(),
            })
        } else {
            driver.without_marshaler()
        };

        Ok(driver)
    }
}

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if first.is_alphabetic() || first == '_' => {
            chars.all(|c| c.is_alphanumeric() || c == '_')
        }
        _ => false,
    }
}
