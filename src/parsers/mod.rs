pub mod common;
pub mod go;

use std::collections::HashMap;

use crate::core::types::Package;
use crate::error::{MirrorError, Result};

pub use go::GoPackageLoader;

/// Produces a type-checked view of a package from its import path
pub trait PackageLoader {
    fn load(&self, import_path: &str) -> Result<Package>;
}

impl<T: PackageLoader + ?Sized> PackageLoader for Box<T> {
    fn load(&self, import_path: &str) -> Result<Package> {
        (**self).load(import_path)
    }
}

/// Serves packages that were built up front, e.g. by another frontend
#[derive(Debug, Clone, Default)]
pub struct MemoryLoader {
    packages: HashMap<String, Package>,
}

impl MemoryLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_package(mut self, package: Package) -> Self {
        self.packages.insert(package.path.clone(), package);
        self
    }
}

impl PackageLoader for MemoryLoader {
    fn load(&self, import_path: &str) -> Result<Package> {
        self.packages
            .get(import_path)
            .cloned()
            .ok_or_else(|| MirrorError::package_not_found(import_path))
    }
}
