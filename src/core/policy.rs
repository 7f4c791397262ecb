//! Type-name and package-path cleaning policies
//!
//! A policy decides how a type reference is spelled in the mirror package and
//! which import path (if any) a referenced package turns into. The scanner and
//! the field projector only ever talk to the [`CleaningPolicy`] trait.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::types::TypeRef;

/// Rewriting strategy applied while rendering declarations
pub trait CleaningPolicy {
    /// Text for `ty` as it should appear in a declaration of `current_package`
    fn clean_type(&self, ty: &TypeRef, current_package: &str) -> String {
        let _ = current_package;
        ty.qualified()
    }

    /// Import path for a referenced package; an empty string means no import
    fn clean_package(&self, path: &str) -> String {
        path.to_string()
    }
}

impl<T: CleaningPolicy + ?Sized> CleaningPolicy for &T {
    fn clean_type(&self, ty: &TypeRef, current_package: &str) -> String {
        (**self).clean_type(ty, current_package)
    }

    fn clean_package(&self, path: &str) -> String {
        (**self).clean_package(path)
    }
}

impl<T: CleaningPolicy + ?Sized> CleaningPolicy for Box<T> {
    fn clean_type(&self, ty: &TypeRef, current_package: &str) -> String {
        (**self).clean_type(ty, current_package)
    }

    fn clean_package(&self, path: &str) -> String {
        (**self).clean_package(path)
    }
}

/// Leaves every type and package path untouched
#[derive(Debug, Clone, Copy, Default)]
pub struct IdentityPolicy;

impl CleaningPolicy for IdentityPolicy {}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageRewrite {
    pub from: String,
    pub to: String,
}

/// Table-driven policy built from configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RulePolicy {
    /// Exact qualified type text -> replacement, checked at every node
    pub type_substitutions: BTreeMap<String, String>,
    /// Drop the qualifier of types declared in the package being rendered
    pub collapse_current_package: bool,
    /// Package-path prefixes stripped from type qualifiers
    pub collapse_prefixes: Vec<String>,
    /// Package paths that never produce an import
    pub dropped_packages: Vec<String>,
    /// Prefix rewrites for import paths, first match wins
    pub package_rewrites: Vec<PackageRewrite>,
}

impl RulePolicy {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn substitute(mut self, from: &str, to: &str) -> Self {
        self.type_substitutions
            .insert(from.to_string(), to.to_string());
        self
    }

    pub fn with_collapse_current_package(mut self, collapse: bool) -> Self {
        self.collapse_current_package = collapse;
        self
    }

    pub fn collapse_prefix(mut self, prefix: &str) -> Self {
        self.collapse_prefixes.push(prefix.to_string());
        self
    }

    pub fn drop_package(mut self, path: &str) -> Self {
        self.dropped_packages.push(path.to_string());
        self
    }

    pub fn rewrite_package(mut self, from: &str, to: &str) -> Self {
        self.package_rewrites.push(PackageRewrite {
            from: from.to_string(),
            to: to.to_string(),
        });
        self
    }

    fn qualifier(&self, package: &str, current_package: &str) -> String {
        if self.collapse_current_package && package == current_package {
            return String::new();
        }
        self.collapse_prefixes
            .iter()
            .find_map(|prefix| package.strip_prefix(prefix.as_str()))
            .unwrap_or(package)
            .to_string()
    }
}

impl CleaningPolicy for RulePolicy {
    fn clean_type(&self, ty: &TypeRef, current_package: &str) -> String {
        ty.render_with(&|node| {
            if !self.type_substitutions.is_empty() {
                if let Some(replacement) = self.type_substitutions.get(&node.qualified()) {
                    return Some(replacement.clone());
                }
            }
            match node {
                TypeRef::Named { package, name } if !package.is_empty() => {
                    let qualifier = self.qualifier(package, current_package);
                    if qualifier.is_empty() {
                        Some(name.clone())
                    } else {
                        Some(format!("{qualifier}.{name}"))
                    }
                }
                _ => None,
            }
        })
    }

    fn clean_package(&self, path: &str) -> String {
        if self.dropped_packages.iter().any(|dropped| dropped == path) {
            return String::new();
        }
        for rewrite in &self.package_rewrites {
            if let Some(rest) = path.strip_prefix(rewrite.from.as_str()) {
                return format!("{}{}", rewrite.to, rest);
            }
        }
        path.to_string()
    }
}
