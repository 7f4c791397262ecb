use std::collections::BTreeSet;

use super::policy::CleaningPolicy;
use super::types::TypeRef;

/// Turns type references into declaration text through a cleaning policy
#[derive(Clone, Copy)]
pub struct TypeRenderer<'a> {
    policy: &'a dyn CleaningPolicy,
}

impl<'a> TypeRenderer<'a> {
    pub fn new(policy: &'a dyn CleaningPolicy) -> Self {
        Self { policy }
    }

    pub fn render(&self, ty: &TypeRef, current_package: &str) -> String {
        self.policy.clean_type(ty, current_package)
    }

    /// Cleaned import paths for every foreign package `ty` mentions, sorted.
    ///
    /// Builtins, types of `current_package` and packages the policy cleans to
    /// the empty string contribute nothing.
    pub fn imports_for(&self, ty: &TypeRef, current_package: &str) -> Vec<String> {
        let mut imports = BTreeSet::new();
        for package in referenced_packages(ty) {
            if package == current_package {
                continue;
            }
            let cleaned = self.policy.clean_package(package);
            if !cleaned.is_empty() && cleaned != current_package {
                imports.insert(cleaned);
            }
        }
        imports.into_iter().collect()
    }
}

/// Declaring packages of every named type reachable from `ty`, sorted and
/// deduplicated.
///
/// The walk covers pointers, slices, arrays, map keys and values, and the
/// fields of anonymous structs. Predeclared names have no package.
pub fn referenced_packages(ty: &TypeRef) -> Vec<&str> {
    let mut packages = BTreeSet::new();
    collect_packages(ty, &mut packages);
    packages.into_iter().collect()
}

fn collect_packages<'t>(ty: &'t TypeRef, packages: &mut BTreeSet<&'t str>) {
    match ty {
        TypeRef::Named { package, .. } => {
            if !package.is_empty() {
                packages.insert(package.as_str());
            }
        }
        TypeRef::Pointer(elem) | TypeRef::Slice(elem) | TypeRef::Array { elem, .. } => {
            collect_packages(elem, packages)
        }
        TypeRef::Map { key, value } => {
            collect_packages(key, packages);
            collect_packages(value, packages);
        }
        TypeRef::Struct(st) => {
            for field in &st.fields {
                collect_packages(&field.ty, packages);
            }
        }
        TypeRef::Basic(_)
        | TypeRef::Interface(_)
        | TypeRef::Func(_)
        | TypeRef::Chan(_)
        | TypeRef::Generic(_) => {}
    }
}
