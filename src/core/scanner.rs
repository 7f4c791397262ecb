use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use super::imports::ImportCollector;
use super::policy::CleaningPolicy;
use super::projector::FieldProjector;
use super::render::TypeRenderer;
use super::types::{Scope, TypeRef};
use crate::error::{MirrorError, Result};

/// One mirrored declaration and its generated text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Declaration {
    pub name: String,
    pub text: String,
}

/// A generated file, keyed by the base name of the file it was mirrored from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputFile {
    pub name: String,
    pub package_name: String,
    pub declarations: Vec<Declaration>,
    pub imports: ImportCollector,
}

impl OutputFile {
    pub fn new(name: &str, package_name: &str) -> Self {
        Self {
            name: name.to_string(),
            package_name: package_name.to_string(),
            declarations: Vec::new(),
            imports: ImportCollector::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.declarations.is_empty()
    }

    pub fn declaration(&self, name: &str) -> Option<&Declaration> {
        self.declarations.iter().find(|decl| decl.name == name)
    }
}

/// Output files of one scanned package, ordered by file name
pub type OutputFiles = BTreeMap<String, OutputFile>;

/// What to do with an exported declaration that is not data-shaped
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnsupportedPolicy {
    /// Log and leave it out of the mirror
    #[default]
    Skip,
    /// Abort the run
    Fail,
}

/// Walks a package scope and renders every exported, non-excluded declaration
pub struct DeclarationScanner<'a> {
    policy: &'a dyn CleaningPolicy,
    excluded_types: BTreeSet<String>,
    excluded_files: BTreeSet<String>,
    on_unsupported: UnsupportedPolicy,
}

impl<'a> DeclarationScanner<'a> {
    pub fn new(policy: &'a dyn CleaningPolicy) -> Self {
        Self {
            policy,
            excluded_types: BTreeSet::new(),
            excluded_files: BTreeSet::new(),
            on_unsupported: UnsupportedPolicy::Skip,
        }
    }

    pub fn with_excluded_types<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.excluded_types.extend(names.into_iter().map(Into::into));
        self
    }

    /// Exclude files given as `<package path>/<file name>`
    pub fn with_excluded_files<I, S>(mut self, files: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.excluded_files.extend(files.into_iter().map(Into::into));
        self
    }

    pub fn with_unsupported_policy(mut self, policy: UnsupportedPolicy) -> Self {
        self.on_unsupported = policy;
        self
    }

    /// Mirror the exported declarations of `scope` into files of `package_name`
    pub fn scan(
        &self,
        scope: &Scope,
        package_path: &str,
        package_name: &str,
    ) -> Result<OutputFiles> {
        let renderer = TypeRenderer::new(self.policy);
        let projector = FieldProjector::new(renderer);
        let mut files = OutputFiles::new();

        for name in scope.names() {
            if self.excluded_types.contains(name) {
                tracing::debug!(name, "excluded by type name");
                continue;
            }
            let Some(symbol) = scope.lookup(name) else {
                continue;
            };
            if !symbol.is_exported() {
                continue;
            }

            let file_name = symbol.file_name();
            if self
                .excluded_files
                .contains(&format!("{package_path}/{file_name}"))
            {
                tracing::debug!(name, file = %file_name, "excluded by source file");
                continue;
            }

            let file = files
                .entry(file_name.clone())
                .or_insert_with(|| OutputFile::new(&file_name, package_name));

            let underlying = scope.underlying(&symbol.ty);
            let text = match underlying {
                TypeRef::Struct(st) => {
                    projector.render_struct(name, st, package_path, &mut file.imports)
                }
                TypeRef::Map { key, value } => {
                    for path in renderer.imports_for(underlying, package_path) {
                        file.imports.add(&path);
                    }
                    format!(
                        "type {} map[{}]{}\n",
                        name,
                        key.qualified(),
                        renderer.render(value, package_path)
                    )
                }
                TypeRef::Slice(elem) => {
                    for path in renderer.imports_for(underlying, package_path) {
                        file.imports.add(&path);
                    }
                    format!("type {} []{}\n", name, renderer.render(elem, package_path))
                }
                TypeRef::Basic(basic) => format!("type {name} {basic}\n"),
                other => {
                    match self.on_unsupported {
                        UnsupportedPolicy::Skip => {
                            tracing::info!(
                                package = package_path,
                                name,
                                kind = other.kind_name(),
                                "skipping declaration with unsupported underlying type"
                            );
                        }
                        UnsupportedPolicy::Fail => {
                            return Err(MirrorError::UnsupportedDeclaration {
                                package: package_path.to_string(),
                                name: name.to_string(),
                                kind: other.kind_name().to_string(),
                            });
                        }
                    }
                    continue;
                }
            };

            if !text.is_empty() {
                file.declarations.push(Declaration {
                    name: name.to_string(),
                    text,
                });
            }
        }

        Ok(files)
    }
}
