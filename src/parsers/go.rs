use regex::Regex;
use std::collections::{BTreeSet, HashMap};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use tree_sitter::Node as TSNode;
use walkdir::WalkDir;

use super::common::{extract_text, find_child_by_kind, first_error, TreeSitterParser};
use super::PackageLoader;
use crate::core::types::{Field, Package, StructType, Symbol, TypeRef};
use crate::error::{MirrorError, Result};

const BASIC_TYPES: &[&str] = &[
    "bool", "string", "int", "int8", "int16", "int32", "int64", "uint", "uint8", "uint16",
    "uint32", "uint64", "uintptr", "byte", "rune", "float32", "float64", "complex64",
    "complex128",
];

const PREDECLARED_NAMED: &[&str] = &["error", "any", "comparable"];

/// Loads Go packages of one module straight from source with tree-sitter-go
pub struct GoPackageLoader {
    module_root: PathBuf,
    module_path: String,
}

/// What one source file contributes to its package
struct ParsedFile {
    package_name: String,
    imports: Vec<String>,
    symbols: Vec<Symbol>,
}

/// Per-file state needed to resolve type expressions
struct FileContext<'a> {
    package_path: &'a str,
    /// Local package name -> import path
    imports: HashMap<String, String>,
    source: &'a [u8],
}

impl GoPackageLoader {
    /// Open the module rooted at `module_root`, reading its path from `go.mod`
    pub fn new(module_root: &Path) -> Result<Self> {
        let go_mod = module_root.join("go.mod");
        let contents = fs::read_to_string(&go_mod).map_err(|source| MirrorError::Load {
            path: go_mod.clone(),
            source,
        })?;
        let module_path = parse_module_path(&contents).ok_or_else(|| MirrorError::Parse {
            path: go_mod.clone(),
            reason: "no module directive".to_string(),
        })?;
        Ok(Self::with_module(module_root, &module_path))
    }

    pub fn with_module(module_root: &Path, module_path: &str) -> Self {
        Self {
            module_root: module_root.to_path_buf(),
            module_path: module_path.to_string(),
        }
    }

    pub fn module_path(&self) -> &str {
        &self.module_path
    }

    /// Directory holding the sources of `import_path`: inside the module, then `vendor/`
    pub fn package_dir(&self, import_path: &str) -> Result<PathBuf> {
        let candidate = if import_path == self.module_path {
            Some(self.module_root.clone())
        } else {
            import_path
                .strip_prefix(self.module_path.as_str())
                .and_then(|rest| rest.strip_prefix('/'))
                .map(|rest| self.module_root.join(rest))
        };

        if let Some(dir) = candidate {
            if dir.is_dir() {
                return Ok(dir);
            }
            return Err(MirrorError::package_not_found_with_hint(
                import_path,
                format!("{} is not a directory", dir.display()),
            ));
        }

        let vendored = self.module_root.join("vendor").join(import_path);
        if vendored.is_dir() {
            return Ok(vendored);
        }

        Err(MirrorError::package_not_found_with_hint(
            import_path,
            format!("outside module {} and not vendored", self.module_path),
        ))
    }

    fn source_files(&self, dir: &Path) -> Vec<PathBuf> {
        WalkDir::new(dir)
            .min_depth(1)
            .max_depth(1)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|entry| entry.file_type().is_file())
            .map(|entry| entry.into_path())
            .filter(|path| {
                let name = path
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_default();
                name.ends_with(".go") && !name.ends_with("_test.go")
            })
            .collect()
    }

    fn parse_file(&self, file_path: &Path, package_path: &str) -> Result<ParsedFile> {
        let mut parser = TreeSitterParser::go()?;
        let (tree, source) = parser.parse_file(file_path)?;
        let source_bytes = source.as_bytes();
        let root = tree.root_node();

        if let Some(node) = first_error(&root) {
            return Err(MirrorError::Parse {
                path: file_path.to_path_buf(),
                reason: format!("syntax error at line {}", node.start_position().row + 1),
            });
        }

        let package_name = find_child_by_kind(&root, "package_clause")
            .and_then(|clause| find_child_by_kind(&clause, "package_identifier"))
            .map(|ident| extract_text(&ident, source_bytes).to_string())
            .ok_or_else(|| MirrorError::Parse {
                path: file_path.to_path_buf(),
                reason: "missing package clause".to_string(),
            })?;

        let mut ctx = FileContext {
            package_path,
            imports: HashMap::new(),
            source: source_bytes,
        };
        let mut imports = Vec::new();
        let mut symbols = Vec::new();

        let mut cursor = root.walk();
        for child in root.children(&mut cursor) {
            match child.kind() {
                "import_declaration" => {
                    for (local, path) in self.extract_imports(&child, source_bytes) {
                        if local != "_" && local != "." {
                            ctx.imports.insert(local, path.clone());
                        }
                        imports.push(path);
                    }
                }
                "type_declaration" => {
                    self.extract_types(&child, &ctx, file_path, &mut symbols);
                }
                _ => {}
            }
        }

        Ok(ParsedFile {
            package_name,
            imports,
            symbols,
        })
    }

    fn extract_imports(&self, import_decl: &TSNode, source: &[u8]) -> Vec<(String, String)> {
        let list = find_child_by_kind(import_decl, "import_spec_list");
        let parent = list.as_ref().unwrap_or(import_decl);
        let mut cursor = parent.walk();
        let mut imports = Vec::new();

        for spec in parent.children(&mut cursor) {
            if spec.kind() != "import_spec" {
                continue;
            }
            let Some(path_node) = spec.child_by_field_name("path") else {
                continue;
            };
            let path = unquote(extract_text(&path_node, source));
            let local = match spec.child_by_field_name("name") {
                Some(name) => extract_text(&name, source).to_string(),
                None => default_package_name(&path),
            };
            imports.push((local, path));
        }

        imports
    }

    fn extract_types(
        &self,
        type_decl: &TSNode,
        ctx: &FileContext,
        file_path: &Path,
        symbols: &mut Vec<Symbol>,
    ) {
        let mut cursor = type_decl.walk();
        for spec in type_decl.children(&mut cursor) {
            if spec.kind() != "type_spec" && spec.kind() != "type_alias" {
                continue;
            }
            let (Some(name_node), Some(type_node)) = (
                spec.child_by_field_name("name"),
                spec.child_by_field_name("type"),
            ) else {
                continue;
            };

            let name = extract_text(&name_node, ctx.source);
            let line = spec.start_position().row + 1;
            let ty = if spec.child_by_field_name("type_parameters").is_some() {
                TypeRef::Generic(extract_text(&spec, ctx.source).to_string())
            } else {
                ctx.convert(&type_node)
            };

            symbols.push(Symbol::new(name, file_path, line, ty));
        }
    }
}

impl PackageLoader for GoPackageLoader {
    fn load(&self, import_path: &str) -> Result<Package> {
        self.load_package(import_path, &mut Vec::new())
    }
}

impl GoPackageLoader {
    /// `loading` holds the import paths whose load is in progress further up
    fn load_package(&self, import_path: &str, loading: &mut Vec<String>) -> Result<Package> {
        let dir = self.package_dir(import_path)?;
        let files = self.source_files(&dir);
        if files.is_empty() {
            return Err(MirrorError::package_not_found_with_hint(
                import_path,
                format!("no Go source files in {}", dir.display()),
            ));
        }

        let mut package: Option<Package> = None;
        for file in &files {
            let parsed = self.parse_file(file, import_path)?;
            let current = package
                .get_or_insert_with(|| Package::new(import_path, &parsed.package_name, &dir));

            if parsed.package_name != current.name {
                tracing::debug!(
                    file = %file.display(),
                    found = %parsed.package_name,
                    expected = %current.name,
                    "skipping file from another package"
                );
                continue;
            }

            current.imports.extend(parsed.imports);
            for symbol in parsed.symbols {
                let name = symbol.name.clone();
                if let Some(previous) = current.scope.insert(symbol) {
                    tracing::warn!(
                        name = %name,
                        previous = %previous.file.display(),
                        "duplicate declaration, keeping the last one"
                    );
                }
            }
        }

        let mut package = package.ok_or_else(|| MirrorError::package_not_found(import_path))?;
        loading.push(import_path.to_string());
        self.resolve_external(&mut package, loading);
        loading.pop();

        tracing::debug!(
            package = %package.path,
            name = %package.name,
            files = files.len(),
            declarations = package.scope.len(),
            "loaded package"
        );
        Ok(package)
    }

    /// Record underlying types for declarations defined in terms of a named
    /// type of another package, e.g. `type Cert tls.Certificate`.
    ///
    /// Packages the loader cannot reach (the standard library, unvendored
    /// modules) leave the name unresolved.
    fn resolve_external(&self, package: &mut Package, loading: &mut Vec<String>) {
        let mut wanted = BTreeSet::new();
        for name in package.scope.names() {
            let Some(symbol) = package.scope.lookup(name) else {
                continue;
            };
            if let TypeRef::Named { package: path, name } = package.scope.underlying(&symbol.ty) {
                if !path.is_empty() && *path != package.path {
                    wanted.insert((path.clone(), name.clone()));
                }
            }
        }

        let mut dependencies: HashMap<String, Option<Package>> = HashMap::new();
        for (path, name) in wanted {
            if !dependencies.contains_key(&path) {
                let dependency = self.load_dependency(&path, loading);
                dependencies.insert(path.clone(), dependency);
            }
            let Some(Some(dependency)) = dependencies.get(&path) else {
                continue;
            };

            let target = TypeRef::named(&path, &name);
            match dependency.scope.underlying(&target) {
                TypeRef::Named { .. } => {
                    tracing::debug!(package = %path, name = %name, "external type left unresolved");
                }
                resolved => package.scope.insert_external(&path, &name, resolved.clone()),
            }
        }
    }

    fn load_dependency(&self, path: &str, loading: &mut Vec<String>) -> Option<Package> {
        if loading.iter().any(|p| p == path) {
            tracing::warn!(package = %path, "import cycle while resolving external types");
            return None;
        }
        match self.load_package(path, loading) {
            Ok(dependency) => Some(dependency),
            Err(MirrorError::PackageNotFound { .. }) => {
                tracing::debug!(package = %path, "not loadable, external types stay unresolved");
                None
            }
            Err(err) => {
                tracing::warn!(package = %path, error = %err, "failed to load dependency");
                None
            }
        }
    }
}

impl FileContext<'_> {
    fn text(&self, node: &TSNode) -> String {
        extract_text(node, self.source).to_string()
    }

    fn convert(&self, node: &TSNode) -> TypeRef {
        match node.kind() {
            "type_identifier" => {
                let name = self.text(node);
                if BASIC_TYPES.contains(&name.as_str()) {
                    TypeRef::Basic(name)
                } else if PREDECLARED_NAMED.contains(&name.as_str()) {
                    TypeRef::named("", &name)
                } else {
                    TypeRef::named(self.package_path, &name)
                }
            }
            "qualified_type" => {
                let local = node
                    .child_by_field_name("package")
                    .map(|n| self.text(&n))
                    .unwrap_or_default();
                let name = node
                    .child_by_field_name("name")
                    .map(|n| self.text(&n))
                    .unwrap_or_default();
                let package = self.imports.get(&local).cloned().unwrap_or(local);
                TypeRef::Named { package, name }
            }
            "pointer_type" | "parenthesized_type" => match node.named_child(0) {
                Some(inner) if node.kind() == "pointer_type" => {
                    TypeRef::pointer(self.convert(&inner))
                }
                Some(inner) => self.convert(&inner),
                None => TypeRef::Generic(self.text(node)),
            },
            "slice_type" => match node.child_by_field_name("element") {
                Some(elem) => TypeRef::slice(self.convert(&elem)),
                None => TypeRef::Generic(self.text(node)),
            },
            "array_type" | "implicit_length_array_type" => {
                let len = node
                    .child_by_field_name("length")
                    .map(|n| self.text(&n))
                    .unwrap_or_else(|| "...".to_string());
                match node.child_by_field_name("element") {
                    Some(elem) => TypeRef::Array {
                        len,
                        elem: Box::new(self.convert(&elem)),
                    },
                    None => TypeRef::Generic(self.text(node)),
                }
            }
            "map_type" => match (
                node.child_by_field_name("key"),
                node.child_by_field_name("value"),
            ) {
                (Some(key), Some(value)) => TypeRef::map(self.convert(&key), self.convert(&value)),
                _ => TypeRef::Generic(self.text(node)),
            },
            "struct_type" => TypeRef::Struct(self.convert_struct(node)),
            "interface_type" => TypeRef::Interface(self.text(node)),
            "function_type" => TypeRef::Func(self.text(node)),
            "channel_type" => TypeRef::Chan(self.text(node)),
            _ => TypeRef::Generic(self.text(node)),
        }
    }

    fn convert_struct(&self, struct_node: &TSNode) -> StructType {
        let mut st = StructType::default();
        let Some(list) = find_child_by_kind(struct_node, "field_declaration_list") else {
            return st;
        };

        let mut cursor = list.walk();
        for decl in list.children(&mut cursor) {
            if decl.kind() != "field_declaration" {
                continue;
            }
            let Some(type_node) = decl.child_by_field_name("type") else {
                continue;
            };
            let tag = decl
                .child_by_field_name("tag")
                .map(|n| unquote(extract_text(&n, self.source)));

            let mut name_cursor = decl.walk();
            let names: Vec<String> = decl
                .children_by_field_name("name", &mut name_cursor)
                .map(|n| self.text(&n))
                .collect();

            let ty = self.convert(&type_node);
            if names.is_empty() {
                let mut star_cursor = decl.walk();
                let is_pointer = decl.children(&mut star_cursor).any(|c| c.kind() == "*");
                let ty = if is_pointer { TypeRef::pointer(ty) } else { ty };
                let mut field = Field::embedded(ty);
                field.tag = tag;
                st.fields.push(field);
                continue;
            }

            for name in names {
                st.fields.push(Field {
                    name,
                    ty: ty.clone(),
                    embedded: false,
                    tag: tag.clone(),
                });
            }
        }

        st
    }
}

/// Strip the delimiters of a raw or interpreted Go string literal
fn unquote(literal: &str) -> String {
    if let Some(raw) = literal.strip_prefix('`').and_then(|s| s.strip_suffix('`')) {
        return raw.to_string();
    }
    let inner = literal
        .strip_prefix('"')
        .and_then(|s| s.strip_suffix('"'))
        .unwrap_or(literal);

    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some(other) => out.push(other),
            None => {}
        }
    }
    out
}

fn module_regex() -> &'static Regex {
    static MODULE: OnceLock<Regex> = OnceLock::new();
    MODULE.get_or_init(|| {
        Regex::new(r#"(?m)^\s*module\s+"?([^\s"]+)"?"#)
            .unwrap_or_else(|err| panic!("invalid module pattern: {err}"))
    })
}

fn version_regex() -> &'static Regex {
    static VERSION: OnceLock<Regex> = OnceLock::new();
    VERSION.get_or_init(|| {
        Regex::new(r"^v[0-9]+$").unwrap_or_else(|err| panic!("invalid version pattern: {err}"))
    })
}

fn dotted_version_regex() -> &'static Regex {
    static DOTTED: OnceLock<Regex> = OnceLock::new();
    DOTTED.get_or_init(|| {
        Regex::new(r"\.v[0-9]+$").unwrap_or_else(|err| panic!("invalid version pattern: {err}"))
    })
}

/// Module path declared by a `go.mod` file
pub fn parse_module_path(go_mod: &str) -> Option<String> {
    module_regex()
        .captures(go_mod)
        .map(|captures| captures[1].to_string())
}

/// The package name an unaliased import of `path` binds by convention.
///
/// `example.com/tls` -> `tls`, `example.com/api/v2` -> `api`,
/// `gopkg.in/yaml.v3` -> `yaml`, `example.com/go-toml` -> `toml`.
pub fn default_package_name(path: &str) -> String {
    let mut segments = path.rsplit('/');
    let mut last = segments.next().unwrap_or(path);
    if version_regex().is_match(last) {
        if let Some(previous) = segments.next() {
            last = previous;
        }
    }
    let last = dotted_version_regex().replace(last, "");
    let last = last.strip_prefix("go-").unwrap_or(&last);
    last.replace(['-', '.'], "_")
}
