use std::collections::{BTreeMap, BTreeSet};
use std::fmt::{self, Write as _};
use std::path::{Path, PathBuf};

/// A resolved type reference as seen from inside a loaded package
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeRef {
    /// Predeclared numeric, string or bool type
    Basic(String),
    /// A named type; an empty package means a predeclared name such as `error`
    Named { package: String, name: String },
    Pointer(Box<TypeRef>),
    Slice(Box<TypeRef>),
    Array { len: String, elem: Box<TypeRef> },
    Map { key: Box<TypeRef>, value: Box<TypeRef> },
    Struct(StructType),
    Interface(String),
    Func(String),
    Chan(String),
    Generic(String),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StructType {
    pub fields: Vec<Field>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    pub name: String,
    pub ty: TypeRef,
    pub embedded: bool,
    /// Raw struct tag without its surrounding quotes
    pub tag: Option<String>,
}

impl TypeRef {
    pub fn basic(name: &str) -> Self {
        TypeRef::Basic(name.to_string())
    }

    pub fn named(package: &str, name: &str) -> Self {
        TypeRef::Named {
            package: package.to_string(),
            name: name.to_string(),
        }
    }

    pub fn pointer(elem: TypeRef) -> Self {
        TypeRef::Pointer(Box::new(elem))
    }

    pub fn slice(elem: TypeRef) -> Self {
        TypeRef::Slice(Box::new(elem))
    }

    pub fn map(key: TypeRef, value: TypeRef) -> Self {
        TypeRef::Map {
            key: Box::new(key),
            value: Box::new(value),
        }
    }

    /// Fully qualified textual form, e.g. `map[string]*example.com/pkg/tls.Certificate`
    pub fn qualified(&self) -> String {
        self.render_with(&|_| None)
    }

    /// Render the type, letting `visit` substitute the text of any node.
    ///
    /// `visit` is called on the outermost node first; returning `None` writes the
    /// default form for that node and continues with its children.
    pub fn render_with<F>(&self, visit: &F) -> String
    where
        F: Fn(&TypeRef) -> Option<String>,
    {
        let mut out = String::new();
        self.write_with(&mut out, visit);
        out
    }

    fn write_with<F>(&self, out: &mut String, visit: &F)
    where
        F: Fn(&TypeRef) -> Option<String>,
    {
        if let Some(text) = visit(self) {
            out.push_str(&text);
            return;
        }

        match self {
            TypeRef::Basic(name) => out.push_str(name),
            TypeRef::Named { package, name } => {
                if !package.is_empty() {
                    out.push_str(package);
                    out.push('.');
                }
                out.push_str(name);
            }
            TypeRef::Pointer(elem) => {
                out.push('*');
                elem.write_with(out, visit);
            }
            TypeRef::Slice(elem) => {
                out.push_str("[]");
                elem.write_with(out, visit);
            }
            TypeRef::Array { len, elem } => {
                let _ = write!(out, "[{len}]");
                elem.write_with(out, visit);
            }
            TypeRef::Map { key, value } => {
                out.push_str("map[");
                key.write_with(out, visit);
                out.push(']');
                value.write_with(out, visit);
            }
            TypeRef::Struct(st) => {
                out.push_str("struct{");
                for (i, field) in st.fields.iter().enumerate() {
                    if i > 0 {
                        out.push_str("; ");
                    }
                    if !field.embedded {
                        out.push_str(&field.name);
                        out.push(' ');
                    }
                    field.ty.write_with(out, visit);
                    if let Some(tag) = &field.tag {
                        out.push(' ');
                        out.push_str(&quote(tag));
                    }
                }
                out.push('}');
            }
            TypeRef::Interface(text)
            | TypeRef::Func(text)
            | TypeRef::Chan(text)
            | TypeRef::Generic(text) => out.push_str(text),
        }
    }

    /// Short kind label used in diagnostics
    pub fn kind_name(&self) -> &'static str {
        match self {
            TypeRef::Basic(_) => "basic",
            TypeRef::Named { .. } => "named",
            TypeRef::Pointer(_) => "pointer",
            TypeRef::Slice(_) => "slice",
            TypeRef::Array { .. } => "array",
            TypeRef::Map { .. } => "map",
            TypeRef::Struct(_) => "struct",
            TypeRef::Interface(_) => "interface",
            TypeRef::Func(_) => "func",
            TypeRef::Chan(_) => "chan",
            TypeRef::Generic(_) => "generic",
        }
    }
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.qualified())
    }
}

impl Field {
    pub fn new(name: &str, ty: TypeRef) -> Self {
        Self {
            name: name.to_string(),
            ty,
            embedded: false,
            tag: None,
        }
    }

    /// An embedded field; its name is the bare type name as in Go
    pub fn embedded(ty: TypeRef) -> Self {
        let name = embedded_name(&ty);
        Self {
            name,
            ty,
            embedded: true,
            tag: None,
        }
    }

    pub fn with_tag(mut self, tag: &str) -> Self {
        self.tag = Some(tag.to_string());
        self
    }

    pub fn is_exported(&self) -> bool {
        is_exported(&self.name)
    }
}

fn embedded_name(ty: &TypeRef) -> String {
    match ty {
        TypeRef::Pointer(elem) => embedded_name(elem),
        TypeRef::Named { name, .. } | TypeRef::Basic(name) => name.clone(),
        other => other.qualified(),
    }
}

/// Go's exported-identifier rule: the first character is an uppercase letter
pub fn is_exported(name: &str) -> bool {
    name.chars().next().is_some_and(char::is_uppercase)
}

/// Quote a string the way Go prints struct tags inside type strings
pub fn quote(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len() + 2);
    out.push('"');
    for c in raw.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

/// One top-level type declaration of a package
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Symbol {
    pub name: String,
    /// Path of the declaring source file
    pub file: PathBuf,
    pub line: usize,
    /// The declared type expression, before underlying-type resolution
    pub ty: TypeRef,
}

impl Symbol {
    pub fn new(name: &str, file: impl Into<PathBuf>, line: usize, ty: TypeRef) -> Self {
        Self {
            name: name.to_string(),
            file: file.into(),
            line,
            ty,
        }
    }

    /// Base name of the declaring file, e.g. `config.go`
    pub fn file_name(&self) -> String {
        self.file
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    pub fn is_exported(&self) -> bool {
        is_exported(&self.name)
    }
}

/// Name-ordered declaration scope of one package
#[derive(Debug, Clone, Default)]
pub struct Scope {
    package_path: String,
    symbols: BTreeMap<String, Symbol>,
    /// Underlying types of named types declared in other packages, keyed by
    /// `(package path, name)`
    external: BTreeMap<(String, String), TypeRef>,
}

impl Scope {
    pub fn new(package_path: &str) -> Self {
        Self {
            package_path: package_path.to_string(),
            symbols: BTreeMap::new(),
            external: BTreeMap::new(),
        }
    }

    pub fn package_path(&self) -> &str {
        &self.package_path
    }

    /// Insert a symbol, returning the one it replaced
    pub fn insert(&mut self, symbol: Symbol) -> Option<Symbol> {
        self.symbols.insert(symbol.name.clone(), symbol)
    }

    pub fn with(mut self, symbol: Symbol) -> Self {
        self.insert(symbol);
        self
    }

    /// Symbol names in lexicographic order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.symbols.keys().map(String::as_str)
    }

    pub fn lookup(&self, name: &str) -> Option<&Symbol> {
        self.symbols.get(name)
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    /// Record the underlying type of `package.name`, a type declared elsewhere
    pub fn insert_external(&mut self, package: &str, name: &str, underlying: TypeRef) {
        self.external
            .insert((package.to_string(), name.to_string()), underlying);
    }

    pub fn with_external(mut self, package: &str, name: &str, underlying: TypeRef) -> Self {
        self.insert_external(package, name, underlying);
        self
    }

    pub fn external(&self, package: &str, name: &str) -> Option<&TypeRef> {
        self.external.get(&(package.to_string(), name.to_string()))
    }

    /// Follow named types down to their underlying type.
    ///
    /// Same-package names resolve through the symbol table, names from other
    /// packages through the recorded external types. Predeclared names,
    /// unresolved names and cycles stop the walk and are returned as-is.
    pub fn underlying<'a>(&'a self, ty: &'a TypeRef) -> &'a TypeRef {
        let mut current = ty;
        for _ in 0..=(self.symbols.len() + self.external.len()) {
            let TypeRef::Named { package, name } = current else {
                return current;
            };
            let next = if package.is_empty() {
                None
            } else if *package == self.package_path {
                self.symbols.get(name).map(|symbol| &symbol.ty)
            } else {
                self.external(package, name)
            };
            match next {
                Some(next) => current = next,
                None => return current,
            }
        }
        current
    }
}

/// A loaded package: its identity, its imports and its declaration scope
#[derive(Debug, Clone)]
pub struct Package {
    pub path: String,
    /// Package clause name, also used as the short name of a mirrored dependency
    pub name: String,
    pub dir: PathBuf,
    pub imports: BTreeSet<String>,
    pub scope: Scope,
}

impl Package {
    pub fn new(path: &str, name: &str, dir: &Path) -> Self {
        Self {
            path: path.to_string(),
            name: name.to_string(),
            dir: dir.to_path_buf(),
            imports: BTreeSet::new(),
            scope: Scope::new(path),
        }
    }

    pub fn imports_package(&self, path: &str) -> bool {
        self.imports.contains(path)
    }
}
