#![allow(dead_code)]

use mirrorgen::core::{Field, Scope, StructType, Symbol, TypeRef};
use mirrorgen::formatters::{ImportResolver, SourceFormatter};
use mirrorgen::{MirrorError, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

pub const MODULE: &str = "example.com/app";

/// A scratch Go module on disk
pub struct GoModule {
    _tmp: TempDir,
    pub root: PathBuf,
}

impl GoModule {
    pub fn new() -> Self {
        let tmp = TempDir::new().unwrap();
        let root = tmp.path().join("module");
        fs::create_dir_all(&root).unwrap();
        fs::write(root.join("go.mod"), format!("module {MODULE}\n\ngo 1.21\n")).unwrap();
        Self { _tmp: tmp, root }
    }

    pub fn write(&self, relative: &str, contents: &str) -> PathBuf {
        let path = self.root.join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, contents).unwrap();
        path
    }

    pub fn out_dir(&self) -> PathBuf {
        self.root.parent().unwrap().join("out")
    }
}

/// Accepts any text whose brackets balance and returns it untouched
pub struct BraceFormatter;

impl SourceFormatter for BraceFormatter {
    fn format(&self, source: &[u8]) -> Result<Vec<u8>> {
        let mut stack = Vec::new();
        for &b in source {
            match b {
                b'{' | b'(' | b'[' => stack.push(b),
                b'}' | b')' | b']' => {
                    let open = stack.pop();
                    let expected = match b {
                        b'}' => b'{',
                        b')' => b'(',
                        _ => b'[',
                    };
                    if open != Some(expected) {
                        return Err(MirrorError::Format {
                            file: String::new(),
                            reason: format!("unbalanced {}", b as char),
                        });
                    }
                }
                _ => {}
            }
        }
        if !stack.is_empty() {
            return Err(MirrorError::Format {
                file: String::new(),
                reason: "unclosed bracket".to_string(),
            });
        }
        Ok(source.to_vec())
    }
}

pub struct PassthroughResolver;

impl ImportResolver for PassthroughResolver {
    fn resolve_imports(&self, _path: &Path, source: &[u8]) -> Result<Vec<u8>> {
        Ok(source.to_vec())
    }
}

/// Rejects everything, to exercise error propagation
pub struct RejectingFormatter;

impl SourceFormatter for RejectingFormatter {
    fn format(&self, _source: &[u8]) -> Result<Vec<u8>> {
        Err(MirrorError::Format {
            file: String::new(),
            reason: "rejected".to_string(),
        })
    }
}

pub fn tls(name: &str) -> TypeRef {
    TypeRef::named("pkg/tls", name)
}

/// `pkg/dynamic` with a `Config` struct declared in config.go:
///
/// ```go
/// type Config struct {
///     Name   string
///     secret string
///     Inner  tls.Certificate `json:"inner"`
///     tls.Store
/// }
/// ```
pub fn dynamic_scope() -> Scope {
    let config = StructType {
        fields: vec![
            Field::new("Name", TypeRef::basic("string")),
            Field::new("secret", TypeRef::basic("string")),
            Field::new("Inner", tls("Certificate")).with_tag(r#"json:"inner""#),
            Field::embedded(tls("Store")),
        ],
    };
    Scope::new("pkg/dynamic").with(Symbol::new(
        "Config",
        "/src/pkg/dynamic/config.go",
        3,
        TypeRef::Struct(config),
    ))
}
